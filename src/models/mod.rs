// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod engagement;
pub mod post;
pub mod profile;
pub mod social_graph;

pub use engagement::{Comment, Like, NewComment, NewLike};
pub use post::{NewPhoto, NewPost, Photo, Post, PostDetail};
pub use profile::{NewProfile, Profile};
pub use social_graph::{Direction, Follow, FollowStats, FollowsQuery, NewFollow};
