// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Storage capability the query layer is written against.
//!
//! Implementations only filter, count and insert; they return rows in id
//! (insertion) order and leave presentation ordering to [`crate::graph`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Comment, Direction, Follow, Like, NewComment, NewFollow, NewLike, NewPhoto, NewPost,
    NewProfile, Photo, Post, Profile,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> Result<()>;

    async fn get_profile(&self, id: i32) -> Result<Option<Profile>>;

    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Profiles whose id is in `ids`; unknown ids are skipped
    async fn get_profiles(&self, ids: &[i32]) -> Result<Vec<Profile>>;

    async fn get_post(&self, id: i32) -> Result<Option<Post>>;

    /// Follow edges touching `profile_id` on the given side
    async fn follow_edges(&self, profile_id: i32, direction: Direction) -> Result<Vec<Follow>>;

    async fn count_follow_edges(&self, profile_id: i32, direction: Direction) -> Result<i64>;

    async fn edge_exists(&self, follower_id: i32, followed_id: i32) -> Result<bool>;

    /// Posts authored by any profile in `author_ids`
    async fn posts_by_authors(&self, author_ids: &[i32]) -> Result<Vec<Post>>;

    async fn photos_for_post(&self, post_id: i32) -> Result<Vec<Photo>>;

    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<Comment>>;

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>>;

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile>;

    /// Insert a post and, when `image_url` is given, its photo in one atomic
    /// write: if either insert fails, neither row is stored. The photo takes
    /// the post's timestamp.
    async fn insert_post_with_photo(
        &self,
        post: NewPost,
        image_url: Option<String>,
    ) -> Result<Post>;

    async fn insert_photo(&self, photo: NewPhoto) -> Result<Photo>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Returns `None` when the edge already exists
    async fn insert_follow(&self, follow: NewFollow) -> Result<Option<Follow>>;

    async fn delete_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool>;

    /// Returns `None` when the profile already liked the post
    async fn insert_like(&self, like: NewLike) -> Result<Option<Like>>;

    /// Deletes the profile and everything owned by it
    async fn delete_profile(&self, id: i32) -> Result<bool>;

    /// Deletes the post with its photos, comments and likes
    async fn delete_post(&self, id: i32) -> Result<bool>;
}
