// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::post::Post;
use crate::schema::{comments, likes};

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
    Deserialize,
)]
#[diesel(table_name = comments)]
#[diesel(belongs_to(Post))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub profile_id: i32,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub post_id: i32,
    pub profile_id: i32,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

/// At most one per (post, profile)
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
    Deserialize,
)]
#[diesel(table_name = likes)]
#[diesel(belongs_to(Post))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Like {
    pub id: i32,
    pub post_id: i32,
    pub profile_id: i32,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub post_id: i32,
    pub profile_id: i32,
    pub timestamp: NaiveDateTime,
}
