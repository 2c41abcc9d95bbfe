// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::engagement::{Comment, Like};
use super::profile::Profile;
use crate::error::{Error, Result};
use crate::schema::{photos, posts};

/// A single post, owned by exactly one profile
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
    Deserialize,
)]
#[diesel(table_name = posts)]
#[diesel(belongs_to(Profile))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub profile_id: i32,
    pub caption: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub profile_id: i32,
    pub caption: String,
    pub timestamp: NaiveDateTime,
}

/// An image attached to a post
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
    Deserialize,
)]
#[diesel(table_name = photos)]
#[diesel(belongs_to(Post))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Photo {
    pub id: i32,
    pub post_id: i32,
    pub image_url: Option<String>,
    pub image_file: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl Photo {
    /// Resolve the URL to display: the remote reference wins, then the
    /// locally stored file served under `media_url`.
    pub fn resolve_url(&self, media_url: &str) -> Option<String> {
        if let Some(url) = non_empty(&self.image_url) {
            return Some(url.to_string());
        }
        non_empty(&self.image_file).map(|file| {
            format!(
                "{}/{}",
                media_url.trim_end_matches('/'),
                file.trim_start_matches('/')
            )
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = photos)]
pub struct NewPhoto {
    pub post_id: i32,
    pub image_url: Option<String>,
    pub image_file: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl NewPhoto {
    /// Column widths of `photos.image_url` and `photos.image_file`
    pub const MAX_URL_LEN: usize = 200;
    pub const MAX_FILE_LEN: usize = 100;

    /// Reject references the photos table cannot hold, before anything is written
    pub fn validate(&self) -> Result<()> {
        check_len("image_url", self.image_url.as_deref(), Self::MAX_URL_LEN)?;
        check_len("image_file", self.image_file.as_deref(), Self::MAX_FILE_LEN)
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(Error::InvalidInput(format!(
            "{} is longer than {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// A post together with everything hanging off it, each list newest first
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub photos: Vec<Photo>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
}
