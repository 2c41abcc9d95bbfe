// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::profiles;

/// A user identity in the photo-sharing app
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub bio_text: String,
    pub join_date: NaiveDateTime,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub bio_text: String,
    pub join_date: NaiveDateTime,
    pub profile_image_url: Option<String>,
}

impl NewProfile {
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        join_date: NaiveDateTime,
    ) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            bio_text: String::new(),
            join_date,
            profile_image_url: None,
        }
    }

    pub fn with_bio(mut self, bio_text: impl Into<String>) -> Self {
        self.bio_text = bio_text.into();
        self
    }
}
