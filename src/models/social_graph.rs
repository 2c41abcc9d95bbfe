// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::follows;

/// Model for a follow edge (follower -> followed)
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = follows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Follow {
    pub id: i32,
    pub follower_id: i32,
    pub followed_id: i32,
    pub created_at: NaiveDateTime,
}

/// DTO for creating a new follow edge
#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: i32,
    pub followed_id: i32,
    pub created_at: NaiveDateTime,
}

/// Which side of a follow edge a profile sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges where the profile is the follower
    Outgoing,
    /// Edges where the profile is the one being followed
    Incoming,
}

impl Follow {
    /// The profile on the other end of this edge, seen from `direction`
    pub fn other_end(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Outgoing => self.followed_id,
            Direction::Incoming => self.follower_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers_count: i64,
    pub following_count: i64,
}

/// Query parameters for paginating followers/following/feed lists
#[derive(Debug, Default, Deserialize)]
pub struct FollowsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

impl FollowsQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// If page is provided, it takes precedence over the raw offset.
    /// Saturates instead of overflowing; a window past the end is empty.
    pub fn offset(&self) -> i64 {
        if self.page() > 1 {
            (self.page() - 1).saturating_mul(self.limit())
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        total.max(0).saturating_add(self.limit() - 1) / self.limit()
    }

    /// Slice an already-ordered list down to the requested window
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}
