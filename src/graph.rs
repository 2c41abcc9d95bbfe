// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Social graph and feed queries.
//!
//! Every traversal goes through the [`SocialStore`] capability: the store
//! filters and counts, this layer walks edges and orders the results.
//! Lookups on unknown ids return empty results rather than errors.

use chrono::{NaiveDateTime, Utc};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{
    Comment, Direction, FollowStats, Like, NewComment, NewFollow, NewLike, NewPhoto, NewPost,
    NewProfile, Photo, Post, PostDetail, Profile,
};
use crate::store::SocialStore;

/// Source of "now" for rows this layer creates
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

#[derive(Clone)]
pub struct SocialGraph {
    store: Arc<dyn SocialStore>,
    clock: Arc<dyn Clock>,
}

/// Stable sort, newest first; rows with equal timestamps keep store order.
fn newest_first<T>(mut rows: Vec<T>, timestamp: impl Fn(&T) -> NaiveDateTime) -> Vec<T> {
    rows.sort_by_key(|row| Reverse(timestamp(row)));
    rows
}

impl SocialGraph {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn SocialStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn SocialStore> {
        &self.store
    }

    pub async fn profile(&self, id: i32) -> Result<Option<Profile>> {
        self.store.get_profile(id).await
    }

    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        self.store.list_profiles().await
    }

    pub async fn post(&self, id: i32) -> Result<Option<Post>> {
        self.store.get_post(id).await
    }

    /// Ids on the far end of every edge touching `profile_id` on one side
    async fn neighbour_ids(&self, profile_id: i32, direction: Direction) -> Result<Vec<i32>> {
        let edges = self.store.follow_edges(profile_id, direction).await?;
        Ok(edges.iter().map(|edge| edge.other_end(direction)).collect())
    }

    /// Profiles that follow `profile_id`
    pub async fn followers_of(&self, profile_id: i32) -> Result<Vec<Profile>> {
        let ids = self.neighbour_ids(profile_id, Direction::Incoming).await?;
        debug!("Profile {} has {} follower edges", profile_id, ids.len());
        self.store.get_profiles(&ids).await
    }

    /// Profiles that `profile_id` follows
    pub async fn following_of(&self, profile_id: i32) -> Result<Vec<Profile>> {
        let ids = self.neighbour_ids(profile_id, Direction::Outgoing).await?;
        debug!("Profile {} follows {} profiles", profile_id, ids.len());
        self.store.get_profiles(&ids).await
    }

    pub async fn follower_count(&self, profile_id: i32) -> Result<i64> {
        self.store
            .count_follow_edges(profile_id, Direction::Incoming)
            .await
    }

    pub async fn following_count(&self, profile_id: i32) -> Result<i64> {
        self.store
            .count_follow_edges(profile_id, Direction::Outgoing)
            .await
    }

    pub async fn follow_stats(&self, profile_id: i32) -> Result<FollowStats> {
        let (followers_count, following_count) = futures::try_join!(
            self.follower_count(profile_id),
            self.following_count(profile_id)
        )?;
        Ok(FollowStats {
            followers_count,
            following_count,
        })
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.store.edge_exists(follower_id, followed_id).await
    }

    /// Posts from every followed profile, newest first
    pub async fn feed_for(&self, profile_id: i32) -> Result<Vec<Post>> {
        let authors = self.neighbour_ids(profile_id, Direction::Outgoing).await?;
        if authors.is_empty() {
            debug!("Profile {} follows no one, feed is empty", profile_id);
            return Ok(Vec::new());
        }

        let posts = self.store.posts_by_authors(&authors).await?;
        debug!(
            "Feed for profile {}: {} posts from {} authors",
            profile_id,
            posts.len(),
            authors.len()
        );
        Ok(newest_first(posts, |post| post.timestamp))
    }

    /// The profile's own posts, newest first
    pub async fn posts_of(&self, profile_id: i32) -> Result<Vec<Post>> {
        let posts = self.store.posts_by_authors(&[profile_id]).await?;
        Ok(newest_first(posts, |post| post.timestamp))
    }

    pub async fn post_photos(&self, post_id: i32) -> Result<Vec<Photo>> {
        let photos = self.store.photos_for_post(post_id).await?;
        Ok(newest_first(photos, |photo| photo.timestamp))
    }

    pub async fn post_comments(&self, post_id: i32) -> Result<Vec<Comment>> {
        let comments = self.store.comments_for_post(post_id).await?;
        Ok(newest_first(comments, |comment| comment.timestamp))
    }

    pub async fn post_likes(&self, post_id: i32) -> Result<Vec<Like>> {
        let likes = self.store.likes_for_post(post_id).await?;
        Ok(newest_first(likes, |like| like.timestamp))
    }

    pub async fn post_detail(&self, post_id: i32) -> Result<Option<PostDetail>> {
        let Some(post) = self.store.get_post(post_id).await? else {
            return Ok(None);
        };
        let (photos, comments, likes) = futures::try_join!(
            self.post_photos(post_id),
            self.post_comments(post_id),
            self.post_likes(post_id)
        )?;
        Ok(Some(PostDetail {
            post,
            photos,
            comments,
            likes,
        }))
    }

    pub async fn create_profile(&self, profile: NewProfile) -> Result<Profile> {
        let profile = self.store.insert_profile(profile).await?;
        info!("Created profile {} ({})", profile.id, profile.username);
        Ok(profile)
    }

    /// Create a post, attaching a photo when an image URL is supplied.
    /// The post and its photo are written atomically.
    pub async fn create_post(
        &self,
        profile_id: i32,
        caption: impl Into<String>,
        image_url: Option<String>,
    ) -> Result<Post> {
        let new_post = NewPost {
            profile_id,
            caption: caption.into(),
            timestamp: self.clock.now(),
        };
        let image_url = image_url.filter(|url| !url.trim().is_empty());
        let with_photo = image_url.is_some();

        let post = self.store.insert_post_with_photo(new_post, image_url).await?;

        if with_photo {
            info!("Profile {} created post {} with a photo", profile_id, post.id);
        } else {
            info!("Profile {} created post {}", profile_id, post.id);
        }
        Ok(post)
    }

    pub async fn add_photo(&self, photo: NewPhoto) -> Result<Photo> {
        self.store.insert_photo(photo).await
    }

    pub async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        self.store.insert_comment(comment).await
    }

    /// Returns `true` if a new edge was created, `false` if it already existed
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let created = self
            .store
            .insert_follow(NewFollow {
                follower_id,
                followed_id,
                created_at: self.clock.now(),
            })
            .await?
            .is_some();

        if created {
            info!("Profile {} now follows {}", follower_id, followed_id);
        } else {
            debug!("Profile {} already follows {}", follower_id, followed_id);
        }
        Ok(created)
    }

    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let removed = self.store.delete_follow(follower_id, followed_id).await?;
        if removed {
            info!("Profile {} unfollowed {}", follower_id, followed_id);
        }
        Ok(removed)
    }

    pub async fn like(&self, post_id: i32, profile_id: i32) -> Result<bool> {
        let created = self
            .store
            .insert_like(NewLike {
                post_id,
                profile_id,
                timestamp: self.clock.now(),
            })
            .await?
            .is_some();

        if created {
            info!("Profile {} liked post {}", profile_id, post_id);
        } else {
            debug!("Profile {} already likes post {}", profile_id, post_id);
        }
        Ok(created)
    }

    pub async fn delete_profile(&self, profile_id: i32) -> Result<bool> {
        let deleted = self.store.delete_profile(profile_id).await?;
        if deleted {
            info!("Deleted profile {} with its posts", profile_id);
        }
        Ok(deleted)
    }

    pub async fn delete_post(&self, post_id: i32) -> Result<bool> {
        let deleted = self.store.delete_post(post_id).await?;
        if deleted {
            info!("Deleted post {} with its photos, comments and likes", post_id);
        }
        Ok(deleted)
    }

    /// Resolve a profile or fail with `NotFound`, for callers that must
    /// distinguish a missing profile from an empty result.
    pub async fn require_profile(&self, profile_id: i32) -> Result<Profile> {
        self.store
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| Error::profile_not_found(profile_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use tracing_test::traced_test;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 3)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    fn graph() -> SocialGraph {
        SocialGraph::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn newest_first_keeps_insertion_order_on_ties() {
        let rows = vec![(1, at(5)), (2, at(7)), (3, at(5)), (4, at(7))];
        let ids: Vec<i32> = newest_first(rows, |row| row.1)
            .into_iter()
            .map(|row| row.0)
            .collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[tokio::test]
    async fn unknown_ids_give_empty_results() {
        let graph = graph();
        assert!(graph.followers_of(99).await.unwrap().is_empty());
        assert!(graph.following_of(99).await.unwrap().is_empty());
        assert_eq!(graph.follower_count(99).await.unwrap(), 0);
        assert!(graph.feed_for(99).await.unwrap().is_empty());
        assert!(graph.post_photos(99).await.unwrap().is_empty());
        assert!(graph.post_detail(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn self_follow_is_allowed() {
        let graph = graph();
        let a = graph.create_profile(NewProfile::new("a", "A", at(0))).await.unwrap();

        assert!(graph.follow(a.id, a.id).await.unwrap());
        assert_eq!(graph.followers_of(a.id).await.unwrap(), vec![a.clone()]);
        assert_eq!(graph.following_of(a.id).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn create_post_without_image_has_no_photos() {
        let graph = graph();
        let a = graph.create_profile(NewProfile::new("a", "A", at(0))).await.unwrap();

        let post = graph.create_post(a.id, "just words", Some("  ".into())).await.unwrap();
        assert!(graph.post_photos(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_photo_does_not_create_the_post() {
        let graph = graph();
        let a = graph.create_profile(NewProfile::new("a", "A", at(0))).await.unwrap();

        let url = format!("https://img.example.com/{}", "x".repeat(NewPhoto::MAX_URL_LEN));
        let err = graph.create_post(a.id, "too long", Some(url)).await.unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(graph.posts_of(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn require_profile_reports_missing() {
        let err = graph().require_profile(7).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "profile", id: 7 }));
    }

    #[tokio::test]
    #[traced_test]
    async fn follow_is_logged() {
        let graph = graph();
        let a = graph.create_profile(NewProfile::new("a", "A", at(0))).await.unwrap();
        let b = graph.create_profile(NewProfile::new("b", "B", at(0))).await.unwrap();

        graph.follow(a.id, b.id).await.unwrap();
        assert!(logs_contain(&format!("Profile {} now follows {}", a.id, b.id)));
    }

    #[tokio::test]
    #[traced_test]
    async fn like_and_post_delete_are_logged() {
        let graph = graph();
        let a = graph.create_profile(NewProfile::new("a", "A", at(0))).await.unwrap();
        let post = graph.create_post(a.id, "c", None).await.unwrap();

        assert!(graph.like(post.id, a.id).await.unwrap());
        assert!(logs_contain(&format!("Profile {} liked post {}", a.id, post.id)));

        assert!(!graph.like(post.id, a.id).await.unwrap());
        assert!(logs_contain(&format!("Profile {} already likes post {}", a.id, post.id)));

        assert!(graph.delete_post(post.id).await.unwrap());
        assert!(logs_contain(&format!("Deleted post {}", post.id)));
    }
}
