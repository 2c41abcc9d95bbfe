// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use super::SocialStore;
use crate::error::{Error, Result};
use crate::models::{
    Comment, Direction, Follow, Like, NewComment, NewFollow, NewLike, NewPhoto, NewPost,
    NewProfile, Photo, Post, Profile,
};

/// In-memory storage with the same constraints as the Postgres schema:
/// foreign keys are checked on insert, follow and like pairs are unique,
/// and deletes cascade.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    profiles: BTreeMap<i32, Profile>,
    posts: BTreeMap<i32, Post>,
    photos: BTreeMap<i32, Photo>,
    follows: BTreeMap<i32, Follow>,
    comments: BTreeMap<i32, Comment>,
    likes: BTreeMap<i32, Like>,
}

impl Tables {
    // Single counter across tables; only monotonicity matters
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn require_profile(&self, id: i32) -> Result<()> {
        if self.profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::profile_not_found(id))
        }
    }

    fn require_post(&self, id: i32) -> Result<()> {
        if self.posts.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::post_not_found(id))
        }
    }

    fn insert_photo_row(&mut self, photo: NewPhoto) -> Photo {
        let id = self.allocate_id();
        let row = Photo {
            id,
            post_id: photo.post_id,
            image_url: photo.image_url,
            image_file: photo.image_file,
            timestamp: photo.timestamp,
        };
        self.photos.insert(id, row.clone());
        row
    }

    fn remove_post_cascade(&mut self, post_id: i32) -> bool {
        if self.posts.remove(&post_id).is_none() {
            return false;
        }
        self.photos.retain(|_, photo| photo.post_id != post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
        self.likes.retain(|_, like| like.post_id != post_id);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_profile(&self, id: i32) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.tables.read().await.profiles.values().cloned().collect())
    }

    async fn get_profiles(&self, ids: &[i32]) -> Result<Vec<Profile>> {
        let wanted: HashSet<i32> = ids.iter().copied().collect();
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|profile| wanted.contains(&profile.id))
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn follow_edges(&self, profile_id: i32, direction: Direction) -> Result<Vec<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|edge| match direction {
                Direction::Outgoing => edge.follower_id == profile_id,
                Direction::Incoming => edge.followed_id == profile_id,
            })
            .cloned()
            .collect())
    }

    async fn count_follow_edges(&self, profile_id: i32, direction: Direction) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .follows
            .values()
            .filter(|edge| match direction {
                Direction::Outgoing => edge.follower_id == profile_id,
                Direction::Incoming => edge.followed_id == profile_id,
            })
            .count();
        Ok(count as i64)
    }

    async fn edge_exists(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|edge| edge.follower_id == follower_id && edge.followed_id == followed_id))
    }

    async fn posts_by_authors(&self, author_ids: &[i32]) -> Result<Vec<Post>> {
        let authors: HashSet<i32> = author_ids.iter().copied().collect();
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|post| authors.contains(&post.profile_id))
            .cloned()
            .collect())
    }

    async fn photos_for_post(&self, post_id: i32) -> Result<Vec<Photo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .values()
            .filter(|photo| photo.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .values()
            .filter(|like| like.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        let row = Profile {
            id,
            username: profile.username,
            display_name: profile.display_name,
            bio_text: profile.bio_text,
            join_date: profile.join_date,
            profile_image_url: profile.profile_image_url,
        };
        tables.profiles.insert(id, row.clone());

        debug!("Created profile {} with id {}", row.username, id);
        Ok(row)
    }

    async fn insert_post_with_photo(
        &self,
        post: NewPost,
        image_url: Option<String>,
    ) -> Result<Post> {
        let mut tables = self.tables.write().await;
        tables.require_profile(post.profile_id)?;

        // Both rows are checked before either is stored. A rejected write
        // still burns the id, as a Postgres sequence would.
        let id = tables.allocate_id();
        let photo = image_url.map(|url| NewPhoto {
            post_id: id,
            image_url: Some(url),
            image_file: None,
            timestamp: post.timestamp,
        });
        if let Some(photo) = &photo {
            photo.validate()?;
        }

        let row = Post {
            id,
            profile_id: post.profile_id,
            caption: post.caption,
            timestamp: post.timestamp,
        };
        tables.posts.insert(id, row.clone());
        if let Some(photo) = photo {
            tables.insert_photo_row(photo);
        }

        debug!("Created post {} for profile {}", id, row.profile_id);
        Ok(row)
    }

    async fn insert_photo(&self, photo: NewPhoto) -> Result<Photo> {
        let mut tables = self.tables.write().await;
        tables.require_post(photo.post_id)?;
        photo.validate()?;
        Ok(tables.insert_photo_row(photo))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        tables.require_post(comment.post_id)?;
        tables.require_profile(comment.profile_id)?;

        let id = tables.allocate_id();
        let row = Comment {
            id,
            post_id: comment.post_id,
            profile_id: comment.profile_id,
            text: comment.text,
            timestamp: comment.timestamp,
        };
        tables.comments.insert(id, row.clone());
        Ok(row)
    }

    async fn insert_follow(&self, follow: NewFollow) -> Result<Option<Follow>> {
        let mut tables = self.tables.write().await;
        tables.require_profile(follow.follower_id)?;
        tables.require_profile(follow.followed_id)?;

        let exists = tables.follows.values().any(|edge| {
            edge.follower_id == follow.follower_id && edge.followed_id == follow.followed_id
        });
        if exists {
            debug!(
                "Follow {} -> {} already exists",
                follow.follower_id, follow.followed_id
            );
            return Ok(None);
        }

        let id = tables.allocate_id();
        let row = Follow {
            id,
            follower_id: follow.follower_id,
            followed_id: follow.followed_id,
            created_at: follow.created_at,
        };
        tables.follows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables.follows.retain(|_, edge| {
            !(edge.follower_id == follower_id && edge.followed_id == followed_id)
        });
        Ok(tables.follows.len() < before)
    }

    async fn insert_like(&self, like: NewLike) -> Result<Option<Like>> {
        let mut tables = self.tables.write().await;
        tables.require_post(like.post_id)?;
        tables.require_profile(like.profile_id)?;

        let exists = tables
            .likes
            .values()
            .any(|l| l.post_id == like.post_id && l.profile_id == like.profile_id);
        if exists {
            return Ok(None);
        }

        let id = tables.allocate_id();
        let row = Like {
            id,
            post_id: like.post_id,
            profile_id: like.profile_id,
            timestamp: like.timestamp,
        };
        tables.likes.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete_profile(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.profiles.remove(&id).is_none() {
            return Ok(false);
        }

        let owned_posts: Vec<i32> = tables
            .posts
            .values()
            .filter(|post| post.profile_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in &owned_posts {
            tables.remove_post_cascade(*post_id);
        }

        tables
            .follows
            .retain(|_, edge| edge.follower_id != id && edge.followed_id != id);
        tables.comments.retain(|_, comment| comment.profile_id != id);
        tables.likes.retain(|_, like| like.profile_id != id);

        debug!("Deleted profile {} and {} posts", id, owned_posts.len());
        Ok(true)
    }

    async fn delete_post(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.remove_post_cascade(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_post(profile_id: i32, caption: &str) -> NewPost {
        NewPost {
            profile_id,
            caption: caption.into(),
            timestamp: at(1),
        }
    }

    #[tokio::test]
    async fn post_for_missing_profile_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_post_with_photo(new_post(42, "hi"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "profile", id: 42 }));
    }

    #[tokio::test]
    async fn post_and_photo_are_stored_together() {
        let store = MemoryStore::new();
        let a = store.insert_profile(NewProfile::new("a", "A", at(0))).await.unwrap();

        let post = store
            .insert_post_with_photo(new_post(a.id, "c"), Some("https://img/1.jpg".into()))
            .await
            .unwrap();

        let photos = store.photos_for_post(post.id).await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].post_id, post.id);
        assert_eq!(photos[0].timestamp, post.timestamp);
        assert!(photos[0].id > post.id);
    }

    #[tokio::test]
    async fn failed_photo_leaves_no_post_behind() {
        let store = MemoryStore::new();
        let a = store.insert_profile(NewProfile::new("a", "A", at(0))).await.unwrap();

        let too_long = "x".repeat(NewPhoto::MAX_URL_LEN + 1);
        let err = store
            .insert_post_with_photo(new_post(a.id, "c"), Some(too_long))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.posts_by_authors(&[a.id]).await.unwrap().is_empty());

        let retry = store
            .insert_post_with_photo(new_post(a.id, "retry"), None)
            .await
            .unwrap();
        assert_eq!(store.posts_by_authors(&[a.id]).await.unwrap(), vec![retry]);
    }

    #[tokio::test]
    async fn duplicate_follow_is_deduplicated() {
        let store = MemoryStore::new();
        let a = store.insert_profile(NewProfile::new("a", "A", at(0))).await.unwrap();
        let b = store.insert_profile(NewProfile::new("b", "B", at(0))).await.unwrap();

        let edge = NewFollow {
            follower_id: a.id,
            followed_id: b.id,
            created_at: at(1),
        };
        assert!(store.insert_follow(edge.clone()).await.unwrap().is_some());
        assert!(store.insert_follow(edge).await.unwrap().is_none());
        assert_eq!(store.count_follow_edges(b.id, Direction::Incoming).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_children() {
        let store = MemoryStore::new();
        let a = store.insert_profile(NewProfile::new("a", "A", at(0))).await.unwrap();
        let post = store
            .insert_post_with_photo(new_post(a.id, "c"), Some("u".into()))
            .await
            .unwrap();
        store
            .insert_like(NewLike {
                post_id: post.id,
                profile_id: a.id,
                timestamp: at(2),
            })
            .await
            .unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.photos_for_post(post.id).await.unwrap().is_empty());
        assert!(store.likes_for_post(post.id).await.unwrap().is_empty());
        assert!(!store.delete_post(post.id).await.unwrap());
    }
}
