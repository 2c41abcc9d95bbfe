// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, error};

use super::SocialStore;
use crate::db::{DbConnection, DbPool};
use crate::error::{Error, Result};
use crate::models::{
    Comment, Direction, Follow, Like, NewComment, NewFollow, NewLike, NewPhoto, NewPost,
    NewProfile, Photo, Post, Profile,
};
use crate::schema::{comments, follows, likes, photos, posts, profiles};

/// Postgres-backed store. Uniqueness and cascades are enforced by the schema.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<DbConnection> {
        self.pool.get().await.map_err(|e| {
            error!("Database connection error: {}", e);
            Error::Pool(e.to_string())
        })
    }
}

/// Turn a foreign key violation into the `NotFound` of whichever row the
/// violated constraint points at; anything else stays a database error.
fn with_missing_reference<const N: usize>(
    err: DieselError,
    candidates: [(&str, Error); N],
) -> Error {
    if let DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) = &err {
        let constraint = info.constraint_name().unwrap_or_default().to_string();
        if let Some((_, not_found)) = candidates
            .into_iter()
            .find(|(column, _)| constraint.contains(column))
        {
            return not_found;
        }
    }
    Error::Database(err)
}

#[async_trait]
impl SocialStore for PgStore {
    async fn ping(&self) -> Result<()> {
        self.conn().await.map(|_| ())
    }

    async fn get_profile(&self, id: i32) -> Result<Option<Profile>> {
        let mut conn = self.conn().await?;
        let profile = profiles::table
            .find(id)
            .select(Profile::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut conn = self.conn().await?;
        let rows = profiles::table
            .order_by(profiles::id.asc())
            .select(Profile::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn get_profiles(&self, ids: &[i32]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let rows = profiles::table
            .filter(profiles::id.eq_any(ids))
            .order_by(profiles::id.asc())
            .select(Profile::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>> {
        let mut conn = self.conn().await?;
        let post = posts::table
            .find(id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(post)
    }

    async fn follow_edges(&self, profile_id: i32, direction: Direction) -> Result<Vec<Follow>> {
        let mut conn = self.conn().await?;
        debug!("Loading {:?} follow edges for profile {}", direction, profile_id);

        let rows = match direction {
            Direction::Outgoing => {
                follows::table
                    .filter(follows::follower_id.eq(profile_id))
                    .order_by(follows::id.asc())
                    .select(Follow::as_select())
                    .load(&mut conn)
                    .await?
            }
            Direction::Incoming => {
                follows::table
                    .filter(follows::followed_id.eq(profile_id))
                    .order_by(follows::id.asc())
                    .select(Follow::as_select())
                    .load(&mut conn)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn count_follow_edges(&self, profile_id: i32, direction: Direction) -> Result<i64> {
        let mut conn = self.conn().await?;
        let count = match direction {
            Direction::Outgoing => {
                follows::table
                    .filter(follows::follower_id.eq(profile_id))
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await?
            }
            Direction::Incoming => {
                follows::table
                    .filter(follows::followed_id.eq(profile_id))
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await?
            }
        };
        Ok(count)
    }

    async fn edge_exists(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let mut conn = self.conn().await?;
        let exists = diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::followed_id.eq(followed_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;
        Ok(exists)
    }

    async fn posts_by_authors(&self, author_ids: &[i32]) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let rows = posts::table
            .filter(posts::profile_id.eq_any(author_ids))
            .order_by(posts::id.asc())
            .select(Post::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn photos_for_post(&self, post_id: i32) -> Result<Vec<Photo>> {
        let mut conn = self.conn().await?;
        let rows = photos::table
            .filter(photos::post_id.eq(post_id))
            .order_by(photos::id.asc())
            .select(Photo::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<Comment>> {
        let mut conn = self.conn().await?;
        let rows = comments::table
            .filter(comments::post_id.eq(post_id))
            .order_by(comments::id.asc())
            .select(Comment::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>> {
        let mut conn = self.conn().await?;
        let rows = likes::table
            .filter(likes::post_id.eq(post_id))
            .order_by(likes::id.asc())
            .select(Like::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(profiles::table)
            .values(&profile)
            .returning(Profile::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(row)
    }

    async fn insert_post_with_photo(
        &self,
        post: NewPost,
        image_url: Option<String>,
    ) -> Result<Post> {
        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, Error, _>(|conn| {
            async move {
                let profile_id = post.profile_id;
                let row = diesel::insert_into(posts::table)
                    .values(&post)
                    .returning(Post::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(|e| {
                        let missing = Error::profile_not_found(profile_id);
                        with_missing_reference(e, [("profile_id", missing)])
                    })?;

                if let Some(url) = image_url {
                    let photo = NewPhoto {
                        post_id: row.id,
                        image_url: Some(url),
                        image_file: None,
                        timestamp: row.timestamp,
                    };
                    photo.validate()?;
                    diesel::insert_into(photos::table)
                        .values(&photo)
                        .execute(conn)
                        .await?;
                }

                debug!("Created post {} for profile {}", row.id, profile_id);
                Ok(row)
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_photo(&self, photo: NewPhoto) -> Result<Photo> {
        photo.validate()?;
        let mut conn = self.conn().await?;
        diesel::insert_into(photos::table)
            .values(&photo)
            .returning(Photo::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| {
                with_missing_reference(e, [("post_id", Error::post_not_found(photo.post_id))])
            })
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut conn = self.conn().await?;
        diesel::insert_into(comments::table)
            .values(&comment)
            .returning(Comment::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| {
                with_missing_reference(
                    e,
                    [
                        ("post_id", Error::post_not_found(comment.post_id)),
                        ("profile_id", Error::profile_not_found(comment.profile_id)),
                    ],
                )
            })
    }

    async fn insert_follow(&self, follow: NewFollow) -> Result<Option<Follow>> {
        let mut conn = self.conn().await?;
        diesel::insert_into(follows::table)
            .values(&follow)
            .on_conflict((follows::follower_id, follows::followed_id))
            .do_nothing()
            .returning(Follow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| {
                with_missing_reference(
                    e,
                    [
                        ("follower_id", Error::profile_not_found(follow.follower_id)),
                        ("followed_id", Error::profile_not_found(follow.followed_id)),
                    ],
                )
            })
    }

    async fn delete_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let mut conn = self.conn().await?;
        let removed = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::followed_id.eq(followed_id)),
        )
        .execute(&mut conn)
        .await?;
        Ok(removed > 0)
    }

    async fn insert_like(&self, like: NewLike) -> Result<Option<Like>> {
        let mut conn = self.conn().await?;
        diesel::insert_into(likes::table)
            .values(&like)
            .on_conflict((likes::post_id, likes::profile_id))
            .do_nothing()
            .returning(Like::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| {
                with_missing_reference(
                    e,
                    [
                        ("post_id", Error::post_not_found(like.post_id)),
                        ("profile_id", Error::profile_not_found(like.profile_id)),
                    ],
                )
            })
    }

    async fn delete_profile(&self, id: i32) -> Result<bool> {
        let mut conn = self.conn().await?;
        let removed = diesel::delete(profiles::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn delete_post(&self, id: i32) -> Result<bool> {
        let mut conn = self.conn().await?;
        let removed = diesel::delete(posts::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}
