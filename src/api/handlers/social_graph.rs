// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::debug;

use super::{error_response, resolve_profile, JsonResponse};
use crate::api::AppState;
use crate::models::FollowsQuery;

/// Wrap an already-ordered list in a paginated response
fn paginated<T: Serialize>(key: &str, items: Vec<T>, query: &FollowsQuery) -> JsonResponse {
    let total = items.len() as i64;
    let page: Vec<T> = query.apply(items);

    let mut body = serde_json::json!({
        "pagination": {
            "total": total,
            "limit": query.limit(),
            "offset": query.offset(),
            "page": query.page(),
            "total_pages": query.total_pages(total)
        }
    });
    body[key] = serde_json::json!(page);

    (StatusCode::OK, Json(body))
}

/// Get a list of profiles that a profile is following
pub async fn get_following(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
    Query(query): Query<FollowsQuery>,
) -> impl IntoResponse {
    debug!(
        "Getting following for profile {}, limit: {}, offset: {}",
        profile_id,
        query.limit(),
        query.offset()
    );

    if let Err(response) = resolve_profile(&state.graph, profile_id).await {
        return response;
    }

    match state.graph.following_of(profile_id).await {
        Ok(profiles) => paginated("profiles", profiles, &query),
        Err(e) => error_response("Failed to fetch following", e),
    }
}

/// Get a list of profiles that follow a profile
pub async fn get_followers(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
    Query(query): Query<FollowsQuery>,
) -> impl IntoResponse {
    debug!(
        "Getting followers for profile {}, limit: {}, offset: {}",
        profile_id,
        query.limit(),
        query.offset()
    );

    if let Err(response) = resolve_profile(&state.graph, profile_id).await {
        return response;
    }

    match state.graph.followers_of(profile_id).await {
        Ok(profiles) => paginated("profiles", profiles, &query),
        Err(e) => error_response("Failed to fetch followers", e),
    }
}

/// Get the feed of posts from followed profiles, newest first
pub async fn get_feed(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
    Query(query): Query<FollowsQuery>,
) -> impl IntoResponse {
    debug!("Getting feed for profile {}", profile_id);

    if let Err(response) = resolve_profile(&state.graph, profile_id).await {
        return response;
    }

    match state.graph.feed_for(profile_id).await {
        Ok(posts) => paginated("posts", posts, &query),
        Err(e) => error_response("Failed to fetch feed", e),
    }
}

/// Check if a profile is following another profile
pub async fn check_following(
    State(state): State<AppState>,
    Path((follower_id, followed_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    debug!("Checking if profile {} follows profile {}", follower_id, followed_id);

    for id in [follower_id, followed_id] {
        if let Err(response) = resolve_profile(&state.graph, id).await {
            return response;
        }
    }

    match state.graph.is_following(follower_id, followed_id).await {
        Ok(is_following) => (
            StatusCode::OK,
            Json(serde_json::json!({ "is_following": is_following })),
        ),
        Err(e) => error_response("Failed to check follow status", e),
    }
}

/// Create a follow edge; repeating it is a no-op
pub async fn follow_profile(
    State(state): State<AppState>,
    Path((follower_id, followed_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    match state.graph.follow(follower_id, followed_id).await {
        Ok(created) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(serde_json::json!({ "created": created })))
        }
        Err(e) => error_response("Failed to follow profile", e),
    }
}

/// Remove a follow edge
pub async fn unfollow_profile(
    State(state): State<AppState>,
    Path((follower_id, followed_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    match state.graph.unfollow(follower_id, followed_id).await {
        Ok(removed) => (StatusCode::OK, Json(serde_json::json!({ "removed": removed }))),
        Err(e) => error_response("Failed to unfollow profile", e),
    }
}
