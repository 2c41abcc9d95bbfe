// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::debug;

use super::{error_response, resolve_profile};
use crate::api::AppState;

/// List every profile
pub async fn get_profiles(State(state): State<AppState>) -> impl IntoResponse {
    match state.graph.profiles().await {
        Ok(profiles) => (
            StatusCode::OK,
            Json(serde_json::json!({ "profiles": profiles })),
        ),
        Err(e) => error_response("Failed to fetch profiles", e),
    }
}

/// Get a single profile together with its follow stats
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
) -> impl IntoResponse {
    debug!("Getting profile {}", profile_id);

    let profile = match resolve_profile(&state.graph, profile_id).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    match state.graph.follow_stats(profile_id).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "profile": profile,
                "followers_count": stats.followers_count,
                "following_count": stats.following_count
            })),
        ),
        Err(e) => error_response("Failed to fetch profile stats", e),
    }
}

/// Get the profile's own posts, newest first
pub async fn get_profile_posts(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
) -> impl IntoResponse {
    if let Err(response) = resolve_profile(&state.graph, profile_id).await {
        return response;
    }

    match state.graph.posts_of(profile_id).await {
        Ok(posts) => (StatusCode::OK, Json(serde_json::json!({ "posts": posts }))),
        Err(e) => error_response("Failed to fetch posts", e),
    }
}
