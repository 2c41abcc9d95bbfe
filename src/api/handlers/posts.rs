// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use super::{error_response, resolve_profile};
use crate::api::AppState;

/// Body of the create-post form
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub caption: String,
    pub image_url: Option<String>,
}

/// Get a post with its photos, comments and likes
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> impl IntoResponse {
    debug!("Getting post {}", post_id);

    let detail = match state.graph.post_detail(post_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": "Post not found"
                })),
            )
        }
        Err(e) => return error_response("Failed to fetch post", e),
    };

    let media_url = &state.config.media.media_url;
    let photos: Vec<serde_json::Value> = detail
        .photos
        .iter()
        .map(|photo| {
            serde_json::json!({
                "id": photo.id,
                "url": photo.resolve_url(media_url),
                "timestamp": photo.timestamp
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "post": detail.post,
            "photos": photos,
            "comments": detail.comments,
            "likes": detail.likes,
            "like_count": detail.likes.len()
        })),
    )
}

/// Create a post for a profile, optionally with one image URL
pub async fn create_post(
    State(state): State<AppState>,
    Path(profile_id): Path<i32>,
    Json(request): Json<CreatePostRequest>,
) -> impl IntoResponse {
    if let Err(response) = resolve_profile(&state.graph, profile_id).await {
        return response;
    }

    match state
        .graph
        .create_post(profile_id, request.caption, request.image_url)
        .await
    {
        Ok(post) => (StatusCode::CREATED, Json(serde_json::json!({ "post": post }))),
        Err(e) => error_response("Failed to create post", e),
    }
}
