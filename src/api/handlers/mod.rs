// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod health;
pub mod posts;
pub mod profiles;
pub mod social_graph;

use axum::{http::StatusCode, Json};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::Error;
use crate::graph::SocialGraph;
use crate::models::Profile;

pub(crate) type JsonResponse = (StatusCode, Json<Value>);

/// Map a query-layer error to a status code and `{"error": ...}` body
pub(crate) fn error_response(context: &str, err: Error) -> JsonResponse {
    match err {
        Error::NotFound { entity, id } => {
            debug!("{}: {} {} not found", context, entity, id);
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("{} {} not found", entity, id)
                })),
            )
        }
        Error::InvalidInput(reason) => {
            debug!("{}: {}", context, reason);
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": reason })),
            )
        }
        other => {
            error!("{}: {}", context, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("{}: {}", context, other)
                })),
            )
        }
    }
}

/// Resolve the profile in the path before running a graph query on it
pub(crate) async fn resolve_profile(graph: &SocialGraph, id: i32) -> Result<Profile, JsonResponse> {
    graph
        .require_profile(id)
        .await
        .map_err(|e| error_response("Failed to check profile", e))
}
