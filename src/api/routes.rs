// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Build the router with all routes, state and middleware
pub fn router(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))

        // Profile routes
        .route("/api/profiles", get(handlers::profiles::get_profiles))
        .route("/api/profiles/:id", get(handlers::profiles::get_profile))
        .route(
            "/api/profiles/:id/posts",
            get(handlers::profiles::get_profile_posts).post(handlers::posts::create_post),
        )

        // Social graph routes
        .route("/api/profiles/:id/followers", get(handlers::social_graph::get_followers))
        .route("/api/profiles/:id/following", get(handlers::social_graph::get_following))
        .route(
            "/api/profiles/:id/following/:other",
            get(handlers::social_graph::check_following)
                .post(handlers::social_graph::follow_profile)
                .delete(handlers::social_graph::unfollow_profile),
        )
        .route("/api/profiles/:id/feed", get(handlers::social_graph::get_feed))

        // Post routes
        .route("/api/posts/:id", get(handlers::posts::get_post))

        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}
