use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use mini_insta_graph::api::{router, AppState};
use mini_insta_graph::config::Config;
use mini_insta_graph::models::{NewPhoto, NewProfile, Profile};
use mini_insta_graph::store::MemoryStore;
use mini_insta_graph::SocialGraph;

fn app() -> (Router, SocialGraph) {
    let graph = SocialGraph::new(Arc::new(MemoryStore::new()));
    let state = AppState::new(graph.clone(), Config::default());
    (router(state), graph)
}

async fn profile(graph: &SocialGraph, username: &str) -> Profile {
    graph
        .create_profile(NewProfile::new(username, username, Utc::now().naive_utc()))
        .await
        .unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[test_log::test(tokio::test)]
async fn health_reports_healthy() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[test_log::test(tokio::test)]
async fn unknown_profile_is_not_found() {
    let (app, _) = app();
    for uri in [
        "/api/profiles/9",
        "/api/profiles/9/followers",
        "/api/profiles/9/following",
        "/api/profiles/9/feed",
        "/api/posts/9",
    ] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[test_log::test(tokio::test)]
async fn follow_flow_over_http() {
    let (app, graph) = app();
    let a = profile(&graph, "a").await;
    let b = profile(&graph, "b").await;

    let uri = format!("/api/profiles/{}/following/{}", a.id, b.id);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], true);

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["is_following"], true);

    let (_, body) = send(&app, Method::GET, &format!("/api/profiles/{}", b.id), None).await;
    assert_eq!(body["followers_count"], 1);
    assert_eq!(body["following_count"], 0);

    let followers = format!("/api/profiles/{}/followers", b.id);
    let (_, body) = send(&app, Method::GET, &followers, None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["profiles"][0]["username"], "a");

    let (_, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(body["removed"], true);
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["is_following"], false);
}

#[test_log::test(tokio::test)]
async fn created_posts_reach_the_feed() {
    let (app, graph) = app();
    let reader = profile(&graph, "reader").await;
    let author = profile(&graph, "author").await;
    graph.follow(reader.id, author.id).await.unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/profiles/{}/posts", author.id),
        Some(serde_json::json!({
            "caption": "first light",
            "image_url": "https://img.example.com/dawn.jpg"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = body["post"]["id"].as_i64().unwrap();

    let feed = format!("/api/profiles/{}/feed", reader.id);
    let (_, body) = send(&app, Method::GET, &feed, None).await;
    assert_eq!(body["posts"][0]["caption"], "first light");
    assert_eq!(body["pagination"]["total_pages"], 1);

    let (_, body) = send(&app, Method::GET, &format!("/api/posts/{}", post_id), None).await;
    assert_eq!(body["photos"][0]["url"], "https://img.example.com/dawn.jpg");
    assert_eq!(body["like_count"], 0);
}

#[test_log::test(tokio::test)]
async fn local_photo_files_resolve_under_media_url() {
    let (app, graph) = app();
    let author = profile(&graph, "author").await;
    let post = graph.create_post(author.id, "upload", None).await.unwrap();
    graph
        .add_photo(NewPhoto {
            post_id: post.id,
            image_url: None,
            image_file: Some("uploads/cat.png".into()),
            timestamp: Utc::now().naive_utc(),
        })
        .await
        .unwrap();

    let (_, body) = send(&app, Method::GET, &format!("/api/posts/{}", post.id), None).await;
    assert_eq!(body["photos"][0]["url"], "/media/uploads/cat.png");
}

#[test_log::test(tokio::test)]
async fn feed_pagination_windows_the_list() {
    let (app, graph) = app();
    let reader = profile(&graph, "reader").await;
    let author = profile(&graph, "author").await;
    graph.follow(reader.id, author.id).await.unwrap();
    for n in 0..5 {
        graph.create_post(author.id, format!("post {}", n), None).await.unwrap();
    }

    let uri = format!("/api/profiles/{}/feed?limit=2&page=3", reader.id);
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(body["pagination"]["offset"], 4);
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn page_far_past_the_end_is_empty() {
    let (app, graph) = app();
    let reader = profile(&graph, "reader").await;
    let author = profile(&graph, "author").await;
    graph.follow(reader.id, author.id).await.unwrap();
    graph.create_post(author.id, "only", None).await.unwrap();

    let uri = format!("/api/profiles/{}/feed?limit=100&page=922337203685477580", reader.id);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["offset"], i64::MAX);
    assert!(body["posts"].as_array().unwrap().is_empty());

    let uri = format!("/api/profiles/{}/followers?offset={}", author.id, i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["profiles"].as_array().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn overlong_image_url_is_rejected_without_a_post() {
    let (app, graph) = app();
    let author = profile(&graph, "author").await;

    let url = format!("https://img.example.com/{}", "x".repeat(NewPhoto::MAX_URL_LEN));
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/profiles/{}/posts", author.id),
        Some(serde_json::json!({ "caption": "too long", "image_url": url })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("image_url"));
    assert!(graph.posts_of(author.id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn following_a_missing_profile_is_not_found() {
    let (app, graph) = app();
    let a = profile(&graph, "a").await;

    let uri = format!("/api/profiles/{}/following/77", a.id);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "profile 77 not found");
}
