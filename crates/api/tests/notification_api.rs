//! HTTP-level tests for the `/notifications` inbox.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, get_auth, post_auth, seed_user, token_for, TestApp,
};
use kree_api::notifications::NotificationDispatcher;
use kree_core::roles::Role;
use kree_core::status::NotificationKind;
use kree_db::models::user::User;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn notify(t: &TestApp, user: &User, title: &str) -> i64 {
    let dispatcher: &NotificationDispatcher = &t.state.dispatcher;
    dispatcher
        .notify(
            user.id,
            title,
            format!("{title} body"),
            NotificationKind::Info,
            None,
        )
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Test: listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_newest_first_and_paginated() {
    let t = build_test_app();
    let sara = seed_user(t.store(), "Sara", Role::Client).await;
    notify(&t, &sara, "first").await;
    notify(&t, &sara, "second").await;
    notify(&t, &sara, "third").await;
    let token = token_for(&sara);

    let response = get_auth(t.router(), "/api/v1/notifications", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
    assert_eq!(json["data"][0]["type"], "info");
    assert_eq!(json["data"][0]["isRead"], false);

    let response = get_auth(t.router(), "/api/v1/notifications?limit=1&offset=1", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "second");
}

#[tokio::test]
async fn inbox_is_private() {
    let t = build_test_app();
    let sara = seed_user(t.store(), "Sara", Role::Client).await;
    let atlas = seed_user(t.store(), "Atlas Cars", Role::Agency).await;
    let id = notify(&t, &sara, "hello").await;

    let response = get_auth(t.router(), "/api/v1/notifications", &token_for(&atlas)).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = post_auth(
        t.router(),
        &format!("/api/v1/notifications/{id}/read"),
        &token_for(&atlas),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(t.router(), "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: read state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mark_read_and_unread_filter() {
    let t = build_test_app();
    let sara = seed_user(t.store(), "Sara", Role::Client).await;
    let first = notify(&t, &sara, "first").await;
    notify(&t, &sara, "second").await;
    let token = token_for(&sara);

    let response = post_auth(
        t.router(),
        &format!("/api/v1/notifications/{first}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(t.router(), "/api/v1/notifications/unread-count", &token).await;
    assert_eq!(body_json(response).await["data"]["count"], 1);

    let response = get_auth(t.router(), "/api/v1/notifications?unread_only=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "second");
}

#[tokio::test]
async fn mark_all_read_reports_count() {
    let t = build_test_app();
    let sara = seed_user(t.store(), "Sara", Role::Client).await;
    notify(&t, &sara, "first").await;
    notify(&t, &sara, "second").await;
    let token = token_for(&sara);

    let response = post_auth(t.router(), "/api/v1/notifications/read-all", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["marked_read"], 2);

    let response = get_auth(t.router(), "/api/v1/notifications/unread-count", &token).await;
    assert_eq!(body_json(response).await["data"]["count"], 0);

    let response = post_auth(t.router(), "/api/v1/notifications/read-all", &token).await;
    assert_eq!(body_json(response).await["data"]["marked_read"], 0);
}
