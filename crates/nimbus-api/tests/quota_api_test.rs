//! Integration tests for plan-quota enforcement on the save endpoint.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use nimbus_api::test_support::{test_state_with, ScriptedChatBackend, StaticVerifier};
use nimbus_api::{build_router, AppState};
use nimbus_core::PlanPolicy;

/// Tight ceilings so every limit is reachable in a couple of requests.
fn tight_state(max_notes: i64, max_chars: i64, max_bytes: i64) -> AppState {
    test_state_with(
        StaticVerifier::new().with_token("alice-token", "alice"),
        ScriptedChatBackend::new(),
        PlanPolicy::new(max_notes, max_chars, max_bytes),
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn save(
    app: &axum::Router,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/notes")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn char_limit_denial_carries_the_structured_body() {
    let app = build_router(tight_state(10, 5, 100_000));

    let (status, body) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "six ch" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorCode"], "NOTE_CHAR_LIMIT_EXCEEDED");
    assert_eq!(body["limitType"], "chars");
    assert_eq!(body["requiresPro"], true);
    assert_eq!(body["plan"], "free");
    assert_eq!(body["limits"]["maxCharsPerNote"], 5);
    assert_eq!(body["usage"]["used"], 6);
    assert_eq!(body["usage"]["limit"], 5);
    assert!(body["error"].as_str().unwrap().contains("character limit"));
}

#[tokio::test]
async fn count_limit_blocks_creates_but_not_updates() {
    let app = build_router(tight_state(1, 10_000, 100_000));

    let (status, created) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "first" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "second" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorCode"], "NOTE_COUNT_LIMIT_EXCEEDED");
    assert_eq!(body["limitType"], "notes");

    // Updating the existing note does not raise the count.
    let (status, _) = save(
        &app,
        "alice-token",
        serde_json::json!({ "id": created["id"], "content": "first, revised" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn char_violation_reported_before_count_violation() {
    // One payload violating both ceilings: the char check runs first.
    let app = build_router(tight_state(1, 5, 100_000));

    let (status, _) = save(&app, "alice-token", serde_json::json!({ "content": "ok" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "far too many characters" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorCode"], "NOTE_CHAR_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn sitting_exactly_at_the_ceiling_is_allowed() {
    let app = build_router(tight_state(10, 5, 100_000));

    let (status, _) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "5char" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn storage_limit_denial() {
    // Storage estimate includes title, folder and timestamp text, so a
    // tiny byte ceiling trips on any realistic note.
    let app = build_router(tight_state(10, 10_000, 16));

    let (status, body) = save(
        &app,
        "alice-token",
        serde_json::json!({ "content": "some note body" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorCode"], "STORAGE_LIMIT_EXCEEDED");
    assert_eq!(body["limitType"], "storage");
}

#[tokio::test]
async fn upgraded_owner_bypasses_every_ceiling() {
    let app = build_router(tight_state(1, 5, 16));

    // Establish the account, then upgrade it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/google")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "credential": "alice-token" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/billing/upgrade")
                .header(header::AUTHORIZATION, "Bearer alice-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for content in ["well past the char ceiling", "and a second note"] {
        let (status, body) = save(
            &app,
            "alice-token",
            serde_json::json!({ "content": content }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"], "pro");
        assert!(body["limits"]["maxNotes"].is_null());
    }
}
