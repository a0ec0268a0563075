//! Integration tests for the assistant chat endpoint.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use governor::{Quota, RateLimiter};
use http_body_util::BodyExt;
use tower::ServiceExt;

use nimbus_api::test_support::{test_state_with, ScriptedChatBackend, StaticVerifier};
use nimbus_api::{build_router, AppState};
use nimbus_core::PlanPolicy;

fn chat_state(chat: ScriptedChatBackend) -> AppState {
    test_state_with(
        StaticVerifier::new().with_token("good-token", "subject-1"),
        chat,
        PlanPolicy::default(),
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ai/chat")
        .header(header::AUTHORIZATION, "Bearer good-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn chat_returns_the_backend_reply() {
    let app = build_router(chat_state(
        ScriptedChatBackend::new().reply_with("Hello from the assistant"),
    ));

    let response = app
        .oneshot(chat_request(serde_json::json!({
            "message": "hi",
            "history": [
                { "role": "user", "content": "earlier question" },
                { "role": "assistant", "content": "earlier answer" },
            ],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["reply"], "Hello from the assistant");
}

#[tokio::test]
async fn empty_message_is_bad_request_without_touching_the_backend() {
    let backend = Arc::new(ScriptedChatBackend::new().reply_with("unused"));
    let mut state = chat_state(ScriptedChatBackend::new());
    state.chat = backend.clone();
    let app = build_router(state);

    for message in ["", "   "] {
        let response = app
            .clone()
            .oneshot(chat_request(serde_json::json!({ "message": message })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn backend_exhaustion_is_a_generic_service_unavailable() {
    let app = build_router(chat_state(
        ScriptedChatBackend::new().fail_with("model xyz returned 500 at v1beta"),
    ));

    let response = app
        .oneshot(chat_request(serde_json::json!({ "message": "hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    // Upstream detail stays in the logs.
    assert_eq!(body["error"], "AI service unavailable");
}

#[tokio::test]
async fn chat_does_not_require_a_bearer_token() {
    let app = build_router(chat_state(
        ScriptedChatBackend::new().reply_with("anonymous reply"),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ai/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "message": "hi" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["reply"], "anonymous reply");
}

#[tokio::test]
async fn rate_limited_chat_returns_too_many_requests() {
    let mut state = chat_state(
        ScriptedChatBackend::new()
            .reply_with("first")
            .reply_with("second"),
    );
    // Burst of exactly one request per period.
    let quota = Quota::with_period(std::time::Duration::from_secs(60))
        .unwrap()
        .allow_burst(NonZeroU32::new(1).unwrap());
    state.rate_limiter = Some(Arc::new(RateLimiter::direct(quota)));
    let app = build_router(state);

    let first = app
        .clone()
        .oneshot(chat_request(serde_json::json!({ "message": "hi" })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(chat_request(serde_json::json!({ "message": "hi again" })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Other routes are not behind the limiter.
    let health = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
