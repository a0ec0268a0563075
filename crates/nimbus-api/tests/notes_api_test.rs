//! Integration tests for the note sync endpoints.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use nimbus_api::test_support::{test_state_with, ScriptedChatBackend, StaticVerifier};
use nimbus_api::{build_router, AppState};
use nimbus_core::PlanPolicy;

fn two_user_state() -> AppState {
    test_state_with(
        StaticVerifier::new()
            .with_token("alice-token", "alice")
            .with_token("bob-token", "bob"),
        ScriptedChatBackend::new(),
        PlanPolicy::new(100, 10_000, 5 * 1024 * 1024),
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn save(
    app: &axum::Router,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(authed("POST", "/notes", token, Some(body)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn create_list_update_delete_flow() {
    let app = build_router(two_user_state());

    let (status, created) = save(
        &app,
        "alice-token",
        serde_json::json!({ "title": "Groceries", "content": "milk" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["ok"], true);
    assert_eq!(created["plan"], "free");
    let id = created["id"].as_str().unwrap().to_string();

    // Update through the returned id.
    let (status, updated) = save(
        &app,
        "alice-token",
        serde_json::json!({ "id": id, "title": "Groceries", "content": "milk, eggs" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());

    let response = app
        .clone()
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["content"], "milk, eggs");
    assert!(listed[0].get("ownerId").is_none(), "owner never serialized");

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/notes/{}", id),
            "alice-token",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ok"], true);

    let response = app
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_orders_by_last_modified_descending() {
    let app = build_router(two_user_state());

    for (title, last_modified) in [("old", 1_000), ("newest", 3_000), ("middle", 2_000)] {
        let (status, _) = save(
            &app,
            "alice-token",
            serde_json::json!({ "title": title, "lastModified": last_modified }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["newest", "middle", "old"]);
}

#[tokio::test]
async fn defaults_applied_to_sparse_payload() {
    let app = build_router(two_user_state());

    let (status, _) = save(&app, "alice-token", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed[0]["title"], "Untitled Note");
    assert_eq!(listed[0]["folder"], "General");
    assert_eq!(listed[0]["content"], "");
}

#[tokio::test]
async fn local_id_resaves_converge_on_one_note() {
    let app = build_router(two_user_state());

    let (_, first) = save(
        &app,
        "alice-token",
        serde_json::json!({ "localId": "offline-7", "content": "draft" }),
    )
    .await;
    let (_, second) = save(
        &app,
        "alice-token",
        serde_json::json!({ "localId": "offline-7", "content": "final" }),
    )
    .await;
    assert_eq!(first["id"], second["id"]);

    let response = app
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["content"], "final");
    assert_eq!(listed[0]["localId"], "offline-7");
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = build_router(two_user_state());

    let (status, body) = save(
        &app,
        "alice-token",
        serde_json::json!({ "id": "not-a-uuid", "content": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = build_router(two_user_state());

    let (status, _) = save(
        &app,
        "alice-token",
        serde_json::json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "content": "x",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_are_isolated_between_owners() {
    let app = build_router(two_user_state());

    let (_, created) = save(
        &app,
        "alice-token",
        serde_json::json!({ "title": "private", "content": "alice only" }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    // Bob cannot see it.
    let response = app
        .clone()
        .oneshot(authed("GET", "/notes", "bob-token", None))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    // Bob cannot update it either; the id behaves as unknown.
    let (status, _) = save(
        &app,
        "bob-token",
        serde_json::json!({ "id": id, "content": "hijacked" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob's delete of Alice's id is a silent no-op.
    let response = app
        .clone()
        .oneshot(authed("DELETE", &format!("/notes/{}", id), "bob-token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed("GET", "/notes", "alice-token", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_is_idempotent_for_any_id_shape() {
    let app = build_router(two_user_state());

    for id in [uuid::Uuid::new_v4().to_string(), "garbage".to_string()] {
        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/notes/{}", id), "alice-token", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }
}
