//! Router-level tests driven through the full middleware stack: auth
//! enforcement, login round trip, and the payment gate on quoting.
//! Run: cargo test -p admin-server --test http_api

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use admin_server::audit::AuditService;
use admin_server::auth::LoginThrottle;
use admin_server::core::build_app;
use admin_server::db::DbService;
use admin_server::db::models::PaymentSettingsUpdate;
use admin_server::db::repository::PaymentSettingsRepository;
use admin_server::pricing::{NoSurcharge, SnapshotCache};
use admin_server::{Config, JwtService, ServerState};

const ADMIN_USER: &str = "admin";
const ADMIN_PASS: &str = "integration-pass";

async fn test_app() -> (Router, ServerState) {
    let config = Config::from_env();
    let db = DbService::memory().await.unwrap();
    db.seed_default_admin(ADMIN_USER, ADMIN_PASS).await.unwrap();

    let state = ServerState {
        jwt: Arc::new(JwtService::with_config(config.jwt.clone())),
        audit: AuditService::new(db.db.clone()),
        throttle: Arc::new(LoginThrottle::new()),
        snapshots: Arc::new(SnapshotCache::new()),
        schedule: Arc::new(NoSurcharge),
        config,
        db,
    };
    (build_app(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": ADMIN_USER, "password": ADMIN_PASS }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tax-rules")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn login_then_me_roundtrip() {
    let (app, _state) = test_app().await;
    let token = login(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], ADMIN_USER);
    assert_eq!(body["role"], "ADMIN");
}

#[tokio::test]
async fn quote_rejects_disabled_payment_channel() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    PaymentSettingsRepository::new(state.db.db.clone())
        .update(PaymentSettingsUpdate {
            cod_enabled: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut request = json_request(
        "POST",
        "/api/quote",
        serde_json::json!({ "subtotal": "1000", "payment_method": "cod" }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0005");
}

#[tokio::test]
async fn quote_evaluates_with_a_valid_token() {
    let (app, _state) = test_app().await;
    let token = login(&app).await;

    let mut request = json_request(
        "POST",
        "/api/quote",
        serde_json::json!({ "subtotal": "1000" }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // No rules configured, so the quote is just the subtotal
    assert_eq!(body["grand_total"], "1000");
}
