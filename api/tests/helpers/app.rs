use api::app;
use axum::{body::Body, http::Request, response::Response};
use base64::{Engine, engine::general_purpose::STANDARD};
use db::test_utils::setup_test_db;
use forward::Forwarder;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tower::ServiceExt;
use tower::util::BoxCloneService;
use util::config::AppConfig;
use util::{state::AppState, ws::WebSocketManager};

use super::upstream::StubUpstream;

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct TestApp {
    pub service: BoxCloneService<Request<Body>, Response, Infallible>,
    pub state: AppState,
    pub upstream: Arc<StubUpstream>,
}

/// Full router over a fresh in-memory database, with the registration service replaced
/// by `upstream`.
pub async fn make_test_app(upstream: StubUpstream) -> TestApp {
    AppConfig::set_admin_key_secret(ADMIN_KEY);

    let upstream = Arc::new(upstream);
    let state = AppState::new(
        setup_test_db().await,
        WebSocketManager::new(),
        Forwarder::new(upstream.clone()),
    );
    let service = app(state.clone()).into_service().boxed_clone();

    TestApp {
        service,
        state,
        upstream,
    }
}

/// Base64 `staff:key` pair using the test admin key.
pub fn credentials(staff: &str) -> String {
    STANDARD.encode(format!("{staff}:{ADMIN_KEY}"))
}

/// `Authorization` value for `staff` using the test admin key.
pub fn auth_header(staff: &str) -> String {
    format!("Basic {}", credentials(staff))
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (axum::http::StatusCode, Value) {
        let response = self.service.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// POST /graphql as `staff`.
    pub async fn graphql(&self, staff: &str, body: Value) -> (axum::http::StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .header("authorization", auth_header(staff))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}
