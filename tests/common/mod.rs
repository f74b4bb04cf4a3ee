//! Shared test harness for route-level tests.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response},
    Router,
};
use gatehouse::api::{build_router, AppState};
use gatehouse::config::AppConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub config: AppConfig,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.server)
    }
}

pub async fn setup_test_app() -> TestApp {
    // One connection so the whole pool shares the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("create sqlite pool");

    gatehouse::storage::run_migrations(&pool).await.expect("run migrations for tests");

    let config = AppConfig::default();
    let state = AppState::new(&config, pool);

    TestApp { state, config }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}
