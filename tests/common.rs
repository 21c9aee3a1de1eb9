#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::Value;
use sessiontron::config::{
    BackendConfig, ConfigV1, LoggingConfig, SessionConfig, SiteConfig, StorageConfig, UiConfig,
};
use sessiontron::routes::create_router;
use sessiontron::startup::build_state;

pub const SECRET: &str = "integration-secret";

pub fn config(backend: BackendConfig) -> ConfigV1 {
    ConfigV1 {
        bind_address: "127.0.0.1:0".to_string(),
        backend,
        session: SessionConfig {
            secret: SECRET.to_string(),
            max_age: 3600,
            safety_window_secs: 5,
        },
        storage: StorageConfig::default(),
        ui: UiConfig::default(),
        site: SiteConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub fn dev_config() -> ConfigV1 {
    config(BackendConfig {
        dev_mode: true,
        ..BackendConfig::default()
    })
}

pub fn backend_config(url: &str) -> ConfigV1 {
    config(BackendConfig {
        url: Some(url.to_string()),
        timeout_in_ms: 2000,
        ..BackendConfig::default()
    })
}

pub fn build_app(config: ConfigV1) -> Router {
    create_router(build_state(Arc::new(config)))
}

pub fn json_request(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn request_with_bearer(path: &str, token: &str, method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
