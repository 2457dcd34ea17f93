//! Shared helpers for monument-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use monument_service::config::{GatewaySettings, MonumentConfig, ObservabilitySettings};
use monument_service::services::providers::gateway::DEFAULT_MODEL;
use monument_service::services::providers::mock::{MockReply, MockVisionProvider};
use monument_service::services::providers::VisionProvider;
use monument_service::startup::{build_router, Application};
use monument_service::AppState;
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-gateway-key";
pub const TEST_IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==";

pub fn test_config(base_url: &str, api_key: Option<&str>) -> MonumentConfig {
    MonumentConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        environment: "test".to_string(),
        gateway: GatewaySettings {
            api_key: api_key.map(|key| Secret::new(key.to_string())),
            base_url: base_url.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            timeout: Some(Duration::from_secs(5)),
        },
        observability: ObservabilitySettings {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Router backed by a scripted provider; the returned handle counts calls.
pub fn mock_router(reply: MockReply) -> (Router, Arc<MockVisionProvider>) {
    let mock = Arc::new(MockVisionProvider::new(reply));
    let provider: Arc<dyn VisionProvider> = mock.clone();
    let state = AppState {
        config: test_config("http://unused.invalid", Some(TEST_API_KEY)),
        provider: Some(provider),
    };
    (build_router(state), mock)
}

/// Router with no credential configured.
pub fn unconfigured_router() -> Router {
    build_router(AppState {
        config: test_config("http://unused.invalid", None),
        provider: None,
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_identify(app: Router, body: &str) -> TestResponse {
    send(app, Method::POST, "/identify-monument", Some(body)).await
}

pub fn identify_body(image: &str) -> String {
    serde_json::json!({ "image": image }).to_string()
}

/// Spawn the full application on a random port and return its base URL.
pub async fn spawn_app(config: MonumentConfig) -> String {
    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    address
}

/// Chat-completions success body carrying `content` as the assistant text.
pub fn completion_body(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "model": DEFAULT_MODEL,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 1200, "completion_tokens": 300 }
    })
}
