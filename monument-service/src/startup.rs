//! Application startup and lifecycle management.

use crate::config::{GatewaySettings, MonumentConfig};
use crate::error::panic_response;
use crate::handlers::{
    health::{health_check, readiness_check},
    identify::identify_monument,
    metrics::metrics,
};
use crate::services::prompt::{SYSTEM_PROMPT, USER_PROMPT};
use crate::services::providers::gateway::{ChatCompletionsProvider, GatewayConfig};
use crate::services::providers::{GenerationParams, VisionProvider};
use axum::{
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::{
    cors::cors_middleware,
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use service_core::shutdown::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: MonumentConfig,
    /// `None` when no credential is configured; requests then fail closed.
    pub provider: Option<Arc<dyn VisionProvider>>,
}

impl AppState {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: USER_PROMPT.to_string(),
            max_tokens: self.config.gateway.max_tokens,
        }
    }
}

/// Construct the gateway provider once at startup.
pub fn build_provider(
    settings: &GatewaySettings,
) -> Result<Option<Arc<dyn VisionProvider>>, AppError> {
    let Some(api_key) = settings.api_key.clone() else {
        tracing::error!(
            "AI_GATEWAY_API_KEY not configured; identification requests will be refused"
        );
        return Ok(None);
    };

    let provider = ChatCompletionsProvider::new(GatewayConfig {
        api_key,
        model: settings.model.clone(),
        base_url: settings.base_url.clone(),
        timeout: settings.timeout,
    })
    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

    tracing::info!(
        model = %settings.model,
        base_url = %settings.base_url,
        "Initialized AI gateway provider"
    );

    Ok(Some(Arc::new(provider)))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(identify_monument))
        .route("/identify-monument", post(identify_monument))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route_layer(from_fn(metrics_middleware))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(cors_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: MonumentConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.gateway)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build with an explicit provider (tests inject a mock here).
    pub async fn build_with_provider(
        config: MonumentConfig,
        provider: Option<Arc<dyn VisionProvider>>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Monument service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { config, provider },
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
