use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use thiserror::Error;

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Failures of an identification request. Each one short-circuits the
/// handler with `{"error": <message>}`; none is retried.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No image provided")]
    Input,

    #[error("AI service not configured")]
    Config,

    #[error("Rate limit exceeded. Please try again in a moment.")]
    UpstreamRateLimited,

    #[error("Failed to identify monument")]
    Upstream { status: u16 },

    #[error("No response from AI")]
    UpstreamEmptyResponse,

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// Internal failure carrying `message`, or a generic text when it is empty.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            RelayError::Internal(UNKNOWN_ERROR.to_string())
        } else {
            RelayError::Internal(message)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Input => StatusCode::BAD_REQUEST,
            RelayError::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::Config
            | RelayError::Upstream { .. }
            | RelayError::UpstreamEmptyResponse
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP status the upstream answered with, for upstream failures.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RelayError::UpstreamRateLimited => Some(429),
            RelayError::Upstream { status } => Some(*status),
            _ => None,
        }
    }

    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Input => "input_error",
            RelayError::Config => "config_error",
            RelayError::UpstreamRateLimited => "upstream_rate_limited",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::UpstreamEmptyResponse => "upstream_empty_response",
            RelayError::Internal(_) => "internal_error",
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => RelayError::UpstreamRateLimited,
            ProviderError::ApiError { status, body } => {
                tracing::error!(status, body = %body, "AI API error");
                RelayError::Upstream { status }
            }
            ProviderError::NetworkError(msg) | ProviderError::InvalidResponse(msg) => {
                RelayError::internal(msg)
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// `CatchPanicLayer` hook: a panic anywhere below becomes a JSON 500 with
/// the panic message instead of a dropped connection.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        String::new()
    };

    tracing::error!(panic = %message, "Handler panicked");
    RelayError::internal(message).into_response()
}
