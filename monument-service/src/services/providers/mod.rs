//! Vision model provider abstractions and implementations.
//!
//! The relay talks to one upstream at a time through [`VisionProvider`];
//! [`gateway::ChatCompletionsProvider`] is the production backend and
//! [`mock::MockVisionProvider`] scripts responses for tests.

pub mod gateway;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of a provider call.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Assistant text of the first choice, if any.
    pub text: Option<String>,

    /// Model that produced the answer, as reported by the upstream.
    pub model: Option<String>,

    pub input_tokens: u32,

    pub output_tokens: u32,

    pub finish_reason: Option<String>,
}

/// Generation parameters for an identification request.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Output length cap.
    pub max_tokens: u32,
}

/// Trait for image-understanding chat providers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Ask the model about `image` (a data URL or remote URL).
    async fn identify(
        &self,
        image: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
