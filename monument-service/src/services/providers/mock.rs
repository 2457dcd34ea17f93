//! Mock provider implementation for testing.

use super::{GenerationParams, ProviderError, ProviderResponse, VisionProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted outcome returned by [`MockVisionProvider`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Empty,
    RateLimited,
    ApiError(u16),
    NetworkError(String),
    Panic(String),
}

/// Mock vision provider that replays one scripted reply and counts calls.
pub struct MockVisionProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(MockReply::Text(content.into()))
    }

    /// Number of times `identify` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn identify(
        &self,
        _image: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            MockReply::Text(text) => Ok(ProviderResponse {
                text: Some(text.clone()),
                model: Some("mock".to_string()),
                input_tokens: 0,
                output_tokens: text.len() as u32 / 4,
                finish_reason: Some("stop".to_string()),
            }),
            MockReply::Empty => Ok(ProviderResponse::default()),
            MockReply::RateLimited => Err(ProviderError::RateLimited),
            MockReply::ApiError(status) => Err(ProviderError::ApiError {
                status: *status,
                body: "mock upstream failure".to_string(),
            }),
            MockReply::NetworkError(message) => Err(ProviderError::NetworkError(message.clone())),
            MockReply::Panic(message) => panic!("{}", message),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
