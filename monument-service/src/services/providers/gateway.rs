//! OpenAI-compatible chat-completions provider.
//!
//! Sends one system turn and one multimodal user turn (image reference plus
//! a text prompt) to `{base_url}/chat/completions` with a bearer credential.

use super::{GenerationParams, ProviderError, ProviderResponse, VisionProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default AI gateway base URL.
pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";

/// Default multimodal model.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";

/// Gateway provider configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
}

pub struct ChatCompletionsProvider {
    config: GatewayConfig,
    client: Client,
}

impl ChatCompletionsProvider {
    pub fn new(config: GatewayConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, image: &str, params: &GenerationParams) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(params.system_prompt.clone()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: image.to_string(),
                            },
                        },
                        ContentPart::Text {
                            text: params.user_prompt.clone(),
                        },
                    ]),
                },
            ],
            max_tokens: params.max_tokens,
        }
    }
}

#[async_trait]
impl VisionProvider for ChatCompletionsProvider {
    async fn identify(
        &self,
        image: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(image, params);

        tracing::debug!(
            model = %self.config.model,
            image_len = image.len(),
            max_tokens = params.max_tokens,
            "Sending request to AI gateway"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);

            if status.as_u16() == 429 {
                tracing::warn!(status = status.as_u16(), body = %body, "AI gateway rate limited");
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = api_response.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let text = choice
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .and_then(|content| match content {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });

        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            model: api_response.model,
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

/// Upstream error body for logging; a failed read is reported in its place.
fn error_body(read: Result<String, reqwest::Error>) -> String {
    read.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read AI gateway error body");
        format!("<unreadable body: {}>", e)
    })
}

// ============================================================================
// Chat Completions Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> ChatCompletionsProvider {
        ChatCompletionsProvider::new(GatewayConfig {
            api_key: Secret::new("test-gateway-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    fn params() -> GenerationParams {
        GenerationParams {
            system_prompt: "system".to_string(),
            user_prompt: "identify".to_string(),
            max_tokens: 2000,
        }
    }

    fn completion(content: Value) -> Value {
        json!({
            "model": "google/gemini-2.5-pro",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 812, "completion_tokens": 140 }
        })
    }

    #[test]
    fn unreadable_error_body_is_reported() {
        let read_error = Client::new().get("not a url").build().unwrap_err();
        let body = error_body(Err(read_error));
        assert!(body.starts_with("<unreadable body: "), "{body}");

        assert_eq!(error_body(Ok("quota exceeded".to_string())), "quota exceeded");
    }

    #[test]
    fn request_shape() {
        let provider = provider("http://unused".to_string());
        let request = serde_json::to_value(
            provider.build_request("data:image/png;base64,AAAA", &params()),
        )
        .unwrap();

        assert_eq!(
            request,
            json!({
                "model": "google/gemini-2.5-pro",
                "messages": [
                    { "role": "system", "content": "system" },
                    {
                        "role": "user",
                        "content": [
                            { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } },
                            { "type": "text", "text": "identify" }
                        ]
                    }
                ],
                "max_tokens": 2000
            })
        );
    }

    #[tokio::test]
    async fn sends_bearer_credential_and_returns_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-gateway-key"))
            .and(body_partial_json(json!({ "max_tokens": 2000 })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(json!("{\"name\":\"Eiffel Tower\"}"))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = provider(mock_server.uri())
            .identify("https://example.com/tower.jpg", &params())
            .await
            .unwrap();

        assert_eq!(response.text.as_deref(), Some("{\"name\":\"Eiffel Tower\"}"));
        assert_eq!(response.input_tokens, 812);
        assert_eq!(response.output_tokens, 140);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri()).identify("img", &params()).await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }

    #[tokio::test]
    async fn other_failures_keep_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
            .mount(&mock_server)
            .await;

        match provider(mock_server.uri()).identify("img", &params()).await {
            Err(ProviderError::ApiError { status, body }) => {
                assert_eq!(status, 402);
                assert_eq!(body, "payment required");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_yield_no_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let response = provider(mock_server.uri())
            .identify("img", &params())
            .await
            .unwrap();
        assert!(response.text.is_none());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri()).identify("img", &params()).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }
}
