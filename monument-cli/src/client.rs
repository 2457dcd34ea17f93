//! "Invoke a remote function by name" client.
//!
//! Mirrors the `{data, error}` contract of hosted function runtimes: the call
//! itself never fails, it reports either a JSON payload or an error.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Outcome of a function invocation; exactly one side is populated.
#[derive(Debug, Clone, Default)]
pub struct FunctionResponse {
    pub data: Option<Value>,
    pub error: Option<FunctionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionError {
    pub message: String,
    /// HTTP status, when the function answered at all.
    pub status: Option<u16>,
}

impl FunctionResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            data: None,
            error: Some(FunctionError {
                message: message.into(),
                status,
            }),
        }
    }
}

#[async_trait]
pub trait FunctionsClient: Send + Sync {
    async fn invoke(&self, name: &str, body: &Value) -> FunctionResponse;
}

/// Posts JSON to `{base_url}/{name}`.
pub struct HttpFunctionsClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpFunctionsClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl FunctionsClient for HttpFunctionsClient {
    async fn invoke(&self, name: &str, body: &Value) -> FunctionResponse {
        let mut request = self.client.post(self.function_url(name)).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(function = name, "Invoking relay function");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FunctionResponse::err(format!("Failed to reach relay: {}", e), None),
        };

        let status = response.status();
        let payload: Option<Value> = response.json().await.ok();

        if status.is_success() {
            return match payload {
                Some(data) => FunctionResponse::ok(data),
                None => FunctionResponse::err("Relay returned a non-JSON body", Some(status.as_u16())),
            };
        }

        let message = payload
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Function returned status {}", status.as_u16()));

        FunctionResponse::err(message, Some(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn joins_base_url_and_name() {
        let client = HttpFunctionsClient::new("http://localhost:8080/", None);
        assert_eq!(
            client.function_url("identify-monument"),
            "http://localhost:8080/identify-monument"
        );
    }

    #[tokio::test]
    async fn success_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/identify-monument"))
            .and(header("authorization", "Bearer anon-key"))
            .and(body_json(json!({ "image": "data:image/png;base64,AA" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Big Ben" })))
            .mount(&server)
            .await;

        let client = HttpFunctionsClient::new(server.uri(), Some("anon-key".to_string()));
        let response = client
            .invoke(
                "identify-monument",
                &json!({ "image": "data:image/png;base64,AA" }),
            )
            .await;

        assert_eq!(response.data, Some(json!({ "name": "Big Ben" })));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({ "error": "Rate limit exceeded. Please try again in a moment." })),
            )
            .mount(&server)
            .await;

        let client = HttpFunctionsClient::new(server.uri(), None);
        let response = client.invoke("identify-monument", &json!({})).await;

        assert!(response.data.is_none());
        assert_eq!(
            response.error,
            Some(FunctionError {
                message: "Rate limit exceeded. Please try again in a moment.".to_string(),
                status: Some(429),
            })
        );
    }

    #[tokio::test]
    async fn non_json_error_gets_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = HttpFunctionsClient::new(server.uri(), None);
        let response = client.invoke("identify-monument", &json!({})).await;

        assert_eq!(
            response.error.map(|e| e.message),
            Some("Function returned status 502".to_string())
        );
    }
}
