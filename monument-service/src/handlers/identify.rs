use crate::error::RelayError;
use crate::models::{IdentifyRequest, MonumentRecord};
use crate::services::metrics::{record_identification, record_upstream_call};
use crate::services::{parse_monument, ParseOutcome};
use crate::startup::AppState;
use axum::{extract::State, Extension, Json};
use bytes::Bytes;
use service_core::middleware::tracing::RequestId;

/// `POST /identify-monument` with `{"image": "<data URL or remote URL>"}`.
///
/// Always answers with JSON: the identified record (possibly the degraded
/// fallback shape) or `{"error": ...}`.
pub async fn identify_monument(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Result<Json<MonumentRecord>, RelayError> {
    let request_id = request_id
        .map(|Extension(id)| id.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());

    match identify(&state, &body, &request_id).await {
        Ok(outcome) => {
            record_identification(if outcome.is_fallback() {
                "fallback"
            } else {
                "parsed"
            });
            Ok(Json(outcome.into_record()))
        }
        Err(err) => {
            record_identification(err.kind());
            tracing::warn!(
                request_id = %request_id,
                kind = err.kind(),
                upstream_status = ?err.upstream_status(),
                "Monument identification failed: {}",
                err
            );
            Err(err)
        }
    }
}

async fn identify(
    state: &AppState,
    body: &[u8],
    request_id: &str,
) -> Result<ParseOutcome, RelayError> {
    let request: IdentifyRequest =
        serde_json::from_slice(body).map_err(|e| RelayError::internal(e.to_string()))?;

    let image = request.image().ok_or(RelayError::Input)?;

    let provider = state.provider.as_ref().ok_or_else(|| {
        tracing::error!(request_id = %request_id, "AI_GATEWAY_API_KEY not configured");
        RelayError::Config
    })?;

    tracing::info!(
        request_id = %request_id,
        provider = provider.name(),
        "Calling AI gateway for monument identification"
    );

    let response = match provider.identify(image, &state.generation_params()).await {
        Ok(response) => {
            record_upstream_call(200);
            response
        }
        Err(e) => {
            let err = RelayError::from(e);
            record_upstream_call(err.upstream_status().unwrap_or(0));
            return Err(err);
        }
    };

    tracing::info!(
        request_id = %request_id,
        model = ?response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = ?response.finish_reason,
        "AI response received"
    );

    let content = response
        .text
        .filter(|text| !text.is_empty())
        .ok_or(RelayError::UpstreamEmptyResponse)?;

    let outcome = parse_monument(&content);
    if outcome.is_fallback() {
        tracing::warn!(
            request_id = %request_id,
            content_len = content.len(),
            "Failed to parse AI response as JSON, returning raw content"
        );
    }

    Ok(outcome)
}
