use crate::services::providers::gateway::{DEFAULT_GATEWAY_URL, DEFAULT_MODEL};
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default output length cap for the model.
const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone)]
pub struct MonumentConfig {
    pub common: core_config::Config,
    pub environment: String,
    pub gateway: GatewaySettings,
    pub observability: ObservabilitySettings,
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Bearer credential for the AI gateway. When absent the relay still
    /// starts but refuses every identification request.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ObservabilitySettings {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl MonumentConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `load` passes the process
    /// environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "dev".to_string());
        let is_prod = environment == "prod";

        let api_key = get("AI_GATEWAY_API_KEY").map(Secret::new);
        if api_key.is_none() && is_prod {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AI_GATEWAY_API_KEY is required in production but not set"
            )));
        }

        let max_tokens = match get("AI_MAX_TOKENS") {
            Some(raw) => parse_number::<u32>("AI_MAX_TOKENS", &raw)?,
            None => DEFAULT_MAX_TOKENS,
        };

        let timeout = get("AI_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_number::<u64>("AI_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(MonumentConfig {
            common,
            environment,
            gateway: GatewaySettings {
                api_key,
                base_url: get("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
                model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens,
                timeout,
            },
            observability: ObservabilitySettings {
                log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: get("OTLP_ENDPOINT"),
            },
        })
    }

    pub fn is_ai_configured(&self) -> bool {
        self.gateway.api_key.is_some()
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number, got '{}': {}", key, raw, e))
    })
}
