use serde::Deserialize;
use serde_json::Value;

/// Body of an identification call: `{"image": "<data URL or remote URL>"}`.
#[derive(Debug, Default, Deserialize)]
pub struct IdentifyRequest {
    #[serde(default)]
    pub image: Option<Value>,
}

impl IdentifyRequest {
    /// The image reference. `null`, an empty string or any non-string value
    /// counts as missing.
    pub fn image(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(Value::as_str)
            .filter(|image| !image.is_empty())
    }
}
