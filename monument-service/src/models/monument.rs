//! The structured description of an identified monument.
//!
//! Model output is loosely typed, so deserialization coerces rather than
//! rejects: numbers become strings, a lone feature string becomes a list,
//! confidence is matched case-insensitively, and blank values are dropped.
//! Only a missing or blank `name` makes a record invalid.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name given to the record built from unparseable model output.
pub const FALLBACK_NAME: &str = "Analysis Complete";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object")]
    NotAnObject,
}

/// How sure the model is about the identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonumentRecord {
    #[serde(deserialize_with = "lenient::required_text")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub builder: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,

    #[serde(default, deserialize_with = "lenient::text_list", skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::confidence", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl MonumentRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            builder: None,
            year: None,
            style: None,
            significance: None,
            features: None,
            description: None,
            confidence: None,
        }
    }

    /// Degraded record carrying the raw model text.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            description: Some(raw_text.to_string()),
            confidence: Some(Confidence::Medium),
            ..Self::named(FALLBACK_NAME)
        }
    }

    /// Coerce an arbitrary JSON value. Arrays are refused even though serde
    /// would accept them positionally.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject);
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }
}

mod lenient {
    use super::*;
    use serde::de::Error as _;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == s.len() {
                    Some(s)
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        scalar_text(Value::deserialize(deserializer)?)
            .ok_or_else(|| D::Error::custom("name must be a non-empty string"))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar_text(Value::deserialize(deserializer)?))
    }

    pub fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = match Value::deserialize(deserializer)? {
            Value::Array(values) => values
                .into_iter()
                .filter(|v| v.is_string() || v.is_number())
                .filter_map(scalar_text)
                .collect(),
            single @ Value::String(_) => scalar_text(single).into_iter().collect(),
            _ => Vec::new(),
        };

        Ok(if items.is_empty() { None } else { Some(items) })
    }

    pub fn confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Confidence::parse(&s),
            _ => None,
        })
    }
}
