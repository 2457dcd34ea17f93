//! Turning a user-chosen image into the reference the relay expects.

use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not an image file")]
    NotAnImage(PathBuf),

    #[error("Unsupported image reference: {0}")]
    UnsupportedReference(String),
}

/// A selected image, held as a data URL or remote URL, plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    reference: String,
    source: String,
}

impl ImageSelection {
    /// Read a local file and encode it as `data:<mime>;base64,...`.
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let mime = mime_for_path(path).ok_or_else(|| CaptureError::NotAnImage(path.to_path_buf()))?;
        let bytes = std::fs::read(path).map_err(|source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            reference: data_url(mime, &bytes),
            source: path.display().to_string(),
        })
    }

    /// Accept an existing `http(s)://` URL or `data:image/...` string as is.
    pub fn from_reference(reference: &str) -> Result<Self, CaptureError> {
        let lower = reference.to_ascii_lowercase();
        let accepted = lower.starts_with("https://")
            || lower.starts_with("http://")
            || lower.starts_with("data:image/");
        if !accepted {
            return Err(CaptureError::UnsupportedReference(reference.to_string()));
        }

        Ok(Self {
            reference: reference.to_string(),
            source: if lower.starts_with("data:") {
                "inline data".to_string()
            } else {
                reference.to_string()
            },
        })
    }

    /// Interpret a CLI argument: URLs and data URLs pass through, anything
    /// else is a file path.
    pub fn from_arg(arg: &str) -> Result<Self, CaptureError> {
        if arg.contains("://") || arg.starts_with("data:") {
            Self::from_reference(arg)
        } else {
            Self::from_path(Path::new(arg))
        }
    }

    /// The value sent as `image` in the relay request.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// MIME type for image file extensions; `None` for anything else.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}
