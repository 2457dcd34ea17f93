//! Orchestration of one identification session.
//!
//! ```text
//! Idle ──select──▶ Ready ──analyze──▶ Analyzing ──ok──▶ Done
//!                    ▲                    │               │
//!                    └──────error─────────┘               │
//!                    ▲                                    │
//!                    └──────────────select────────────────┘
//! reset: any state ──▶ Idle
//! ```

use crate::capture::ImageSelection;
use crate::client::FunctionsClient;
use monument_service::models::MonumentRecord;
use serde_json::json;

pub const IDENTIFY_FUNCTION: &str = "identify-monument";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Idle,
    Ready {
        image: ImageSelection,
    },
    Analyzing {
        image: ImageSelection,
    },
    Done {
        image: ImageSelection,
        record: MonumentRecord,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// User-facing notification produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn warning(title: &str, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, description)
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

impl Session {
    pub fn state_name(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::Ready { .. } => "ready",
            Session::Analyzing { .. } => "analyzing",
            Session::Done { .. } => "done",
        }
    }

    pub fn image(&self) -> Option<&ImageSelection> {
        match self {
            Session::Idle => None,
            Session::Ready { image } | Session::Analyzing { image } | Session::Done { image, .. } => {
                Some(image)
            }
        }
    }

    pub fn record(&self) -> Option<&MonumentRecord> {
        match self {
            Session::Done { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Choose a new image, discarding any previous result. Ignored while a
    /// request is in flight; returns whether the selection was taken.
    pub fn select_image(&mut self, image: ImageSelection) -> bool {
        if matches!(self, Session::Analyzing { .. }) {
            return false;
        }
        *self = Session::Ready { image };
        true
    }

    /// `Ready → Analyzing`, handing back the image reference to send.
    pub fn begin_analysis(&mut self) -> Result<String, Notice> {
        match std::mem::take(self) {
            Session::Ready { image } => {
                let reference = image.reference().to_string();
                *self = Session::Analyzing { image };
                Ok(reference)
            }
            Session::Idle => Err(Notice::warning(
                "No image selected",
                "Please select an image first",
            )),
            other @ Session::Analyzing { .. } => {
                *self = other;
                Err(Notice::warning(
                    "Analysis in progress",
                    "Please wait for the current analysis to finish",
                ))
            }
            other @ Session::Done { .. } => {
                *self = other;
                Err(Notice::warning(
                    "Already identified",
                    "Select a new image or reset to analyze another monument",
                ))
            }
        }
    }

    /// Finish an in-flight analysis. Success lands in `Done`, failure goes
    /// back to `Ready` so the user can retry.
    pub fn complete(&mut self, result: Result<MonumentRecord, String>) -> Notice {
        let image = match std::mem::take(self) {
            Session::Analyzing { image } => image,
            other => {
                *self = other;
                return Notice::warning("No analysis in progress", "Nothing to complete");
            }
        };

        match result {
            Ok(record) => {
                *self = Session::Done { image, record };
                Notice::success(
                    "Monument Identified!",
                    "Historical information has been retrieved successfully.",
                )
            }
            Err(message) => {
                *self = Session::Ready { image };
                let description = if message.trim().is_empty() {
                    "Failed to identify the monument. Please try again.".to_string()
                } else {
                    message
                };
                Notice::error("Identification Failed", description)
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Session::Idle;
    }

    /// Run one analysis through `client`. No retries.
    pub async fn analyze<C>(&mut self, client: &C, function: &str) -> Notice
    where
        C: FunctionsClient + ?Sized,
    {
        let reference = match self.begin_analysis() {
            Ok(reference) => reference,
            Err(notice) => return notice,
        };

        let response = client.invoke(function, &json!({ "image": reference })).await;

        let result = match (response.data, response.error) {
            (_, Some(error)) => Err(error.message),
            (Some(data), None) => MonumentRecord::from_value(data)
                .map_err(|e| format!("Unexpected response from relay: {}", e)),
            (None, None) => Err(String::new()),
        };

        if let Err(message) = &result {
            tracing::warn!(error = %message, "Monument identification failed");
        }

        self.complete(result)
    }
}
