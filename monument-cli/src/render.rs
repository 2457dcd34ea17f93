//! Plain-text result card. Only populated fields produce output.

use monument_service::models::{Confidence, MonumentRecord};
use std::fmt::Write;

const LABEL_WIDTH: usize = 14;

/// Display tier of a confidence badge.
pub fn confidence_badge(confidence: Confidence) -> String {
    let marker = match confidence {
        Confidence::High => "●●●",
        Confidence::Medium => "●●○",
        Confidence::Low => "●○○",
    };
    format!("[{} {} confidence]", marker, confidence.label())
}

pub fn render_card(record: &MonumentRecord) -> String {
    let mut out = String::new();

    match record.confidence {
        Some(confidence) => {
            let _ = writeln!(out, "{}  {}", record.name, confidence_badge(confidence));
        }
        None => {
            let _ = writeln!(out, "{}", record.name);
        }
    }

    let rows = [
        ("Location", &record.location),
        ("Builder", &record.builder),
        ("Year", &record.year),
        ("Style", &record.style),
        ("Significance", &record.significance),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<width$}{}", label, value, width = LABEL_WIDTH);
        }
    }

    if let Some(features) = record.features.as_ref().filter(|f| !f.is_empty()) {
        let _ = writeln!(out, "\nKey Features");
        for feature in features {
            let _ = writeln!(out, "  • {}", feature);
        }
    }

    if let Some(description) = &record.description {
        let _ = writeln!(out, "\nDescription");
        for line in description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    out
}
