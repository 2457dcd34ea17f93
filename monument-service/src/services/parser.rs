//! Tolerant extraction of a [`MonumentRecord`] from free-form model output.
//!
//! Candidates, in order:
//! 1. the body of a ```` ```json ```` fenced block
//! 2. the span from the first `{` to the last `}`
//! 3. the whole text
//!
//! The first candidate that coerces into a record wins. When none does the
//! caller still gets [`MonumentRecord::fallback`] with the raw text.

use crate::models::MonumentRecord;

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(MonumentRecord),
    Fallback(MonumentRecord),
}

impl ParseOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback(_))
    }

    pub fn into_record(self) -> MonumentRecord {
        match self {
            ParseOutcome::Parsed(record) | ParseOutcome::Fallback(record) => record,
        }
    }
}

/// Candidate JSON strings in the order they should be tried.
pub fn extract_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(block) = fenced_json_block(text) {
        candidates.push(block);
    }
    if let Some(span) = brace_span(text) {
        candidates.push(span);
    }
    candidates.push(text);
    candidates
}

fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let len = text[start..].find(FENCE_CLOSE)?;
    Some(&text[start..start + len])
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_monument(text: &str) -> ParseOutcome {
    for (stage, candidate) in extract_candidates(text).into_iter().enumerate() {
        match MonumentRecord::from_json_str(candidate.trim()) {
            Ok(record) => return ParseOutcome::Parsed(record),
            Err(e) => tracing::debug!(stage, error = %e, "Rejected JSON candidate"),
        }
    }

    ParseOutcome::Fallback(MonumentRecord::fallback(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    #[test]
    fn fenced_block_is_parsed() {
        let outcome = parse_monument("```json\n{\"name\":\"Eiffel Tower\"}\n```");
        assert_eq!(
            outcome,
            ParseOutcome::Parsed(MonumentRecord::named("Eiffel Tower"))
        );
    }

    #[test]
    fn fenced_block_with_surrounding_prose() {
        let text = "Here is what I found:\n```json\n{\"name\": \"Big Ben\", \"confidence\": \"high\"}\n```\nLet me know if you need more.";
        let record = parse_monument(text).into_record();
        assert_eq!(record.name, "Big Ben");
        assert_eq!(record.confidence, Some(Confidence::High));
    }

    #[test]
    fn bare_object_inside_prose() {
        let text = "Sure! {\"name\": \"Colosseum\", \"location\": \"Rome, Italy\"} Hope this helps.";
        let record = parse_monument(text).into_record();
        assert_eq!(record.name, "Colosseum");
        assert_eq!(record.location.as_deref(), Some("Rome, Italy"));
    }

    #[test]
    fn whole_text_is_last_resort() {
        let text = "  {\"name\": \"Petra\"}  ";
        assert_eq!(
            parse_monument(text),
            ParseOutcome::Parsed(MonumentRecord::named("Petra"))
        );
    }

    #[test]
    fn broken_fence_falls_through_to_brace_span() {
        let text = "```json\n{\"name\": \"Angkor Wat\"}\n";
        assert_eq!(extract_candidates(text).len(), 2);
        assert_eq!(parse_monument(text).into_record().name, "Angkor Wat");
    }

    #[test]
    fn invalid_fence_contents_fall_through() {
        let text = "```json\nnot json\n```\n{\"name\": \"Alhambra\"}";
        assert_eq!(parse_monument(text).into_record().name, "Alhambra");
    }

    #[test]
    fn candidate_order() {
        let text = "```json\n{\"a\":1}\n``` trailing }";
        let candidates = extract_candidates(text);
        assert_eq!(candidates[0], "{\"a\":1}");
        assert_eq!(candidates[1], "{\"a\":1}\n``` trailing }");
        assert_eq!(candidates[2], text);
    }

    #[test]
    fn plain_prose_falls_back() {
        let prose = "This appears to be a Gothic cathedral, but I cannot be certain which one.";
        let outcome = parse_monument(prose);
        assert!(outcome.is_fallback());
        assert_eq!(
            serde_json::to_value(outcome.into_record()).unwrap(),
            serde_json::json!({
                "name": "Analysis Complete",
                "description": prose,
                "confidence": "medium"
            })
        );
    }

    #[test]
    fn object_without_name_falls_back() {
        let text = "{\"location\": \"Giza, Egypt\"}";
        assert!(parse_monument(text).is_fallback());
    }

    #[test]
    fn boolean_name_falls_back() {
        let text = "{\"name\": true}";
        let outcome = parse_monument(text);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_record().description.as_deref(), Some(text));
    }

    #[test]
    fn closing_brace_before_opening_is_not_a_span() {
        assert!(brace_span("} then {").is_none());
    }
}
