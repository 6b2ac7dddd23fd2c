use serde::{Deserialize, Serialize};

use crate::data_models::IndexedDocument;

const SNIPPET_CHARS: usize = 200;

/// Body of `POST /results` and `POST /documents`. Missing fields read as empty strings
/// so validation can answer with a proper error message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn from_document(document: &IndexedDocument) -> Self {
        Self {
            url: format!("/documents/{}", document.id.to_hex()),
            title: document.filename.clone(),
            snippet: snippet(&document.text),
        }
    }
}

/// Response envelope. The server sets either `results` or `error_message`, never both;
/// readers must still cope with any combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SearchResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            total_results: Some(results.len()),
            results: Some(results),
            ..Default::default()
        }
    }
}

/// Full document returned by `GET /documents/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub filename: String,
    pub language: String,
    pub text: String,
}

impl From<IndexedDocument> for DocumentView {
    fn from(document: IndexedDocument) -> Self {
        Self {
            id: document.id.to_hex(),
            filename: document.filename,
            language: document.language.to_string(),
            text: document.text,
        }
    }
}

/// First `SNIPPET_CHARS` characters of `text`, with `...` appended when cut.
pub fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_short_text_untouched() {
        assert_eq!(snippet("short"), "short");
        assert_eq!(snippet(""), "");
    }

    #[test]
    fn test_snippet_cuts_on_char_boundary() {
        let text = "ب".repeat(250);
        let out = snippet(&text);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn test_snippet_exactly_at_limit() {
        let text = "a".repeat(200);
        assert_eq!(snippet(&text), text);
    }

    #[test]
    fn test_error_envelope_omits_results() {
        let json = serde_json::to_value(SearchResponse::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "error_message": "boom" }));
    }

    #[test]
    fn test_envelope_tolerates_both_fields() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"results": [], "error_message": "x", "unknown": 1}"#,
        )
        .unwrap();
        assert_eq!(parsed.results, Some(vec![]));
        assert_eq!(parsed.error_message.as_deref(), Some("x"));
    }
}
