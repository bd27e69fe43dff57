//! Intent classification — one constrained-JSON LLM call per request.
//!
//! The classifier's output is untrusted control flow: it is schema-validated
//! before any routing decision, unknown tool names are cleared, and every
//! failure mode (transport, malformed JSON, bad schema) collapses to the
//! conversational fallback so the system degrades to the full reasoning loop
//! instead of surfacing an error.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::prompts::CLASSIFICATION_PROMPT;
use crate::llm_client::{extract_json_object, strip_json_fences, LlmClient};

/// Classifier-assigned category determining the processing path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Metadata,
    Tool,
    Retrieval,
    Conversational,
}

/// Tools the classifier may suggest. Anything else is cleared, not rejected.
pub const VALID_TOOL_NAMES: [&str; 7] = [
    "fit_score",
    "skill_gap_analysis",
    "analyze_fit",
    "job_ranking_based_on_fit",
    "interview_preparation_strategy",
    "resume_summary",
    "list_jobs",
];

/// Structured output of the intent classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    pub requires_retrieval: bool,
    pub requires_metadata: bool,
    pub requires_tool: bool,
    #[serde(default)]
    pub tool_name: Option<String>,
}

/// Safe fallback: route through the full reasoning loop. Chosen whenever
/// classification confidence cannot be established — a deliberate
/// over-approximation toward the more expensive path.
pub fn fallback_classification() -> IntentClassification {
    IntentClassification {
        intent: Intent::Conversational,
        requires_retrieval: true,
        requires_metadata: false,
        requires_tool: false,
        tool_name: None,
    }
}

/// Classify the user query. Never fails: any error returns the fallback.
pub async fn classify_intent(query: &str, llm: &LlmClient) -> IntentClassification {
    let prompt = CLASSIFICATION_PROMPT.replace("{query}", &query.replace('"', "'"));

    let raw = match llm.complete_deterministic(&prompt, "").await {
        Ok(text) => text,
        Err(e) => {
            warn!("Intent classification call failed ({e}) - falling back to conversational");
            return fallback_classification();
        }
    };

    match parse_classification(&raw) {
        Some(classification) => {
            info!(
                intent = ?classification.intent,
                tool = classification.tool_name.as_deref(),
                requires_retrieval = classification.requires_retrieval,
                requires_metadata = classification.requires_metadata,
                "Intent classified"
            );
            classification
        }
        None => {
            let preview: String = raw.chars().take(200).collect();
            warn!("Intent classifier returned unusable output - falling back. Raw: {preview}");
            fallback_classification()
        }
    }
}

/// Parse and validate raw classifier output. Returns `None` when no valid
/// JSON object matching the schema is present.
pub fn parse_classification(raw: &str) -> Option<IntentClassification> {
    let json = extract_json_object(strip_json_fences(raw))?;
    let mut value: serde_json::Value = serde_json::from_str(json).ok()?;

    // Unknown tool names from the model are cleared rather than failing the
    // whole classification.
    if let Some(name) = value.get("tool_name").and_then(|v| v.as_str()) {
        if !VALID_TOOL_NAMES.contains(&name) {
            warn!("Unknown tool_name '{name}' from classifier - clearing it");
            value["tool_name"] = serde_json::Value::Null;
        }
    }

    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_classification() {
        let raw = r#"{"intent": "metadata", "requires_retrieval": false,
                      "requires_metadata": true, "requires_tool": false, "tool_name": null}"#;
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.intent, Intent::Metadata);
        assert!(c.requires_metadata);
        assert!(c.tool_name.is_none());
    }

    #[test]
    fn test_parse_with_markdown_fences_and_preamble() {
        let raw = "Here is the classification:\n```json\n{\"intent\": \"tool\", \
                   \"requires_retrieval\": false, \"requires_metadata\": false, \
                   \"requires_tool\": true, \"tool_name\": \"fit_score\"}\n```";
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.intent, Intent::Tool);
        assert_eq!(c.tool_name.as_deref(), Some("fit_score"));
    }

    #[test]
    fn test_unknown_tool_name_is_cleared() {
        let raw = r#"{"intent": "tool", "requires_retrieval": false,
                      "requires_metadata": false, "requires_tool": true,
                      "tool_name": "delete_everything"}"#;
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.intent, Intent::Tool);
        assert!(c.tool_name.is_none());
    }

    #[test]
    fn test_composite_intent_rejected() {
        let raw = r#"{"intent": "metadata|retrieval", "requires_retrieval": true,
                      "requires_metadata": true, "requires_tool": false, "tool_name": null}"#;
        assert!(parse_classification(raw).is_none());
    }

    #[test]
    fn test_no_json_yields_none() {
        assert!(parse_classification("I think this is a metadata query.").is_none());
        assert!(parse_classification("").is_none());
    }

    #[test]
    fn test_fallback_routes_to_full_reasoning() {
        let fb = fallback_classification();
        assert_eq!(fb.intent, Intent::Conversational);
        assert!(fb.requires_retrieval);
        assert!(!fb.requires_metadata);
        assert!(!fb.requires_tool);
    }

    #[test]
    fn test_intent_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Intent::Conversational).unwrap(),
            r#""conversational""#
        );
        let intent: Intent = serde_json::from_str(r#""retrieval""#).unwrap();
        assert_eq!(intent, Intent::Retrieval);
    }

    #[test]
    fn test_missing_tool_name_field_defaults_to_none() {
        let raw = r#"{"intent": "conversational", "requires_retrieval": true,
                      "requires_metadata": false, "requires_tool": false}"#;
        let c = parse_classification(raw).unwrap();
        assert!(c.tool_name.is_none());
    }
}
