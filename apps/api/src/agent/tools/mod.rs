//! Agent tool capabilities.
//!
//! A closed set of structs behind one object-safe `Tool` trait, dispatched
//! by name lookup from the registry — no reflection. Every tool returns a
//! structured `serde_json::Value`, never free text, and every
//! scoring-bearing tool runs the skill extractor / fit scorer before any
//! LLM call.

pub mod analyze_fit;
pub mod fit_score;
pub mod interview_prep;
pub mod job_ranking;
pub mod list_jobs;
pub mod resume_summary;
pub mod skill_gap;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::embedding::{EmbeddingClient, EmbeddingError};
use crate::llm_client::{LlmClient, LlmError};
use crate::vector_store::{job_collection, VectorStore, VectorStoreError, RESUME_COLLECTION};

#[derive(Debug, Error)]
pub enum ToolError {
    /// A required document has not been ingested. Phrased for the user.
    #[error("{0}")]
    MissingDocument(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("tool execution failed: {0}")]
    Execution(String),
}

impl From<VectorStoreError> for ToolError {
    fn from(e: VectorStoreError) -> Self {
        ToolError::Execution(e.to_string())
    }
}

impl From<LlmError> for ToolError {
    fn from(e: LlmError) -> Self {
        ToolError::Execution(e.to_string())
    }
}

impl From<EmbeddingError> for ToolError {
    fn from(e: EmbeddingError) -> Self {
        ToolError::Execution(e.to_string())
    }
}

/// Arguments passed to a tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    pub job_id: Option<String>,
}

impl ToolArgs {
    pub fn with_job(job_id: Option<String>) -> Self {
        Self { job_id }
    }

    pub fn require_job_id(&self) -> Result<&str, ToolError> {
        self.job_id
            .as_deref()
            .ok_or(ToolError::MissingArgument("job_id"))
    }
}

/// One agent capability. `execute` must return a structured value so the
/// reasoning loop cannot silently lose the deterministic computation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, matched against classifier hints.
    fn name(&self) -> &'static str;

    /// Description shown to the LLM during tool selection.
    fn description(&self) -> &'static str;

    /// Whether the tool needs a `job_id` argument.
    fn needs_job_id(&self) -> bool {
        false
    }

    async fn execute(&self, args: &ToolArgs) -> Result<serde_json::Value, ToolError>;
}

/// Shared dependencies handed to every tool at construction.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<VectorStore>,
    pub embedder: Arc<EmbeddingClient>,
    pub llm: Arc<LlmClient>,
}

/// Name-keyed registry over the closed tool set.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build the full tool set. Deterministic tools come first so the
    /// reasoning loop's selection prompt lists them before heavier
    /// LLM-augmented tools.
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            tools: vec![
                Arc::new(list_jobs::ListJobs::new(ctx.clone())),
                Arc::new(fit_score::FitScore::new(ctx.clone())),
                Arc::new(skill_gap::SkillGapAnalysis::new(ctx.clone())),
                Arc::new(analyze_fit::AnalyzeFit::new(ctx.clone())),
                Arc::new(job_ranking::JobRanking::new(ctx.clone())),
                Arc::new(interview_prep::InterviewPrep::new(ctx.clone())),
                Arc::new(resume_summary::ResumeSummaryTool::new(ctx)),
            ],
        }
    }

    #[cfg(test)]
    pub(crate) fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Tool list rendered for the selection prompt.
    pub fn descriptions_block(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                let args = if t.needs_job_id() { "(job_id)" } else { "()" };
                format!("- {}{}: {}", t.name(), args, t.description())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load the full resume text, or a user-phrased missing-document error.
pub(crate) async fn resume_text(store: &VectorStore) -> Result<String, ToolError> {
    store
        .full_text(RESUME_COLLECTION)
        .await?
        .ok_or_else(|| ToolError::MissingDocument("Resume not uploaded yet.".to_string()))
}

/// Load the full text for one job, or a user-phrased missing-document error.
pub(crate) async fn job_text(store: &VectorStore, job_id: &str) -> Result<String, ToolError> {
    store
        .full_text(&job_collection(job_id))
        .await?
        .ok_or_else(|| {
            ToolError::MissingDocument(format!("Job {job_id} not found or not uploaded yet."))
        })
}

/// Retrieve the most relevant chunks from a collection for a question,
/// joined into a single context block.
pub(crate) async fn retrieve_context(
    ctx: &ToolContext,
    collection: &str,
    question: &str,
    k: usize,
) -> Result<String, ToolError> {
    let query_vector = ctx.embedder.embed(question).await?;
    let hits = ctx.store.search(collection, &query_vector, k).await?;
    if hits.is_empty() {
        return Err(ToolError::Execution(format!(
            "no chunks retrieved from {collection}"
        )));
    }
    Ok(hits
        .into_iter()
        .map(|h| h.text)
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Retrieval with a raw-text fallback: on any retrieval failure the first
/// `fallback_chars` of the raw document are used instead, with a warning.
pub(crate) async fn context_or_raw(
    ctx: &ToolContext,
    collection: &str,
    question: &str,
    k: usize,
    raw: &str,
    fallback_chars: usize,
) -> String {
    match retrieve_context(ctx, collection, question, k).await {
        Ok(context) => context,
        Err(e) => {
            warn!("Retrieval from {collection} failed: {e} - using raw text fallback");
            truncate_chars(raw, fallback_chars).to_string()
        }
    }
}

/// Char-boundary-safe prefix.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Comma-joined preview of a skill list, capped at `max` entries.
pub(crate) fn skills_preview(skills: &[String], max: usize) -> String {
    if skills.is_empty() {
        return "none detected".to_string();
    }
    skills
        .iter()
        .take(max)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_on_boundary() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        // Multi-byte chars must not panic
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_skills_preview_caps_and_joins() {
        let skills: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(skills_preview(&skills, 2), "a, b");
        assert_eq!(skills_preview(&[], 5), "none detected");
    }

    #[test]
    fn test_require_job_id() {
        let args = ToolArgs::with_job(Some("j1".into()));
        assert_eq!(args.require_job_id().unwrap(), "j1");
        assert!(ToolArgs::default().require_job_id().is_err());
    }

    mod registry {
        use super::*;
        use serde_json::json;

        struct EchoTool;

        #[async_trait]
        impl Tool for EchoTool {
            fn name(&self) -> &'static str {
                "echo"
            }
            fn description(&self) -> &'static str {
                "echoes its job id"
            }
            fn needs_job_id(&self) -> bool {
                true
            }
            async fn execute(&self, args: &ToolArgs) -> Result<serde_json::Value, ToolError> {
                Ok(json!({ "job_id": args.job_id }))
            }
        }

        fn registry_with_echo() -> ToolRegistry {
            ToolRegistry::with_tools(vec![Arc::new(EchoTool)])
        }

        #[test]
        fn test_lookup_by_name() {
            let registry = registry_with_echo();
            assert!(registry.get("echo").is_some());
            assert!(registry.get("missing").is_none());
        }

        #[tokio::test]
        async fn test_dispatch_returns_structured_result() {
            let registry = registry_with_echo();
            let tool = registry.get("echo").unwrap();
            let result = tool
                .execute(&ToolArgs::with_job(Some("j9".into())))
                .await
                .unwrap();
            assert_eq!(result["job_id"], "j9");
        }

        #[test]
        fn test_descriptions_block_shows_arity() {
            let registry = registry_with_echo();
            let block = registry.descriptions_block();
            assert!(block.contains("- echo(job_id): echoes its job id"));
        }
    }
}
