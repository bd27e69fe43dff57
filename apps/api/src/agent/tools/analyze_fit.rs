//! `analyze_fit` — deterministic score plus a retrieval-grounded narrative.
//!
//! The score and skill lists are computed exactly as `fit_score` computes
//! them; only the narrative paragraph comes from the LLM, and it is prompted
//! strictly from retrieved context and the precomputed numbers.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::agent::prompts::NARRATIVE_PROMPT;
use crate::agent::tools::{
    context_or_raw, job_text, resume_text, skills_preview, truncate_chars, Tool, ToolArgs,
    ToolContext, ToolError,
};
use crate::analysis::fit_scorer;
use crate::analysis::skill_extractor::extract_skills;
use crate::models::reports::FitAnalysis;
use crate::vector_store::{job_collection, RESUME_COLLECTION};

const CONTEXT_CHUNKS: usize = 4;
const CONTEXT_CAP_CHARS: usize = 1500;

pub struct AnalyzeFit {
    ctx: ToolContext,
}

impl AnalyzeFit {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for AnalyzeFit {
    fn name(&self) -> &'static str {
        "analyze_fit"
    }

    fn description(&self) -> &'static str {
        "Deep fit analysis for one job: deterministic score plus grounded narrative"
    }

    fn needs_job_id(&self) -> bool {
        true
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let job_id = args.require_job_id()?;

        let resume = resume_text(&self.ctx.store).await?;
        let job = job_text(&self.ctx.store, job_id).await?;

        let resume_skills = extract_skills(&resume);
        let job_skills = extract_skills(&job);
        let result = fit_scorer::score(&resume_skills, &job_skills);

        let resume_ctx = context_or_raw(
            &self.ctx,
            RESUME_COLLECTION,
            "key skills, experience, and accomplishments",
            CONTEXT_CHUNKS,
            &resume,
            CONTEXT_CAP_CHARS,
        )
        .await;
        let job_ctx = context_or_raw(
            &self.ctx,
            &job_collection(job_id),
            "required skills, qualifications, and responsibilities",
            CONTEXT_CHUNKS,
            &job,
            CONTEXT_CAP_CHARS,
        )
        .await;

        let prompt = NARRATIVE_PROMPT
            .replace("{resume_ctx}", truncate_chars(&resume_ctx, CONTEXT_CAP_CHARS))
            .replace("{job_ctx}", truncate_chars(&job_ctx, CONTEXT_CAP_CHARS))
            .replace("{matched}", &skills_preview(&result.matched, 15))
            .replace("{missing}", &skills_preview(&result.missing, 15))
            .replace("{score}", &format!("{:.4}", result.score));

        // Narrative is best-effort: the deterministic part of the analysis
        // stands on its own if the LLM is unavailable.
        let narrative = match self.ctx.llm.complete(&prompt, "").await {
            Ok(text) => text,
            Err(e) => {
                warn!(job_id, "Narrative generation failed: {e}");
                "Narrative unavailable; see the structured fields above.".to_string()
            }
        };

        let analysis = FitAnalysis {
            job_id: job_id.to_string(),
            fit_score: result.score,
            matched_skills: result.matched,
            missing_skills: result.missing,
            resume_highlights: truncate_chars(&resume_ctx, 400).to_string(),
            job_requirements_summary: truncate_chars(&job_ctx, 400).to_string(),
            narrative,
        };
        serde_json::to_value(analysis).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
