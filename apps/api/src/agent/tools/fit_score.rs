//! `fit_score` — deterministic skill-coverage score for one job.
//!
//! No LLM involvement at any point: extraction and scoring are pure
//! functions over the stored documents, so the same documents always yield
//! the same score.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::agent::tools::{job_text, resume_text, Tool, ToolArgs, ToolContext, ToolError};
use crate::analysis::fit_scorer;
use crate::analysis::skill_extractor::extract_skills;
use crate::models::reports::FitScoreReport;

pub struct FitScore {
    ctx: ToolContext,
}

impl FitScore {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for FitScore {
    fn name(&self) -> &'static str {
        "fit_score"
    }

    fn description(&self) -> &'static str {
        "Deterministic skill-coverage score (0.0-1.0) for one specific job"
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

        info!(job_id, score = result.score, "Computed fit score");

        let report = FitScoreReport {
            job_id: job_id.to_string(),
            score: result.score,
            matched_count: result.matched.len(),
            total_job_skills: job_skills.len(),
            matched_skills: result.matched,
        };
        serde_json::to_value(report).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
