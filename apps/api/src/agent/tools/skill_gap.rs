//! `skill_gap_analysis` — missing / matching / bonus skill breakdown.

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::tools::{job_text, resume_text, Tool, ToolArgs, ToolContext, ToolError};
use crate::analysis::fit_scorer;
use crate::analysis::skill_extractor::extract_skills;
use crate::models::reports::SkillGapReport;

pub struct SkillGapAnalysis {
    ctx: ToolContext,
}

impl SkillGapAnalysis {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SkillGapAnalysis {
    fn name(&self) -> &'static str {
        "skill_gap_analysis"
    }

    fn description(&self) -> &'static str {
        "Missing, matching, and bonus skills for one specific job"
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
        let (matching, missing, bonus) = fit_scorer::skill_gap(&resume_skills, &job_skills);

        let report = SkillGapReport {
            job_id: job_id.to_string(),
            missing_skills: missing,
            matching_skills: matching,
            bonus_skills: bonus,
        };
        serde_json::to_value(report).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
