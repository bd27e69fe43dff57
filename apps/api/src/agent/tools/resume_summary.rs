//! `resume_summary` — structured overview of the uploaded resume.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::agent::prompts::RESUME_SUMMARY_PROMPT;
use crate::agent::tools::{
    context_or_raw, resume_text, skills_preview, truncate_chars, Tool, ToolArgs, ToolContext,
    ToolError,
};
use crate::analysis::skill_extractor::extract_skills;
use crate::models::reports::ResumeSummary;
use crate::vector_store::RESUME_COLLECTION;

const CONTEXT_CAP_CHARS: usize = 2000;
const HIGHLIGHT_CAP: usize = 5;

/// Skills that count as technologies rather than practices. Kept coarse on
/// purpose: single-word vocabulary entries are overwhelmingly product or
/// language names.
fn is_technology(skill: &str) -> bool {
    !skill.contains(' ')
}

pub struct ResumeSummaryTool {
    ctx: ToolContext,
}

impl ResumeSummaryTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ResumeSummaryTool {
    fn name(&self) -> &'static str {
        "resume_summary"
    }

    fn description(&self) -> &'static str {
        "Structured overview of the uploaded resume: skills, highlights, narrative"
    }

    async fn execute(&self, _args: &ToolArgs) -> Result<Value, ToolError> {
        let resume = resume_text(&self.ctx.store).await?;
        let all_skills: Vec<String> = extract_skills(&resume).into_iter().collect();
        let (technologies, skills): (Vec<String>, Vec<String>) =
            all_skills.into_iter().partition(|s| is_technology(s));

        let experience_ctx = context_or_raw(
            &self.ctx,
            RESUME_COLLECTION,
            "work experience, projects, and accomplishments",
            HIGHLIGHT_CAP,
            &resume,
            CONTEXT_CAP_CHARS,
        )
        .await;
        let experience_highlights: Vec<String> = experience_ctx
            .split("\n\n")
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .take(HIGHLIGHT_CAP)
            .map(|s| truncate_chars(&s, 300).to_string())
            .collect();

        let education_ctx = context_or_raw(
            &self.ctx,
            RESUME_COLLECTION,
            "education, degrees, and certifications",
            2,
            &resume,
            600,
        )
        .await;
        let education: Vec<String> = education_ctx
            .split("\n\n")
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .take(2)
            .map(|s| truncate_chars(&s, 300).to_string())
            .collect();

        let prompt = RESUME_SUMMARY_PROMPT
            .replace(
                "{resume_ctx}",
                truncate_chars(&experience_ctx, CONTEXT_CAP_CHARS),
            )
            .replace("{skills}", &skills_preview(&technologies, 20));
        let narrative = match self.ctx.llm.complete(&prompt, "").await {
            Ok(text) => text,
            Err(e) => {
                warn!("Resume narrative generation failed: {e}");
                "Narrative unavailable; see the structured fields above.".to_string()
            }
        };

        let summary = ResumeSummary {
            skills,
            technologies,
            experience_highlights,
            education,
            narrative,
        };
        serde_json::to_value(summary).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
