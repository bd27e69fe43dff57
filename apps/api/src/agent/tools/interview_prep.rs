//! `interview_preparation_strategy` — technical, behavioral, and
//! storytelling prep for one job.
//!
//! Focus areas come straight from the deterministic skill gap. The three
//! question lists are independent LLM calls; each parses leniently via
//! `parse_string_list` so a malformed list never sinks the whole plan.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::agent::prompts::{
    BEHAVIORAL_QUESTIONS_PROMPT, STORYTELLING_PROMPT, TECHNICAL_QUESTIONS_PROMPT,
};
use crate::agent::tools::{
    context_or_raw, job_text, resume_text, skills_preview, truncate_chars, Tool, ToolArgs,
    ToolContext, ToolError,
};
use crate::analysis::fit_scorer;
use crate::analysis::skill_extractor::extract_skills;
use crate::llm_client::parse_string_list;
use crate::models::reports::InterviewPlan;
use crate::vector_store::{job_collection, RESUME_COLLECTION};

const FOCUS_AREA_CAP: usize = 8;
const QUESTION_COUNT: usize = 5;
const STORY_COUNT: usize = 3;
const JOB_CTX_CAP: usize = 1200;
const RESUME_CTX_CAP: usize = 800;

const PREP_TIPS: &str = "Review the focus areas above first - they are the gaps most likely \
to be probed. Prepare one concrete example per storytelling suggestion, and rehearse the \
technical questions out loud.";

pub struct InterviewPrep {
    ctx: ToolContext,
}

impl InterviewPrep {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    async fn question_list(&self, prompt: &str, count: usize, label: &str) -> Vec<String> {
        match self.ctx.llm.complete(prompt, "").await {
            Ok(text) => parse_string_list(&text, count),
            Err(e) => {
                warn!("{label} generation failed: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Tool for InterviewPrep {
    fn name(&self) -> &'static str {
        "interview_preparation_strategy"
    }

    fn description(&self) -> &'static str {
        "Interview prep for one job: focus areas, technical and behavioral questions, storytelling"
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
        let (_, missing, _) = fit_scorer::skill_gap(&resume_skills, &job_skills);
        let focus_areas: Vec<String> = missing.into_iter().take(FOCUS_AREA_CAP).collect();

        let job_ctx = context_or_raw(
            &self.ctx,
            &job_collection(job_id),
            "technical requirements, responsibilities, and seniority expectations",
            4,
            &job,
            JOB_CTX_CAP,
        )
        .await;
        let resume_ctx = context_or_raw(
            &self.ctx,
            RESUME_COLLECTION,
            "notable projects, accomplishments, and leadership experience",
            3,
            &resume,
            RESUME_CTX_CAP,
        )
        .await;
        let job_ctx = truncate_chars(&job_ctx, JOB_CTX_CAP);
        let resume_ctx = truncate_chars(&resume_ctx, RESUME_CTX_CAP);

        let technical_prompt = TECHNICAL_QUESTIONS_PROMPT
            .replace("{job_ctx}", job_ctx)
            .replace("{gaps}", &skills_preview(&focus_areas, FOCUS_AREA_CAP));
        let behavioral_prompt = BEHAVIORAL_QUESTIONS_PROMPT.replace("{job_ctx}", job_ctx);
        let storytelling_prompt = STORYTELLING_PROMPT
            .replace("{resume_ctx}", resume_ctx)
            .replace("{job_ctx}", job_ctx);

        let (technical_questions, behavioral_questions, storytelling_suggestions) = tokio::join!(
            self.question_list(&technical_prompt, QUESTION_COUNT, "Technical questions"),
            self.question_list(&behavioral_prompt, QUESTION_COUNT, "Behavioral questions"),
            self.question_list(&storytelling_prompt, STORY_COUNT, "Storytelling suggestions"),
        );

        let plan = InterviewPlan {
            job_id: job_id.to_string(),
            focus_areas,
            technical_questions,
            behavioral_questions,
            storytelling_suggestions,
            prep_tips: PREP_TIPS.to_string(),
        };
        serde_json::to_value(plan).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
