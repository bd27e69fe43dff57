//! `job_ranking_based_on_fit` — rank every uploaded job by fit score.
//!
//! Ranking order is decided entirely by the deterministic scorer. The LLM
//! contributes only the one-sentence recommendation at the end, and its
//! failure degrades to a canned summary rather than failing the ranking.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::agent::prompts::RANKING_SUMMARY_PROMPT;
use crate::agent::tools::{job_text, resume_text, Tool, ToolArgs, ToolContext, ToolError};
use crate::analysis::fit_scorer;
use crate::analysis::skill_extractor::extract_skills;
use crate::models::reports::{JobComparison, RankedJob};
use crate::vector_store::job_collection;

const SKILL_LIST_CAP: usize = 10;

pub struct JobRanking {
    ctx: ToolContext,
}

impl JobRanking {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for JobRanking {
    fn name(&self) -> &'static str {
        "job_ranking_based_on_fit"
    }

    fn description(&self) -> &'static str {
        "Rank ALL uploaded jobs by deterministic fit score, highest first"
    }

    async fn execute(&self, _args: &ToolArgs) -> Result<Value, ToolError> {
        let job_ids = self.ctx.store.list_job_ids().await?;
        if job_ids.is_empty() {
            return Err(ToolError::MissingDocument(
                "No job descriptions uploaded yet.".to_string(),
            ));
        }

        let resume = resume_text(&self.ctx.store).await?;
        let resume_skills = extract_skills(&resume);

        let mut ranked = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            let job = match job_text(&self.ctx.store, &job_id).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(%job_id, "Skipping job in ranking: {e}");
                    continue;
                }
            };
            let job_skills = extract_skills(&job);
            let mut result = fit_scorer::score(&resume_skills, &job_skills);
            result.matched.truncate(SKILL_LIST_CAP);
            result.missing.truncate(SKILL_LIST_CAP);

            let title = self
                .ctx
                .store
                .first_line(&job_collection(&job_id))
                .await
                .unwrap_or_default();
            ranked.push(RankedJob {
                job_id,
                title,
                fit_score: result.score,
                matched_skills: result.matched,
                missing_skills: result.missing,
            });
        }

        if ranked.is_empty() {
            return Err(ToolError::Execution(
                "no job could be scored".to_string(),
            ));
        }

        // Highest score first; ties broken by job id for a stable order.
        ranked.sort_by(|a, b| {
            b.fit_score
                .partial_cmp(&a.fit_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        let best_fit_job_id = ranked.first().map(|j| j.job_id.clone());
        info!(jobs = ranked.len(), best = ?best_fit_job_id, "Ranked jobs by fit");

        let ranking_lines: Vec<String> = ranked
            .iter()
            .map(|j| format!("{} ({}): {:.4}", j.job_id, j.title, j.fit_score))
            .collect();
        let prompt = RANKING_SUMMARY_PROMPT.replace("{ranking}", &ranking_lines.join("\n"));
        let summary = match self.ctx.llm.complete(&prompt, "").await {
            Ok(text) => text,
            Err(e) => {
                warn!("Ranking summary generation failed: {e}");
                match &best_fit_job_id {
                    Some(id) => format!("Job {id} has the highest fit score."),
                    None => String::new(),
                }
            }
        };

        let comparison = JobComparison {
            ranked_jobs: ranked,
            best_fit_job_id,
            summary,
        };
        serde_json::to_value(comparison).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
