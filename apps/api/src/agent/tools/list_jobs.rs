//! `list_jobs` — enumerate uploaded job descriptions with titles.

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::tools::{Tool, ToolArgs, ToolContext, ToolError};
use crate::models::reports::{JobList, JobListing};
use crate::vector_store::job_collection;

pub struct ListJobs {
    ctx: ToolContext,
}

impl ListJobs {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListJobs {
    fn name(&self) -> &'static str {
        "list_jobs"
    }

    fn description(&self) -> &'static str {
        "List and count all uploaded job descriptions with their titles"
    }

    async fn execute(&self, _args: &ToolArgs) -> Result<Value, ToolError> {
        let job_ids = self.ctx.store.list_job_ids().await?;

        if job_ids.is_empty() {
            let list = JobList {
                count: 0,
                jobs: Vec::new(),
                message: Some("No job descriptions uploaded yet.".to_string()),
            };
            return serde_json::to_value(list).map_err(|e| ToolError::Execution(e.to_string()));
        }

        let mut jobs = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            // A title lookup failure should not hide the job from the list.
            let title = self
                .ctx
                .store
                .first_line(&job_collection(&job_id))
                .await
                .unwrap_or_default();
            let title = if title.is_empty() {
                format!("Job {job_id}")
            } else {
                title
            };
            jobs.push(JobListing { job_id, title });
        }

        let list = JobList {
            count: jobs.len(),
            jobs,
            message: None,
        };
        serde_json::to_value(list).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
