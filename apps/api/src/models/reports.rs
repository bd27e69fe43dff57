//! Structured tool outputs.
//!
//! Every tool returns one of these serialized as JSON, never free text, so
//! the reasoning loop cannot silently lose the deterministic computation.

use serde::{Deserialize, Serialize};

/// Deterministic skill-coverage score for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitScoreReport {
    pub job_id: String,
    /// Fraction of job skills covered by the resume, in `[0, 1]`.
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub total_job_skills: usize,
    pub matched_count: usize,
}

/// Missing / matching / bonus skill breakdown for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub job_id: String,
    pub missing_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub bonus_skills: Vec<String>,
}

/// Deep fit analysis: deterministic score plus grounded narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitAnalysis {
    pub job_id: String,
    pub fit_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub resume_highlights: String,
    pub job_requirements_summary: String,
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    pub job_id: String,
    pub title: String,
    pub fit_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// All jobs ranked by fit score, highest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobComparison {
    pub ranked_jobs: Vec<RankedJob>,
    pub best_fit_job_id: Option<String>,
    pub summary: String,
}

/// Interview preparation plan for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPlan {
    pub job_id: String,
    /// Skill gaps to concentrate on — deterministic.
    pub focus_areas: Vec<String>,
    pub technical_questions: Vec<String>,
    pub behavioral_questions: Vec<String>,
    pub storytelling_suggestions: Vec<String>,
    pub prep_tips: String,
}

/// Structured overview of the uploaded resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub skills: Vec<String>,
    pub technologies: Vec<String>,
    pub experience_highlights: Vec<String>,
    pub education: Vec<String>,
    pub narrative: String,
}

/// A single listed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    pub job_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    pub count: usize,
    pub jobs: Vec<JobListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_score_report_serializes() {
        let report = FitScoreReport {
            job_id: "j1".into(),
            score: 0.6667,
            matched_skills: vec!["python".into(), "sql".into()],
            total_job_skills: 3,
            matched_count: 2,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["score"], 0.6667);
        assert_eq!(value["matched_count"], 2);
    }

    #[test]
    fn test_job_list_omits_message_when_none() {
        let list = JobList {
            count: 1,
            jobs: vec![JobListing {
                job_id: "a".into(),
                title: "Engineer".into(),
            }],
            message: None,
        };
        let json = serde_json::to_string(&list).unwrap();
        assert!(!json.contains("message"));
    }
}
