//! Deterministic fit scorer — pure set arithmetic over skill sets.
//!
//! `score = |resume ∩ job| / |job|`, defined as 0.0 for an empty job set.
//! Results are recomputed on every call; callers must not assume
//! memoization because source documents can change between requests.

use serde::Serialize;

use crate::analysis::skill_extractor::SkillSet;

/// Breakdown of resume-vs-job skill coverage. Lists are sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    /// Fraction of job skills covered by the resume, in `[0, 1]`.
    pub score: f64,
    /// `resume ∩ job`
    pub matched: Vec<String>,
    /// `job − resume`
    pub missing: Vec<String>,
    /// `resume − job`
    pub bonus: Vec<String>,
}

/// Return `|resume ∩ job| / |job|`, rounded to 4 decimals.
///
/// 1.0 means the resume covers every skill the job asks for. Returns 0.0
/// when `job` is empty.
pub fn coverage_score(resume: &SkillSet, job: &SkillSet) -> f64 {
    if job.is_empty() {
        return 0.0;
    }
    let matched = resume.intersection(job).count();
    round4(matched as f64 / job.len() as f64)
}

/// Return `(matched, missing, bonus)` sorted skill lists.
pub fn skill_gap(resume: &SkillSet, job: &SkillSet) -> (Vec<String>, Vec<String>, Vec<String>) {
    let matched = resume.intersection(job).cloned().collect();
    let missing = job.difference(resume).cloned().collect();
    let bonus = resume.difference(job).cloned().collect();
    (matched, missing, bonus)
}

/// Compute the full fit breakdown in one pass.
pub fn score(resume: &SkillSet, job: &SkillSet) -> FitResult {
    let (matched, missing, bonus) = skill_gap(resume, job);
    FitResult {
        score: coverage_score(resume, job),
        matched,
        missing,
        bonus,
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SkillSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_spec_scenario_two_thirds() {
        let resume = set(&["python", "sql", "docker"]);
        let job = set(&["python", "kubernetes", "sql"]);
        let result = score(&resume, &job);
        assert!((result.score - 0.6667).abs() < 1e-9);
        assert_eq!(result.matched, vec!["python", "sql"]);
        assert_eq!(result.missing, vec!["kubernetes"]);
        assert_eq!(result.bonus, vec!["docker"]);
    }

    #[test]
    fn test_empty_job_set_scores_zero() {
        let resume = set(&["python"]);
        let result = score(&resume, &SkillSet::new());
        assert_eq!(result.score, 0.0);
        assert!(result.matched.is_empty());
        assert!(result.missing.is_empty());
        assert_eq!(result.bonus, vec!["python"]);
    }

    #[test]
    fn test_empty_resume_scores_zero_with_all_missing() {
        let job = set(&["rust", "kafka"]);
        let result = score(&SkillSet::new(), &job);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.missing, vec!["kafka", "rust"]);
        assert!(result.bonus.is_empty());
    }

    #[test]
    fn test_perfect_coverage_scores_one() {
        let skills = set(&["python", "docker", "aws"]);
        assert_eq!(coverage_score(&skills, &skills), 1.0);
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        let resume = set(&["a", "b", "c", "d", "e", "f"]);
        let job = set(&["a", "b"]);
        // Resume larger than job cannot push the ratio above 1
        let s = coverage_score(&resume, &job);
        assert!((0.0..=1.0).contains(&s));
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_matched_and_missing_partition_job() {
        let resume = set(&["python", "go", "helm"]);
        let job = set(&["python", "rust", "helm", "kafka"]);
        let result = score(&resume, &job);

        let mut union: Vec<String> = result
            .matched
            .iter()
            .chain(result.missing.iter())
            .cloned()
            .collect();
        union.sort();
        let job_sorted: Vec<String> = job.iter().cloned().collect();
        assert_eq!(union, job_sorted);

        for skill in &result.matched {
            assert!(!result.missing.contains(skill));
        }
    }

    #[test]
    fn test_bonus_disjoint_from_job() {
        let resume = set(&["python", "docker", "mlflow"]);
        let job = set(&["python"]);
        let result = score(&resume, &job);
        for skill in &result.bonus {
            assert!(!job.contains(skill));
        }
        assert_eq!(result.bonus, vec!["docker", "mlflow"]);
    }

    #[test]
    fn test_rounding_to_four_decimals() {
        let resume = set(&["a"]);
        let job = set(&["a", "b", "c"]);
        assert_eq!(coverage_score(&resume, &job), 0.3333);
    }
}
