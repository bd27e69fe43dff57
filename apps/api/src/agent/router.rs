//! Request dispatch: classify, try the fastpaths, fall through to the
//! reasoning loop.
//!
//! Both fastpaths degrade to the agent path on failure, so a broken
//! shortcut can slow a request down but never drop it.

use tracing::{info, warn};

use crate::agent::intent::{classify_intent, Intent, IntentClassification};
use crate::agent::prompts::SYSTEM_PROMPT;
use crate::agent::reasoning::ReasoningLoop;
use crate::errors::AppError;
use crate::models::reports::JobListing;
use crate::models::{ChatResponse, RoutedVia};
use crate::state::AppState;
use crate::vector_store::{job_collection, RESUME_COLLECTION};

/// Processing path selected for a classified query.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Route {
    Metadata,
    DirectLlm,
    Agent,
}

/// Map a classification to a processing path.
///
/// A conversational intent that needs retrieval cannot be answered by a
/// bare completion, so it goes to the reasoning loop. The classifier-failure
/// fallback sets `requires_retrieval` for exactly this reason: an
/// unclassifiable query must land on the expensive grounded path, never on
/// a fastpath.
fn choose_route(classification: &IntentClassification) -> Route {
    if classification.requires_metadata {
        return Route::Metadata;
    }
    if classification.intent == Intent::Conversational
        && !classification.requires_tool
        && !classification.requires_retrieval
    {
        return Route::DirectLlm;
    }
    Route::Agent
}

/// Handle one chat turn end to end.
pub async fn dispatch(
    state: &AppState,
    query: &str,
    session_id: &str,
    job_id: Option<&str>,
) -> Result<ChatResponse, AppError> {
    let classification = classify_intent(query, &state.llm).await;
    let intent = classification.intent;
    let route = choose_route(&classification);

    // Metadata fastpath: answered from collection listings, no LLM.
    if route == Route::Metadata {
        match metadata_answer(state, query).await {
            Ok(answer) => {
                let session = state.sessions.get_or_create(session_id).await;
                let mut guard = session.lock().await;
                guard.push_user(query);
                guard.push_assistant(&answer);
                return Ok(ChatResponse {
                    answer,
                    session_id: session_id.to_string(),
                    intent,
                    routed_via: RoutedVia::Metadata,
                });
            }
            Err(e) => {
                warn!("Metadata fastpath failed ({e}) - falling through to agent");
            }
        }
    }

    // Conversational fastpath: single LLM call with history, no tools.
    if route == Route::DirectLlm {
        let session = state.sessions.get_or_create(session_id).await;
        let mut guard = session.lock().await;
        let prompt = format!(
            "Conversation so far:\n{}\n\nUser: {}\n\nRespond naturally:",
            guard.history_block(),
            query
        );
        match state.llm.complete(&prompt, SYSTEM_PROMPT).await {
            Ok(answer) => {
                guard.push_user(query);
                guard.push_assistant(&answer);
                return Ok(ChatResponse {
                    answer,
                    session_id: session_id.to_string(),
                    intent,
                    routed_via: RoutedVia::DirectLlm,
                });
            }
            Err(e) => {
                warn!("Conversational fastpath failed ({e}) - falling through to agent");
            }
        }
    }

    // Agent path. Hints from the classifier are prepended so the loop can
    // skip its first selection round.
    let effective_query = build_effective_query(
        query,
        classification.tool_name.as_deref(),
        job_id,
    );
    info!(session_id, ?intent, "Dispatching to reasoning loop");

    let session = state.sessions.get_or_create(session_id).await;
    let mut guard = session.lock().await;
    let history = guard.history_block();
    let reasoner: ReasoningLoop = guard
        .reasoner(|| {
            ReasoningLoop::new(
                state.llm.clone(),
                state.tools.clone(),
                state.config.max_iterations,
            )
        })
        .clone();
    let answer = reasoner.run(&history, &effective_query).await?;
    guard.push_user(query);
    guard.push_assistant(&answer);

    Ok(ChatResponse {
        answer,
        session_id: session_id.to_string(),
        intent,
        routed_via: RoutedVia::Agent,
    })
}

/// Prepend tool and job hints to the raw query.
fn build_effective_query(query: &str, tool: Option<&str>, job_id: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(tool) = tool {
        parts.push(format!("[USE_TOOL: {tool}]"));
    }
    if let Some(job_id) = job_id {
        parts.push(format!("[Selected job_id: {job_id}]"));
    }
    parts.push(query.to_string());
    parts.join(" ")
}

/// Answer a metadata query from collection listings alone.
async fn metadata_answer(state: &AppState, query: &str) -> Result<String, AppError> {
    let job_ids = state
        .store
        .list_job_ids()
        .await
        .map_err(|e| AppError::VectorStore(e.to_string()))?;

    let mut jobs = Vec::with_capacity(job_ids.len());
    for job_id in job_ids {
        let title = state
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

    let resume_exists = state
        .store
        .collection_exists(RESUME_COLLECTION)
        .await
        .map_err(|e| AppError::VectorStore(e.to_string()))?;

    Ok(format_metadata_answer(query, &jobs, resume_exists))
}

/// Render the metadata answer. Pure so the branch logic is testable without
/// a vector store.
fn format_metadata_answer(query: &str, jobs: &[JobListing], resume_exists: bool) -> String {
    let lower = query.to_lowercase();
    let asks_resume = lower.contains("resume") || lower.contains("cv");
    let asks_jobs = lower.contains("job");

    if asks_resume && !asks_jobs {
        return if resume_exists {
            "Yes, your resume is uploaded and indexed.".to_string()
        } else {
            "No resume has been uploaded yet.".to_string()
        };
    }

    if jobs.is_empty() {
        let mut answer = "No job descriptions have been uploaded yet.".to_string();
        if resume_exists {
            answer.push_str(" Your resume is uploaded.");
        }
        return answer;
    }

    let mut lines = vec![format!(
        "You have {} job description{} uploaded:",
        jobs.len(),
        if jobs.len() == 1 { "" } else { "s" }
    )];
    for job in jobs {
        lines.push(format!("- **{}**: {}", job.job_id, job.title));
    }
    if !asks_jobs {
        lines.push(if resume_exists {
            "Your resume is also uploaded.".to_string()
        } else {
            "No resume has been uploaded yet.".to_string()
        });
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::intent::fallback_classification;

    fn classification(
        intent: Intent,
        requires_retrieval: bool,
        requires_metadata: bool,
        requires_tool: bool,
    ) -> IntentClassification {
        IntentClassification {
            intent,
            requires_retrieval,
            requires_metadata,
            requires_tool,
            tool_name: None,
        }
    }

    #[test]
    fn test_classifier_fallback_routes_to_agent() {
        // Unparsable classifier output must land on the reasoning loop,
        // never on the ungrounded direct-LLM shortcut.
        assert_eq!(choose_route(&fallback_classification()), Route::Agent);
    }

    #[test]
    fn test_greeting_takes_direct_path() {
        let c = classification(Intent::Conversational, false, false, false);
        assert_eq!(choose_route(&c), Route::DirectLlm);
    }

    #[test]
    fn test_conversational_needing_retrieval_routes_to_agent() {
        let c = classification(Intent::Conversational, true, false, false);
        assert_eq!(choose_route(&c), Route::Agent);
    }

    #[test]
    fn test_metadata_flag_wins() {
        let c = classification(Intent::Metadata, false, true, false);
        assert_eq!(choose_route(&c), Route::Metadata);
    }

    #[test]
    fn test_tool_and_retrieval_intents_route_to_agent() {
        for intent in [Intent::Tool, Intent::Retrieval] {
            let c = classification(intent, true, false, intent == Intent::Tool);
            assert_eq!(choose_route(&c), Route::Agent);
        }
    }

    fn jobs(pairs: &[(&str, &str)]) -> Vec<JobListing> {
        pairs
            .iter()
            .map(|(id, title)| JobListing {
                job_id: id.to_string(),
                title: title.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_effective_query_with_both_hints() {
        let q = build_effective_query("my score?", Some("fit_score"), Some("j1"));
        assert_eq!(q, "[USE_TOOL: fit_score] [Selected job_id: j1] my score?");
    }

    #[test]
    fn test_effective_query_plain() {
        assert_eq!(build_effective_query("hello", None, None), "hello");
    }

    #[test]
    fn test_metadata_resume_status_only() {
        let answer = format_metadata_answer("is my resume uploaded?", &jobs(&[]), true);
        assert!(answer.contains("Yes"));
        let answer = format_metadata_answer("is my cv there?", &jobs(&[]), false);
        assert!(answer.contains("No resume"));
    }

    #[test]
    fn test_metadata_lists_jobs_with_titles() {
        let listing = jobs(&[("a1", "ML Engineer"), ("b2", "Data Scientist")]);
        let answer = format_metadata_answer("list my jobs", &listing, true);
        assert!(answer.contains("2 job descriptions"));
        assert!(answer.contains("**a1**: ML Engineer"));
        assert!(answer.contains("**b2**: Data Scientist"));
    }

    #[test]
    fn test_metadata_no_jobs() {
        let answer = format_metadata_answer("how many jobs?", &jobs(&[]), false);
        assert!(answer.contains("No job descriptions"));
    }

    #[test]
    fn test_metadata_generic_includes_resume_status() {
        let listing = jobs(&[("a1", "Engineer")]);
        let answer = format_metadata_answer("what is uploaded?", &listing, false);
        assert!(answer.contains("1 job description"));
        assert!(answer.contains("No resume"));
    }
}
