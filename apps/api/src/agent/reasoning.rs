//! Bounded tool-selection loop.
//!
//! Each iteration the LLM picks one tool or declares the answer final.
//! Observations are the structured JSON results of executed tools; the
//! final synthesis may only restate them, never recompute. The iteration
//! cap guarantees termination, and a classifier tool hint short-circuits
//! the first selection entirely.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agent::prompts::{ACTION_PROMPT, SYNTHESIS_PROMPT};
use crate::agent::tools::{ToolArgs, ToolError, ToolRegistry};
use crate::errors::AppError;
use crate::llm_client::{extract_json_object, strip_json_fences, LlmClient};

/// Default iteration cap. One hinted tool call plus synthesis uses two.
pub const AGENT_MAX_ITERATIONS: usize = 10;

/// Routing hints embedded in the effective query by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    pub tool: Option<String>,
    pub job_id: Option<String>,
    pub query: String,
}

/// Strip `[USE_TOOL: x]` and `[Selected job_id: y]` prefixes from an
/// effective query, in either order.
pub fn parse_hints(effective_query: &str) -> Hints {
    let mut rest = effective_query.trim();
    let mut hints = Hints::default();

    loop {
        if let Some(tail) = rest.strip_prefix("[USE_TOOL:") {
            if let Some(end) = tail.find(']') {
                hints.tool = Some(tail[..end].trim().to_string());
                rest = tail[end + 1..].trim_start();
                continue;
            }
        }
        if let Some(tail) = rest.strip_prefix("[Selected job_id:") {
            if let Some(end) = tail.find(']') {
                hints.job_id = Some(tail[..end].trim().to_string());
                rest = tail[end + 1..].trim_start();
                continue;
            }
        }
        break;
    }

    hints.query = rest.to_string();
    hints
}

/// One decision from the action prompt.
#[derive(Debug, Deserialize)]
struct Action {
    action: String,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

fn parse_action(raw: &str) -> Option<Action> {
    let json = extract_json_object(strip_json_fences(raw))?;
    serde_json::from_str(json).ok()
}

/// Observation log for one turn: tool name plus structured result or error.
struct Observation {
    tool: String,
    outcome: Result<Value, String>,
}

impl Observation {
    fn render(&self) -> String {
        match &self.outcome {
            Ok(value) => format!(
                "[{}] {}",
                self.tool,
                serde_json::to_string(value).unwrap_or_default()
            ),
            Err(e) => format!("[{}] FAILED: {}", self.tool, e),
        }
    }
}

fn render_observations(observations: &[Observation]) -> String {
    if observations.is_empty() {
        return "(none)".to_string();
    }
    observations
        .iter()
        .map(Observation::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The per-session reasoning loop. Cheap to clone; all fields are shared
/// handles.
#[derive(Clone)]
pub struct ReasoningLoop {
    llm: Arc<LlmClient>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl ReasoningLoop {
    pub fn new(llm: Arc<LlmClient>, tools: Arc<ToolRegistry>, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    /// Run the loop for one turn. `history` is the rendered conversation so
    /// far, `effective_query` may carry routing hint prefixes.
    pub async fn run(&self, history: &str, effective_query: &str) -> Result<String, AppError> {
        let hints = parse_hints(effective_query);
        let mut observations: Vec<Observation> = Vec::new();

        // A classifier hint skips the first selection round: run the hinted
        // tool, then go straight to synthesis.
        if let Some(tool_name) = &hints.tool {
            if self.tools.get(tool_name).is_some() {
                info!(tool = tool_name.as_str(), "Executing hinted tool");
                if let Some(answer) = self
                    .execute_tool(tool_name, hints.job_id.clone(), &mut observations)
                    .await
                {
                    return Ok(answer);
                }
                return self.synthesize(history, &hints.query, &observations).await;
            }
            warn!(tool = tool_name.as_str(), "Hinted tool not in registry - ignoring hint");
        }

        for iteration in 0..self.max_iterations {
            let prompt = ACTION_PROMPT
                .replace("{tools}", &self.tools.descriptions_block())
                .replace("{history}", history)
                .replace("{observations}", &render_observations(&observations))
                .replace("{query}", &hints.query);

            let raw = self
                .llm
                .complete_deterministic(&prompt, "")
                .await
                .map_err(|e| AppError::Llm(e.to_string()))?;

            let Some(action) = parse_action(&raw) else {
                debug!(iteration, "Unparsable action output - recording and retrying");
                observations.push(Observation {
                    tool: "action_selection".to_string(),
                    outcome: Err("previous action output was not valid JSON".to_string()),
                });
                continue;
            };

            match action.action.as_str() {
                "final" => {
                    if observations.iter().any(|o| o.outcome.is_ok()) {
                        return self.synthesize(history, &hints.query, &observations).await;
                    }
                    if let Some(answer) = action.answer {
                        return Ok(answer);
                    }
                    return self.synthesize(history, &hints.query, &observations).await;
                }
                "tool" => {
                    let Some(tool_name) = action.tool else {
                        observations.push(Observation {
                            tool: "action_selection".to_string(),
                            outcome: Err("action was 'tool' but no tool named".to_string()),
                        });
                        continue;
                    };
                    let job_id = action.job_id.or_else(|| hints.job_id.clone());
                    if let Some(answer) =
                        self.execute_tool(&tool_name, job_id, &mut observations).await
                    {
                        return Ok(answer);
                    }
                }
                other => {
                    observations.push(Observation {
                        tool: "action_selection".to_string(),
                        outcome: Err(format!("unknown action '{other}'")),
                    });
                }
            }
        }

        warn!(max_iterations = self.max_iterations, "Iteration cap reached");
        if observations.iter().any(|o| o.outcome.is_ok()) {
            self.synthesize(history, &hints.query, &observations).await
        } else {
            Ok("I could not complete that request. Could you rephrase it, or check that \
                the relevant documents are uploaded?"
                .to_string())
        }
    }

    /// Execute one tool into the observation log. A missing-document error
    /// ends the turn with its user-phrased message; everything else becomes
    /// an observation for the next iteration.
    async fn execute_tool(
        &self,
        tool_name: &str,
        job_id: Option<String>,
        observations: &mut Vec<Observation>,
    ) -> Option<String> {
        let Some(tool) = self.tools.get(tool_name) else {
            observations.push(Observation {
                tool: tool_name.to_string(),
                outcome: Err("no such tool".to_string()),
            });
            return None;
        };

        let args = ToolArgs::with_job(job_id);
        match tool.execute(&args).await {
            Ok(value) => {
                debug!(tool = tool_name, "Tool succeeded");
                observations.push(Observation {
                    tool: tool_name.to_string(),
                    outcome: Ok(value),
                });
                None
            }
            Err(ToolError::MissingDocument(message)) => {
                info!(tool = tool_name, "Missing document: {message}");
                Some(message)
            }
            Err(e) => {
                warn!(tool = tool_name, "Tool failed: {e}");
                observations.push(Observation {
                    tool: tool_name.to_string(),
                    outcome: Err(e.to_string()),
                });
                None
            }
        }
    }

    /// Compose the final answer strictly from observations. If the LLM is
    /// unavailable, fall back to the last structured result pretty-printed.
    async fn synthesize(
        &self,
        history: &str,
        query: &str,
        observations: &[Observation],
    ) -> Result<String, AppError> {
        let prompt = SYNTHESIS_PROMPT
            .replace("{history}", history)
            .replace("{observations}", &render_observations(observations))
            .replace("{query}", query);

        match self.llm.complete(&prompt, "").await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("Synthesis failed: {e} - returning raw tool result");
                let last_ok = observations
                    .iter()
                    .rev()
                    .find_map(|o| o.outcome.as_ref().ok());
                match last_ok {
                    Some(value) => Ok(serde_json::to_string_pretty(value)
                        .unwrap_or_else(|_| value.to_string())),
                    None => Err(AppError::Llm(e.to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hints_tool_and_job() {
        let hints = parse_hints("[USE_TOOL: fit_score] [Selected job_id: j42] my score?");
        assert_eq!(hints.tool.as_deref(), Some("fit_score"));
        assert_eq!(hints.job_id.as_deref(), Some("j42"));
        assert_eq!(hints.query, "my score?");
    }

    #[test]
    fn test_parse_hints_job_only_and_reversed_order() {
        let hints = parse_hints("[Selected job_id: a1] [USE_TOOL: skill_gap_analysis] gaps");
        assert_eq!(hints.tool.as_deref(), Some("skill_gap_analysis"));
        assert_eq!(hints.job_id.as_deref(), Some("a1"));
        assert_eq!(hints.query, "gaps");
    }

    #[test]
    fn test_parse_hints_plain_query_untouched() {
        let hints = parse_hints("what jobs do I have?");
        assert!(hints.tool.is_none());
        assert!(hints.job_id.is_none());
        assert_eq!(hints.query, "what jobs do I have?");
    }

    #[test]
    fn test_parse_hints_bracket_in_body_is_not_a_hint() {
        let hints = parse_hints("explain [USE_TOOL: x] notation");
        assert!(hints.tool.is_none());
        assert_eq!(hints.query, "explain [USE_TOOL: x] notation");
    }

    #[test]
    fn test_parse_action_with_fences() {
        let raw = "```json\n{\"action\": \"tool\", \"tool\": \"list_jobs\", \
                   \"job_id\": null, \"answer\": null}\n```";
        let action = parse_action(raw).unwrap();
        assert_eq!(action.action, "tool");
        assert_eq!(action.tool.as_deref(), Some("list_jobs"));
        assert!(action.job_id.is_none());
    }

    #[test]
    fn test_parse_action_final_with_answer() {
        let raw = r#"{"action": "final", "answer": "Hello!"}"#;
        let action = parse_action(raw).unwrap();
        assert_eq!(action.action, "final");
        assert_eq!(action.answer.as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_parse_action_garbage_is_none() {
        assert!(parse_action("let me think about this...").is_none());
    }

    #[test]
    fn test_render_observations_empty_placeholder() {
        assert_eq!(render_observations(&[]), "(none)");
    }

    mod hinted_run {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Mutex;

        use async_trait::async_trait;

        use crate::agent::tools::{Tool, ToolArgs, ToolError, ToolRegistry};

        struct RecordingTool {
            name: &'static str,
            calls: Arc<AtomicUsize>,
            seen_job: Arc<Mutex<Option<String>>>,
        }

        #[async_trait]
        impl Tool for RecordingTool {
            fn name(&self) -> &'static str {
                self.name
            }
            fn description(&self) -> &'static str {
                "records its invocations"
            }
            fn needs_job_id(&self) -> bool {
                true
            }
            async fn execute(&self, args: &ToolArgs) -> Result<Value, ToolError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                *self.seen_job.lock().unwrap() = args.job_id.clone();
                Err(ToolError::MissingDocument("Resume not uploaded yet.".to_string()))
            }
        }

        // Any completion against this client would fail after retries, so a
        // successful run proves the LLM was never consulted.
        fn unreachable_llm() -> Arc<LlmClient> {
            Arc::new(LlmClient::new("http://127.0.0.1:9".to_string(), "none".to_string(), 1).unwrap())
        }

        #[tokio::test]
        async fn test_hint_executes_tool_with_no_selection_call() {
            let calls = Arc::new(AtomicUsize::new(0));
            let seen_job = Arc::new(Mutex::new(None));
            let other_calls = Arc::new(AtomicUsize::new(0));

            let registry = Arc::new(ToolRegistry::with_tools(vec![
                Arc::new(RecordingTool {
                    name: "skill_gap_analysis",
                    calls: calls.clone(),
                    seen_job: seen_job.clone(),
                }),
                Arc::new(RecordingTool {
                    name: "fit_score",
                    calls: other_calls.clone(),
                    seen_job: Arc::new(Mutex::new(None)),
                }),
            ]));

            let reasoner = ReasoningLoop::new(unreachable_llm(), registry, AGENT_MAX_ITERATIONS);
            let answer = reasoner
                .run(
                    "(no prior conversation)",
                    "[USE_TOOL: skill_gap_analysis] [Selected job_id: j7] what am I missing?",
                )
                .await
                .unwrap();

            assert_eq!(answer, "Resume not uploaded yet.");
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(other_calls.load(Ordering::SeqCst), 0);
            assert_eq!(seen_job.lock().unwrap().as_deref(), Some("j7"));
        }
    }

    #[test]
    fn test_render_observations_mixed() {
        let observations = vec![
            Observation {
                tool: "fit_score".into(),
                outcome: Ok(serde_json::json!({"score": 0.5})),
            },
            Observation {
                tool: "list_jobs".into(),
                outcome: Err("connection refused".into()),
            },
        ];
        let rendered = render_observations(&observations);
        assert!(rendered.contains(r#"[fit_score] {"score":0.5}"#));
        assert!(rendered.contains("[list_jobs] FAILED: connection refused"));
    }
}
