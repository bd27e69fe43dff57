/// LLM Client — the single point of entry for all language-model calls.
///
/// ARCHITECTURAL RULE: no other module may call the inference service
/// directly. All completions go through this module, which owns retry,
/// timeout, and structured-output parsing policy.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
/// Context window requested from the model. 4096 tokens is sufficient for
/// this workload and keeps memory usage predictable on small hosts.
const CONTEXT_WINDOW: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-compatible generate API. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(base_url: String, model: String, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Completion at the default temperature — conversational turns and
    /// narrative synthesis.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.complete_with(prompt, system, DEFAULT_TEMPERATURE).await
    }

    /// Zero-temperature completion — classification and tool selection,
    /// where re-running the same query must yield the same output.
    pub async fn complete_deterministic(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<String, LlmError> {
        self.complete_with(prompt, system, 0.0).await
    }

    /// Deterministic completion parsed as JSON. The prompt must instruct
    /// the model to return valid JSON; code fences and preamble around the
    /// object are tolerated.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = self.complete_deterministic(prompt, system).await?;
        let json = extract_json_object(strip_json_fences(&text)).ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(json).map_err(LlmError::Parse)
    }

    /// Retries on connect errors, 429, and 5xx with exponential backoff.
    async fn complete_with(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_ctx: CONTEXT_WINDOW,
            },
        };
        let url = format!("{}/api/generate", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let generated: GenerateResponse = response.json().await?;
            let text = generated.response.trim().to_string();
            if text.is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!("LLM call succeeded: {} chars", text.len());
            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Extracts the first `{...}` object from model output, tolerating preamble
/// and trailing prose around it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extracts the first `[...]` array from model output, falling back to
/// splitting non-empty lines when no parsable array is present. Used for
/// question-list generation where partial output is better than none.
pub fn parse_string_list(text: &str, fallback_count: usize) -> Vec<String> {
    let text = text.trim();
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if end > start {
            if let Ok(serde_json::Value::Array(items)) =
                serde_json::from_str::<serde_json::Value>(&text[start..=end])
            {
                return items
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
            }
        }
    }

    let lines: Vec<String> = text
        .lines()
        .map(|l| {
            l.trim_matches(|c: char| matches!(c, ' ' | '-' | '•' | '*' | '"' | '\''))
                .to_string()
        })
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        vec![text.chars().take(200).collect()]
    } else {
        lines.into_iter().take(fallback_count).collect()
    }
}
