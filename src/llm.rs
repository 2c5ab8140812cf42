//! LLM collaborator used by the AI-assisted rules.
//!
//! [`LlmClient::call`] never panics and never leaks transport errors as
//! anything other than [`LlmError`]; callers treat `Err` as "no data".

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::LlmSettings;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),
    #[error("LLM call failed after {attempts} attempt(s): {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `prompt` and parse the reply as JSON, retrying up to
    /// `max_attempts` times.
    async fn call(&self, prompt: &str, max_attempts: u32) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

/// Gemini `generateContent` client with JSON responses.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    backoff_base: Duration,
}

impl GeminiClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let api_key = settings.resolved_api_key().ok_or(LlmError::MissingApiKey)?;
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            backoff_base: settings.backoff_base,
        })
    }

    async fn send_once(&self, prompt: &str) -> Result<Value, LlmError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                temperature: Some(0.2),
            },
        };
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );
        debug!(url = %url.replace(&self.api_key, "***"), "sending LLM request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidResponse(format!("malformed envelope: {e}")))?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                total_tokens = ?usage.total_token_count,
                "LLM usage"
            );
        }
        extract_json_payload(parsed)
    }
}

/// Validate the envelope in order: candidates, content, text, JSON.
fn extract_json_payload(response: GeminiResponse) -> Result<Value, LlmError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("no candidates".into()))?;
    let content = candidate
        .content
        .filter(|c| !c.parts.is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("candidate has no content".into()))?;
    let text = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<String>();
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(LlmError::InvalidResponse("empty text".into()));
    }
    serde_json::from_str(text).map_err(|e| LlmError::InvalidResponse(format!("not JSON: {e}")))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Upper bound on the pause between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential delay before retry `attempt`: `base * 2^attempt`, capped.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .map_or(MAX_BACKOFF, |wait| wait.min(MAX_BACKOFF))
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn call(&self, prompt: &str, max_attempts: u32) -> Result<Value, LlmError> {
        let attempts = max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let wait = backoff_delay(self.backoff_base, attempt);
                debug!(attempt, wait_ms = wait.as_millis() as u64, "retrying LLM call");
                tokio::time::sleep(wait).await;
            }
            match self.send_once(prompt).await {
                Ok(value) => {
                    info!(attempt = attempt + 1, "LLM call succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "LLM attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        error!(attempts, "LLM call exhausted its attempts");
        Err(LlmError::Exhausted {
            attempts,
            last_error,
        })
    }
}
