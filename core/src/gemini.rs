//! Gemini generateContent client. Returns generated text or the prompt block reason.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GEMINI_TIMEOUT;
use crate::error::RelayError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    /// Content-safety rejection (e.g. "SAFETY", "OTHER").
    Blocked(String),
}

/// Anything that turns a prompt into a [`Generation`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, RelayError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GEMINI_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, RelayError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling gemini");
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RelayError::http("gemini"))?;
        let status = res.status();
        let text = res.text().await.map_err(RelayError::http("gemini"))?;
        if !status.is_success() {
            return Err(RelayError::Status {
                service: "gemini",
                status: status.as_u16(),
                body: text,
            });
        }
        parse_generation(&text)
    }
}

/// Interpret a generateContent response body.
pub fn parse_generation(body: &str) -> Result<Generation, RelayError> {
    let res: GenerateResponse =
        serde_json::from_str(body).map_err(|e| RelayError::malformed("gemini", e.to_string()))?;

    if let Some(reason) = res.prompt_feedback.and_then(|f| f.block_reason) {
        return Ok(Generation::Blocked(reason));
    }

    let candidate = res
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| RelayError::malformed("gemini", "no candidates"))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(RelayError::malformed(
            "gemini",
            format!("candidate has no text (finish_reason={})", reason),
        ));
    }
    Ok(Generation::Text(text))
}
