//! Google Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::LlmProvider;
use crate::config::LlmConfig;
use crate::{PlannerError, Result, http};

const SERVICE: &str = "Gemini";

/// Gemini API client
pub struct GeminiClient {
    client: ClientWithMiddleware,
    api_key: String,
    endpoint: String,
    generation: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let client = http::build_client(config.timeout_seconds, config.max_retries)?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint,
            generation: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
                top_k: config.top_k,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    #[instrument(skip(self, prompt), fields(endpoint = %self.endpoint, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.trim(),
                }],
            }],
            generation_config: &self.generation,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| PlannerError::upstream(SERVICE, format!("Failed to encode request: {e}")))?;

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                PlannerError::upstream(SERVICE, format!("Request failed: {}", http::send_error(e)))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                PlannerError::upstream(SERVICE, format!("Failed to read response: {}", http::read_error(e)))
            })?;

        debug!(
            "Gemini responded {} in {:.3}s",
            status,
            started.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!("Gemini request failed with HTTP {}", status);
            return Err(PlannerError::upstream(SERVICE, error_message(status.as_u16(), &text)));
        }

        let answer = parse_answer(&text)?;
        info!("Received {} characters from Gemini", answer.len());
        Ok(answer)
    }

    fn provider_name(&self) -> &'static str {
        SERVICE
    }
}

/// Pull the first candidate's first text part out of a response body
fn parse_answer(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| PlannerError::upstream(SERVICE, format!("Malformed response: {e}")))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PlannerError::upstream(SERVICE, "No candidates in response"))?;

    let text = candidate
        .content
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty());

    match text {
        Some(text) => Ok(text),
        None => Err(PlannerError::upstream(
            SERVICE,
            format!(
                "Empty answer (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        )),
    }
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => match err.error.status {
            Some(code) => format!("HTTP {status} {code}: {}", err.error.message),
            None => format!("HTTP {status}: {}", err.error.message),
        },
        Err(_) => format!("HTTP {status}"),
    }
}
