//! Gemini `generateContent` client with structured (JSON schema) output.
//!
//! Epistemic foundation:
//! - K_i: The REST API accepts a response schema and a JSON MIME type
//! - B_i: API will respond within timeout (might fail)
//! - B_i: Response envelope will be valid JSON (might fail)
//! - I^B: Network availability unknowable → surfaced to the caller, never retried

use crate::models::{AhdafError, Config, GeminiError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// A model that answers a prompt with JSON matching a declared schema.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Send `prompt`, requiring output that matches `schema`.
    ///
    /// Returns the raw reply text; validating it is the caller's job.
    async fn complete_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<CompletionResponse>;
}

/// Request payload for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Google API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<u16>,
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Response from a completion request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Concatenated text of the first candidate (empty when none)
    pub content: String,
    /// Model used (may differ from requested)
    pub model: String,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
    /// Request duration
    pub duration: Duration,
}

/// Gemini API client.
///
/// One request per call: no retries, no rate limiting.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f64>,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(180));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AhdafError::Network)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: None,
            timeout,
        })
    }

    /// Build a client from configuration, resolving the API key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Self::new(
            api_key,
            Some(config.gemini.base_url.clone()),
            Some(config.gemini.model.clone()),
            Some(config.gemini.timeout_secs),
        )?;
        Ok(client.with_temperature(config.generation.temperature))
    }

    /// Set the sampling temperature sent with every request.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Get the model ID.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for a request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| GeminiError::AuthenticationFailed)?;
        headers.insert("x-goog-api-key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn transport_error(&self, e: reqwest::Error) -> AhdafError {
        if e.is_timeout() {
            AhdafError::Timeout(self.timeout)
        } else {
            AhdafError::Network(e)
        }
    }

    /// Map a non-2xx reply to an error.
    fn status_error(&self, status: u16, body: String) -> GeminiError {
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status {
            401 | 403 => GeminiError::AuthenticationFailed,
            404 => GeminiError::ModelNotFound(self.model.clone()),
            429 => GeminiError::QuotaExhausted { message },
            _ => GeminiError::ApiError { status, message },
        }
    }
}

#[async_trait]
impl StructuredModel for GeminiClient {
    /// Complete a prompt with JSON output.
    ///
    /// B_i(API available) → Result
    /// B_i(valid envelope) → Result
    async fn complete_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<CompletionResponse> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.status_error(status.as_u16(), error_body).into());
        }

        // A failed body read is a transport failure; only a bad envelope is InvalidResponse.
        let raw = response.text().await.map_err(|e| self.transport_error(e))?;
        let body: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| GeminiError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let content = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        let usage = body.usage_metadata.unwrap_or_default();

        debug!(
            model = %self.model,
            input_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generateContent complete"
        );

        Ok(CompletionResponse {
            content,
            model: body.model_version.unwrap_or_else(|| self.model.clone()),
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
            duration: start.elapsed(),
        })
    }
}
