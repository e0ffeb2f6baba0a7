//! Gemini-backed language-model client
//!
//! Thin HTTP wrapper over the Gemini `generateContent` endpoint. One request,
//! one response, no retry and no streaming. The orchestrator treats any
//! failure here as a generic collaborator error.

use crate::tagging::{LlmClient, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for the default model.
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Create a client for a specific Gemini model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn execute(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, "calling Gemini generateContent");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .into_iter()
            .flatten()
            .find_map(|part| part.text)
            .ok_or(LlmError::EmptyResponse)
    }
}
