// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the generative-language `generateContent` endpoint.
//!
//! One request in, one text out. No retries; the transport's own failure is
//! reported as-is.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<ChatTurn>,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    /// A one-shot prompt with no system instruction.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::user(text)],
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Generative-language API key is not configured")]
    MissingApiKey,

    #[error("Request to generative-language API failed: {0}")]
    Request(String),

    #[error("Generative-language API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse generative-language response: {0}")]
    Parse(String),

    #[error("Generative-language API returned no text")]
    EmptyResponse,
}

/// Connection-pooled generative-language client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Submit one generation request and return the generated text, trimmed.
    pub async fn generate(&self, request: GenerateRequest) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = ApiRequest::from(request);

        tracing::debug!(
            model = %self.model,
            turns = body.contents.len(),
            "Calling generative-language API"
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Generative-language API error response");
            return Err(GeminiError::Status { status, body });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }

        Ok(text.to_string())
    }
}

// ─── Wire Types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<GenerateRequest> for ApiRequest {
    fn from(request: GenerateRequest) -> Self {
        Self {
            contents: request
                .turns
                .into_iter()
                .map(|turn| ApiContent {
                    role: Some(turn.role),
                    parts: vec![ApiPart {
                        text: Some(turn.text),
                    }],
                })
                .collect(),
            system_instruction: request.system_instruction.map(|text| ApiContent {
                role: None,
                parts: vec![ApiPart { text: Some(text) }],
            }),
            generation_config: request
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<ChatRole>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ApiContent>,
}
