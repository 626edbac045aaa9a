//! Gemini REST client
//!
//! Thin [`FeedbackGenerator`] implementation over the `generateContent`
//! endpoint. The API key is resolved once at construction; a client without
//! a key fails every call, which puts the [`Interviewer`] on its fallback
//! path.
//!
//! [`Interviewer`]: crate::feedback::Interviewer

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::feedback::{FeedbackError, FeedbackGenerator};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
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

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig) -> Result<Self, FeedbackError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            api_key: config.api_key(),
        })
    }
}

#[async_trait]
impl FeedbackGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, FeedbackError> {
        let api_key = self.api_key.as_ref().ok_or(FeedbackError::MissingApiKey)?;

        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling generator");
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Api { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or(FeedbackError::EmptyResponse)
    }
}
