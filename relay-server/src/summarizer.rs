//! Summarization client for the chat-completions API.
//!
//! The meeting payload is sent as pretty-printed JSON beneath a fixed system
//! prompt; the first choice's message content comes back as the analysis.
//! One attempt per request, bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::types::MeetingPayload;

/// Fixed instructions sent ahead of every payload.
pub const SYSTEM_PROMPT: &str = "You are an assistant that reviews meeting notes. \
Given the meeting data as JSON, write a short analysis for a team chat channel: \
the key decisions, open risks, and a prioritized list of next steps. \
Keep it under 200 words and use plain text bullet points.";

const SAMPLING_TEMPERATURE: f32 = 0.3;

/// Longest slice of an error body kept for logs and messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Ways the summarization call can fail.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summarization API key is not configured")]
    MissingCredential,

    #[error("failed to serialize meeting payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("summarization request timed out")]
    Timeout,

    #[error("summarization request failed: {0}")]
    Transport(reqwest::Error),

    #[error("summarization service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("summarization response malformed: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SummaryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SummaryError::Timeout
        } else {
            SummaryError::Transport(e)
        }
    }
}

/// Anything that can turn a meeting payload into analysis text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, payload: &MeetingPayload) -> Result<String, SummaryError>;
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// =============================================================================
// OpenAI-compatible Client
// =============================================================================

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiSummarizer {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.summarizer_url.clone(),
            model: config.summarizer_model.clone(),
            api_key: config.summarizer_api_key.clone(),
            timeout: config.request_timeout(),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, payload: &MeetingPayload) -> Result<String, SummaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SummaryError::MissingCredential)?;

        let meeting_json = serde_json::to_string_pretty(payload)?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &meeting_json,
                },
            ],
            temperature: SAMPLING_TEMPERATURE,
        };

        info!(
            model = %self.model,
            prompt_length = meeting_json.len(),
            timeout_seconds = self.timeout.as_secs_f64(),
            "summarizer_request_starting"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, is_timeout = e.is_timeout(), "summarizer_request_failed");
                SummaryError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = preview(&body);
            error!(status_code = status.as_u16(), body = %body, "summarizer_bad_status");
            return Err(SummaryError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "summarizer_response_not_json");
            SummaryError::MalformedResponse(e.to_string())
        })?;

        let analysis = extract_content(parsed)?;

        info!(analysis_length = analysis.len(), "summarizer_request_complete");

        Ok(analysis)
    }
}

/// Pull `choices[0].message.content` out of a response.
fn extract_content(response: ChatResponse) -> Result<String, SummaryError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| SummaryError::MalformedResponse("missing choices[0].message.content".into()))
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}
