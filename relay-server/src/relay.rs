//! Relay pipeline: authenticate → validate → summarize → format → notify.
//!
//! Each step returns `Result<_, RelayError>`; an `Err` short-circuits the
//! request and becomes its HTTP response. Nothing is shared between requests
//! except the read-only settings and clients held by [`Relay`].
//!
//! ```text
//! raw body ─▶ authenticate ─▶ validate ─▶ summarize ─▶ format ─▶ notify ─▶ RelayResponse
//!                 │ 401          │ 400        │ 500 (fail policy only)
//! ```

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{Config, SummaryFailurePolicy};
use crate::message::{analysis_failed, format_message};
use crate::notifier::Notifier;
use crate::summarizer::{Summarizer, SummaryError};
use crate::types::{MeetingPayload, RelayResponse};
use crate::web::signature::{check_signature, SignatureVerdict};

pub const RELAYED_MESSAGE: &str = "Meeting summary relayed";
pub const NOTIFY_FAILED_MESSAGE: &str = "Failed to deliver notification";

/// Reasons a request stops before the notifier answers.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Missing signature")]
    MissingSignature,

    #[error("Summarization failed: {0}")]
    UpstreamSummary(#[source] SummaryError),

    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::BodyRejected { status, .. } => *status,
            RelayError::InvalidSignature | RelayError::MissingSignature => {
                StatusCode::UNAUTHORIZED
            }
            RelayError::UpstreamSummary(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(RelayResponse::failed(self.to_string()))).into_response()
    }
}

/// Per-process relay settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub webhook_secret: Option<String>,
    pub require_signature: bool,
    pub summary_failure_policy: SummaryFailurePolicy,
}

impl From<&Config> for RelaySettings {
    fn from(config: &Config) -> Self {
        Self {
            webhook_secret: config.webhook_secret.clone(),
            require_signature: config.require_signature,
            summary_failure_policy: config.summary_failure_policy,
        }
    }
}

/// Orchestrates one relay per inbound request.
#[derive(Clone)]
pub struct Relay {
    settings: Arc<RelaySettings>,
    summarizer: Arc<dyn Summarizer>,
    notifier: Arc<dyn Notifier>,
}

impl Relay {
    pub fn new(
        settings: RelaySettings,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            summarizer,
            notifier,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// `body` must be the exact bytes received; `signature` is the raw header
    /// value, if any. A notifier failure is an `Ok` response with
    /// `success: false`.
    pub async fn handle(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<RelayResponse, RelayError> {
        info!(
            body_length = body.len(),
            has_signature = signature.is_some(),
            "relay_received"
        );

        let verdict = self.authenticate(signature, body)?;
        let payload = validate(body)?;

        info!(
            title = payload.title().unwrap_or_default(),
            participants = payload.participants.len(),
            action_items = payload.action_items.len(),
            signature = ?verdict,
            "relay_validated"
        );

        let analysis = self.summarize(&payload).await?;
        let message = format_message(&payload, &analysis);

        Ok(self.notify(&message).await)
    }

    fn authenticate(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<SignatureVerdict, RelayError> {
        let verdict = check_signature(
            self.settings.webhook_secret.as_deref(),
            body,
            signature,
            self.settings.require_signature,
        );

        if verdict.is_accepted() {
            return Ok(verdict);
        }

        if verdict == SignatureVerdict::Missing {
            warn!("relay_rejected_missing_signature");
            Err(RelayError::MissingSignature)
        } else {
            warn!("relay_rejected_invalid_signature");
            Err(RelayError::InvalidSignature)
        }
    }

    async fn summarize(&self, payload: &MeetingPayload) -> Result<String, RelayError> {
        match self.summarizer.summarize(payload).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => match self.settings.summary_failure_policy {
                SummaryFailurePolicy::Embed => {
                    warn!(error = %e, policy = "embed", "relay_summary_failed");
                    Ok(analysis_failed(&e.to_string()))
                }
                SummaryFailurePolicy::Fail => {
                    error!(error = %e, policy = "fail", "relay_summary_failed");
                    Err(RelayError::UpstreamSummary(e))
                }
            },
        }
    }

    async fn notify(&self, message: &str) -> RelayResponse {
        if self.notifier.notify(message).await {
            info!("relay_notified");
            RelayResponse::ok(RELAYED_MESSAGE)
        } else {
            warn!("relay_notify_failed");
            RelayResponse::failed(NOTIFY_FAILED_MESSAGE)
        }
    }
}

/// Parse the raw body and require a non-blank title.
pub fn validate(body: &[u8]) -> Result<MeetingPayload, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::Validation("Request body is empty".into()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::Validation(format!("Invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(RelayError::Validation(
            "Payload must be a JSON object".into(),
        ));
    }

    let payload: MeetingPayload = serde_json::from_value(value)
        .map_err(|e| RelayError::Validation(format!("Invalid payload: {}", e)))?;

    if payload.title().is_none() {
        return Err(RelayError::Validation(
            "Missing required field: meetingTitle".into(),
        ));
    }

    Ok(payload)
}
