//! HTTP endpoint handlers.
//!
//! The webhook handler takes the body as raw bytes so the signature is
//! checked against exactly what was sent, then hands off to [`Relay`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::notifier::Notifier;
use crate::relay::{Relay, RelayError, RelaySettings};
use crate::summarizer::Summarizer;
use crate::Config;

/// Signature header consulted when the configured one is absent.
pub const FALLBACK_SIGNATURE_HEADER: &str = "x-hub-signature-256";

pub const ROOT_LIVENESS: &str = "Meeting relay is running";
pub const WEBHOOK_LIVENESS: &str = "Webhook endpoint is live";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Relay,
}

impl AppState {
    pub fn new(config: Config, relay: Relay) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }

    /// Build the relay from `config` around the given clients.
    pub fn with_clients(
        config: Config,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let relay = Relay::new(RelaySettings::from(&config), summarizer, notifier);
        Self::new(config, relay)
    }
}

// =============================================================================
// Liveness
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /`
pub async fn root() -> &'static str {
    ROOT_LIVENESS
}

/// `GET /webhook`
pub async fn webhook_liveness() -> &'static str {
    WEBHOOK_LIVENESS
}

// =============================================================================
// Relay Webhook
// =============================================================================

/// `POST /webhook`
///
/// Returns 200 for every handled outcome, including a failed chat delivery
/// (`success: false`). Rejections carry their own status.
pub async fn relay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // Oversized or unreadable bodies still get the JSON response shape
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = RelayError::BodyRejected {
                status: rejection.status(),
                message: rejection.body_text(),
            };
            warn!(status_code = err.status().as_u16(), error = %err, "relay_body_rejected");
            return err.into_response();
        }
    };

    let signature = signature_header(&headers, &state.config.signature_header);

    match state.relay.handle(signature, &body).await {
        Ok(outcome) => {
            info!(success = outcome.success, "relay_responded");
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            info!(status_code = e.status().as_u16(), error = %e, "relay_rejected");
            e.into_response()
        }
    }
}

/// Read the signature from the configured header, then the fallback.
///
/// A header that is present but not valid UTF-8 yields `Some("")`, which
/// fails verification rather than counting as absent.
fn signature_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| headers.get(FALLBACK_SIGNATURE_HEADER))
        .map(|v| v.to_str().unwrap_or_default())
}
