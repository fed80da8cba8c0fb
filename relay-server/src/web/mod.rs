//! Web server module for the relay endpoint.
//!
//! This module provides:
//! - `POST /webhook`: verify, summarize, notify, answer with JSON
//! - `GET /webhook`, `GET /`, `GET /health`: liveness checks
//! - Permissive CORS on every response

pub mod handlers;
pub mod router;
pub mod signature;

pub use handlers::{
    health, relay_webhook, root, webhook_liveness, AppState, HealthResponse,
    FALLBACK_SIGNATURE_HEADER, ROOT_LIVENESS, WEBHOOK_LIVENESS,
};
pub use router::{allowed_headers, build_router, cors_layer};
pub use signature::{check_signature, sign, verify_signature, SignatureVerdict};
