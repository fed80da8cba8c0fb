//! Meeting Relay - webhook relay from meeting notes to team chat.
//!
//! A single service that accepts meeting payloads, checks their HMAC
//! signature, asks a language model for an analysis and posts the result to
//! a chat webhook.
//!
//! ## Architecture
//!
//! ```text
//! POST /webhook → signature gate → validate → Summarizer → format → Notifier → JSON
//! ```

pub mod config;
pub mod message;
pub mod notifier;
pub mod relay;
pub mod summarizer;
pub mod types;
pub mod web;

// Re-export commonly used types
pub use config::{Config, SummaryFailurePolicy};
pub use notifier::{Notifier, SlackNotifier};
pub use relay::{Relay, RelayError, RelaySettings};
pub use summarizer::{OpenAiSummarizer, Summarizer, SummaryError};
pub use types::{MeetingPayload, RelayResponse};
pub use web::{build_router, AppState};
