//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into [`Config`], which is then passed
//! explicitly to the clients and the relay. Nothing below the binary reads
//! the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default chat-completions endpoint for the summarization service.
pub const DEFAULT_SUMMARIZER_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model requested from the summarization service.
pub const DEFAULT_SUMMARIZER_MODEL: &str = "gpt-4o-mini";

/// Default header carrying the hex HMAC of the raw body.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-signature";

/// What the relay does when the summarization call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFailurePolicy {
    /// Substitute an "Analysis failed" placeholder and still notify.
    #[default]
    Embed,
    /// Answer 500 and skip the notifier.
    Fail,
}

impl FromStr for SummaryFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown summary failure policy: {other}")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Incoming chat webhook (Slack-compatible, accepts `{"text": ...}`)
    pub chat_webhook_url: Option<String>,

    /// Bearer credential for the summarization service
    pub summarizer_api_key: Option<String>,

    /// Chat-completions endpoint of the summarization service
    pub summarizer_url: String,

    /// Model name sent with every summarization request
    pub summarizer_model: String,

    /// Shared secret for HMAC-SHA256 verification of inbound bodies
    pub webhook_secret: Option<String>,

    /// Header the sender puts the signature in
    pub signature_header: String,

    /// Reject requests that carry no signature header at all
    pub require_signature: bool,

    /// Behavior when the summarization call fails
    pub summary_failure_policy: SummaryFailurePolicy,

    /// Timeout applied to each outbound HTTP call, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            chat_webhook_url: None,
            summarizer_api_key: None,
            summarizer_url: DEFAULT_SUMMARIZER_URL.to_string(),
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            webhook_secret: None,
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            require_signature: false,
            summary_failure_policy: SummaryFailurePolicy::Embed,
            request_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_or("PORT", defaults.port),

            chat_webhook_url: non_empty("SLACK_WEBHOOK_URL"),

            summarizer_api_key: non_empty("OPENAI_API_KEY"),

            summarizer_url: non_empty("OPENAI_API_URL").unwrap_or(defaults.summarizer_url),

            summarizer_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.summarizer_model),

            webhook_secret: non_empty("WEBHOOK_SECRET"),

            signature_header: non_empty("SIGNATURE_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.signature_header),

            require_signature: parse_bool("REQUIRE_SIGNATURE", defaults.require_signature),

            summary_failure_policy: parse_or(
                "SUMMARY_FAILURE_POLICY",
                defaults.summary_failure_policy,
            ),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
        }
    }

    /// Timeout for outbound calls as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable with `FromStr`, falling back to `default` on absence or error.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    let Some(raw) = non_empty(name) else {
        return default;
    };

    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a boolean flag such as "true", "1", "yes", "off".
fn parse_bool(name: &str, default: bool) -> bool {
    let Some(raw) = non_empty(name) else {
        return default;
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}
