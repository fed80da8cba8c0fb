//! Shared fixtures for router-level tests: counting stub clients and helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use meeting_relay::{
    build_router, AppState, Config, MeetingPayload, Notifier, Summarizer, SummaryError,
    SummaryFailurePolicy,
};

pub const SECRET: &str = "integration-test-secret";

pub const SYNC_PAYLOAD: &str = r#"{"meetingTitle":"Sync","date":"2024-01-01","participants":["A","B"],"summary":"discussed X","actionItems":["do Y"]}"#;

/// How the stub summarizer behaves.
#[derive(Debug, Clone, Copy)]
pub enum SummarizerMode {
    Succeed,
    Fail,
    Panic,
}

pub struct StubSummarizer {
    mode: SummarizerMode,
    calls: AtomicUsize,
}

impl StubSummarizer {
    pub fn new(mode: SummarizerMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, payload: &MeetingPayload) -> Result<String, SummaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            SummarizerMode::Succeed => Ok(format!(
                "Analysis of {}",
                payload.title().unwrap_or_default()
            )),
            SummarizerMode::Fail => Err(SummaryError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            )),
            SummarizerMode::Panic => panic!("summarizer exploded"),
        }
    }
}

pub struct StubNotifier {
    succeed: bool,
    messages: Mutex<Vec<String>>,
}

impl StubNotifier {
    pub fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            succeed,
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify(&self, message: &str) -> bool {
        self.messages.lock().unwrap().push(message.to_string());
        self.succeed
    }
}

/// A router wired to stubs, plus handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub summarizer: Arc<StubSummarizer>,
    pub notifier: Arc<StubNotifier>,
}

pub struct TestAppBuilder {
    config: Config,
    summarizer_mode: SummarizerMode,
    notifier_succeeds: bool,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            config: Config {
                webhook_secret: Some(SECRET.to_string()),
                ..Config::default()
            },
            summarizer_mode: SummarizerMode::Succeed,
            notifier_succeeds: true,
        }
    }

    pub fn require_signature(mut self, require: bool) -> Self {
        self.config.require_signature = require;
        self
    }

    pub fn summary_failure_policy(mut self, policy: SummaryFailurePolicy) -> Self {
        self.config.summary_failure_policy = policy;
        self
    }

    pub fn summarizer(mut self, mode: SummarizerMode) -> Self {
        self.summarizer_mode = mode;
        self
    }

    pub fn notifier_succeeds(mut self, succeeds: bool) -> Self {
        self.notifier_succeeds = succeeds;
        self
    }

    pub fn build(self) -> TestApp {
        let summarizer = StubSummarizer::new(self.summarizer_mode);
        let notifier = StubNotifier::new(self.notifier_succeeds);
        let state = AppState::with_clients(self.config, summarizer.clone(), notifier.clone());

        TestApp {
            router: build_router(state),
            summarizer,
            notifier,
        }
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Hex HMAC-SHA256 of `body` under the test secret.
pub fn signature_for(body: &str) -> String {
    meeting_relay::web::sign(SECRET, body.as_bytes()).unwrap()
}

pub fn webhook_request(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");

    if let Some(signature) = signature {
        builder = builder.header("x-signature", signature);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn signed_request(body: &str) -> Request<Body> {
    webhook_request(body, Some(&signature_for(body)))
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn text_body(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
