//! Chat webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;

/// Anything that can deliver a text message to the team channel.
///
/// Delivery failures are reported as `false`, never as errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> bool;
}

#[derive(Debug, Serialize)]
struct ChatWebhookBody<'a> {
    text: &'a str,
}

/// Notifier that posts `{"text": ...}` to a Slack-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            webhook_url: config.chat_webhook_url.clone(),
            timeout: config.request_timeout(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> bool {
        let Some(url) = self.webhook_url.as_deref() else {
            warn!("notifier_webhook_url_not_configured");
            return false;
        };

        info!(
            message_length = message.len(),
            timeout_seconds = self.timeout.as_secs_f64(),
            "notifier_post_starting"
        );

        let result = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&ChatWebhookBody { text: message })
            .send()
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status();
                let is_success = status.is_success();

                if is_success {
                    info!(status_code = status.as_u16(), "notifier_post_complete");
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    let preview: String = body.chars().take(200).collect();
                    warn!(
                        status_code = status.as_u16(),
                        body = %preview,
                        "notifier_post_rejected"
                    );
                }

                is_success
            }
            Err(e) => {
                if e.is_timeout() {
                    error!(
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "notifier_post_timeout"
                    );
                } else {
                    error!(error = %e, "notifier_post_error");
                }
                false
            }
        }
    }
}
