//! Meeting Relay server.
//!
//! Receives meeting payloads on `POST /webhook`, verifies the optional HMAC
//! signature, summarizes them through the chat-completions API and posts the
//! result to the team chat webhook.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meeting_relay::{
    build_router, AppState, Config, OpenAiSummarizer, SlackNotifier, SummaryFailurePolicy,
};

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "meeting_relay=info,tower_http=info";

/// Idle connections kept per upstream host.
const UPSTREAM_POOL_SIZE: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    info!(
        port = config.port,
        chat_webhook_configured = config.chat_webhook_url.is_some(),
        summarizer_key_configured = config.summarizer_api_key.is_some(),
        summarizer_model = %config.summarizer_model,
        webhook_secret_configured = config.webhook_secret.is_some(),
        signature_header = %config.signature_header,
        require_signature = config.require_signature,
        summary_failure_policy = ?config.summary_failure_policy,
        request_timeout_ms = config.request_timeout_ms,
        "relay_config_loaded"
    );

    // Summarizer and notifier share one connection pool
    let client = Client::builder()
        .pool_max_idle_per_host(UPSTREAM_POOL_SIZE)
        .build()
        .context("Failed to create upstream HTTP client")?;

    let summarizer = Arc::new(OpenAiSummarizer::new(client.clone(), &config));
    let notifier = Arc::new(SlackNotifier::new(client, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let stats = ShutdownStats {
        started: Instant::now(),
        require_signature: config.require_signature,
        summary_failure_policy: config.summary_failure_policy,
    };

    let app = build_router(AppState::with_clients(config, summarizer, notifier));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind relay listener on {}", addr))?;
    info!(address = %addr, "relay_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(stats))
        .await
        .context("Relay server error")?;

    info!("relay_stopped");
    Ok(())
}

/// JSON logs to stdout, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .init();
}

/// Startup facts reported once the server begins draining.
struct ShutdownStats {
    started: Instant,
    require_signature: bool,
    summary_failure_policy: SummaryFailurePolicy,
}

/// Resolves on SIGINT or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires, so the
/// other signal still stops the server.
async fn wait_for_shutdown(stats: ShutdownStats) {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "relay_sigint_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "relay_sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal_name = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(
        signal = signal_name,
        uptime_seconds = stats.started.elapsed().as_secs(),
        require_signature = stats.require_signature,
        summary_failure_policy = ?stats.summary_failure_policy,
        "relay_draining"
    );
}
