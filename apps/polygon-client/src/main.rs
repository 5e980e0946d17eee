//! Polygon Stream Binary
//!
//! Opens one streaming session, subscribes to a list of channels and logs
//! what arrives until interrupted.
//!
//! # Usage
//!
//! ```bash
//! POLYGON_API_KEY=... cargo run --bin polygon-stream
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `POLYGON_API_KEY`: API key
//!
//! ## Optional
//! - `POLYGON_CHANNELS`: Comma-separated channels (default: AM.*)
//! - `POLYGON_STREAM_DELAYED`: Use the delayed feed (default: false)
//! - `POLYGON_STREAM_URL`: Override the feed URL
//! - `POLYGON_METRICS_PORT`: Prometheus port, 0 disables (default: 0)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log level (default: info)

use anyhow::Context;
use async_trait::async_trait;
use polygon_client::infrastructure::metrics;
use polygon_client::infrastructure::telemetry;
use polygon_client::{
    ClientConfig, DisconnectReason, HandlerReply, MarketEvent, SessionHandle, StreamHandler,
    StreamSession,
};
use tokio::signal;
use tokio::sync::mpsc;

/// Channels subscribed when `POLYGON_CHANNELS` is unset.
const DEFAULT_CHANNELS: &str = "AM.*";

/// Logs every event; the state counts events received.
struct LoggingHandler {
    authenticated: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl StreamHandler for LoggingHandler {
    type State = u64;

    async fn on_message(&mut self, event: MarketEvent, count: &u64) -> HandlerReply<u64> {
        let count = count + 1;
        tracing::info!(
            ev = ?event.event_type(),
            symbol = event.symbol().unwrap_or_default(),
            count,
            "Event"
        );
        HandlerReply::Update(count)
    }

    async fn on_connect(&mut self, count: &u64) -> HandlerReply<u64> {
        tracing::info!(events_so_far = *count, "Stream authenticated");
        let _ = self.authenticated.send(());
        HandlerReply::Keep
    }

    async fn on_disconnect(&mut self, reason: &DisconnectReason, count: &u64) -> HandlerReply<u64> {
        tracing::warn!(reason = %reason, events_so_far = *count, "Stream disconnected");
        HandlerReply::Keep
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let _telemetry_guard = telemetry::init()?;

    tracing::info!("Starting Polygon stream");

    let metrics_port: u16 = match std::env::var("POLYGON_METRICS_PORT") {
        Ok(raw) => raw.parse().context("POLYGON_METRICS_PORT must be a port number")?,
        Err(_) => 0,
    };
    if metrics_port != 0 {
        metrics::init_metrics(metrics_port)?;
        tracing::info!(port = metrics_port, "Prometheus exporter listening");
    }

    let config = ClientConfig::from_env()?;
    let channels = parse_channels(
        &std::env::var("POLYGON_CHANNELS").unwrap_or_else(|_| DEFAULT_CHANNELS.to_string()),
    );

    let (authenticated_tx, mut authenticated_rx) = mpsc::unbounded_channel();
    let handle = StreamSession::from_config(&config)
        .handler(LoggingHandler {
            authenticated: authenticated_tx,
        })
        .spawn()?;

    tracing::info!(
        session_id = %handle.id(),
        url = %config.stream.stream_url(),
        channels = %channels.join(","),
        "Session started"
    );

    let exit =
        run_until_shutdown(&handle, &channels, &mut authenticated_rx, signal::ctrl_c()).await?;
    if exit == Exit::Interrupted {
        tracing::info!("Received Ctrl+C, closing session");
        handle.close();
    }
    handle.closed().await;

    if exit == Exit::SessionEnded {
        anyhow::bail!("stream session ended: reconnect attempts exhausted");
    }

    tracing::info!("Polygon stream stopped");
    Ok(())
}

/// Why the binary stopped driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Interrupted,
    SessionEnded,
}

/// Subscribe after every successful auth until `shutdown` resolves or the
/// session task ends on its own.
///
/// Subscriptions only take effect once authenticated. The session drops
/// the handler, and with it the `authenticated` sender, when it stops.
async fn run_until_shutdown(
    handle: &SessionHandle,
    channels: &[String],
    authenticated: &mut mpsc::UnboundedReceiver<()>,
    shutdown: impl Future<Output = std::io::Result<()>>,
) -> anyhow::Result<Exit> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                return Ok(Exit::Interrupted);
            }
            signal = authenticated.recv() => match signal {
                Some(()) => handle.subscribe(channels.to_vec())?,
                None => return Ok(Exit::SessionEnded),
            },
        }
    }
}

fn parse_channels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
