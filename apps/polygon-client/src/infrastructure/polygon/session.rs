//! Streaming Session
//!
//! One tokio task per session owns the socket, the [`SessionCore`] and the
//! handler. Callers talk to it through a [`SessionHandle`], which forwards
//! commands over a bounded queue. Socket frames and caller commands are
//! serialized by a single `select!` loop, so no lock guards session state.
//!
//! # Lifecycle
//!
//! ```text
//! spawn -> connect -> auth -> stream ... -> disconnect -> backoff -> connect ...
//!                                                     \-> close / attempts exhausted
//! ```
//!
//! Commands keep being served while the transport is down: subscribe is a
//! no-op, unsubscribe still updates the desired set, queries answer.

use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::codec::{CodecError, JsonCodec};
use super::core::SessionCore;
use super::messages::Command;
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::ports::StreamHandler;
use crate::domain::channel::IntoChannels;
use crate::domain::streaming::DisconnectReason;
use crate::infrastructure::config::{
    ApiKey, ClientConfig, ConfigError, DELAYED_STREAM_URL, REALTIME_STREAM_URL,
};
use crate::infrastructure::metrics;

/// Default bound on [`SessionHandle::subscriptions`].
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the caller command queue.
const COMMAND_QUEUE_CAPACITY: usize = 256;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced to callers of a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session could not be built.
    #[error("invalid session configuration: {0}")]
    Config(#[from] ConfigError),

    /// The session task has ended.
    #[error("session is closed")]
    Closed,

    /// The command queue is full.
    #[error("session command queue is full")]
    Busy,

    /// The session did not answer a query in time.
    #[error("session did not answer within {0:?}")]
    QueryTimeout(Duration),
}

/// Failures writing to an open transport.
#[derive(Debug, thiserror::Error)]
enum TransportError {
    #[error("failed to encode command: {0}")]
    Encode(#[from] CodecError),

    #[error("failed to send frame: {0}")]
    Send(String),
}

// =============================================================================
// Commands
// =============================================================================

/// Requests from a handle to its session task.
#[derive(Debug)]
enum SessionCommand {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Subscriptions(oneshot::Sender<HashSet<String>>),
}

// =============================================================================
// Builder
// =============================================================================

/// Entry point for streaming sessions.
#[derive(Debug)]
pub struct StreamSession;

impl StreamSession {
    /// Start building a session authenticated with `api_key`.
    #[must_use]
    pub fn builder<H: StreamHandler>(api_key: impl Into<String>) -> SessionBuilder<H> {
        SessionBuilder {
            api_key: api_key.into(),
            handler: None,
            state: None,
            delayed: false,
            url: None,
            reconnect: ReconnectConfig::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            restore_subscriptions: false,
        }
    }

    /// Start building a session from client configuration.
    #[must_use]
    pub fn from_config<H: StreamHandler>(config: &ClientConfig) -> SessionBuilder<H> {
        let builder = Self::builder(config.api_key.expose())
            .delayed(config.stream.delayed)
            .reconnect(ReconnectConfig::from_stream_settings(&config.stream));
        match &config.stream.url {
            Some(url) => builder.url(url.clone()),
            None => builder,
        }
    }
}

/// Configures and spawns a streaming session.
pub struct SessionBuilder<H: StreamHandler> {
    api_key: String,
    handler: Option<H>,
    state: Option<H::State>,
    delayed: bool,
    url: Option<String>,
    reconnect: ReconnectConfig,
    query_timeout: Duration,
    restore_subscriptions: bool,
}

impl<H: StreamHandler> SessionBuilder<H> {
    /// Handler receiving lifecycle and market events. Required.
    #[must_use]
    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Initial handler state (default: `H::State::default()`).
    #[must_use]
    pub fn state(mut self, state: H::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Use the 15-minute delayed feed.
    #[must_use]
    pub const fn delayed(mut self, delayed: bool) -> Self {
        self.delayed = delayed;
        self
    }

    /// Connect to this URL instead of the realtime or delayed feed.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Backoff between reconnection attempts.
    #[must_use]
    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Bound on [`SessionHandle::subscriptions`].
    #[must_use]
    pub const fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Resend the whole desired set after every successful authentication.
    #[must_use]
    pub const fn restore_subscriptions(mut self, restore: bool) -> Self {
        self.restore_subscriptions = restore;
        self
    }

    /// The URL the session will connect to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match (&self.url, self.delayed) {
            (Some(url), _) => url,
            (None, true) => DELAYED_STREAM_URL,
            (None, false) => REALTIME_STREAM_URL,
        }
    }

    /// Spawn the session on the current tokio runtime.
    ///
    /// Returns as soon as the task is spawned; the handshake happens in
    /// the background.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if no handler was supplied or the
    /// API key is empty.
    pub fn spawn(self) -> Result<SessionHandle, SessionError> {
        let url = self.endpoint().to_string();
        let handler = self.handler.ok_or(ConfigError::MissingHandler)?;
        let api_key = ApiKey::new(self.api_key)?;

        let id = Uuid::new_v4();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let cancel = CancellationToken::new();

        let actor = SessionActor {
            url,
            core: SessionCore::new(
                api_key,
                handler,
                self.state.unwrap_or_default(),
                self.restore_subscriptions,
            )
            .with_session_id(id),
            commands: commands_rx,
            cancel: cancel.clone(),
            policy: ReconnectPolicy::new(self.reconnect),
        };

        let span = tracing::info_span!("stream_session", session_id = %id);
        let task = tokio::spawn(actor.run().instrument(span));

        Ok(SessionHandle {
            id,
            commands: commands_tx,
            cancel,
            task,
            query_timeout: self.query_timeout,
        })
    }
}

impl<H: StreamHandler> std::fmt::Debug for SessionBuilder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("endpoint", &self.endpoint())
            .field("has_handler", &self.handler.is_some())
            .field("reconnect", &self.reconnect)
            .field("query_timeout", &self.query_timeout)
            .field("restore_subscriptions", &self.restore_subscriptions)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Caller side of a running session.
///
/// Dropping the handle closes the session.
#[derive(Debug)]
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    query_timeout: Duration,
}

impl SessionHandle {
    /// Session identifier, also recorded on the session's tracing span.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to one channel or a list of channels.
    ///
    /// Fire-and-forget: takes effect only if the session is authenticated
    /// when the task processes it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session has ended, or
    /// `SessionError::Busy` if the command queue is full.
    pub fn subscribe(&self, channels: impl IntoChannels) -> Result<(), SessionError> {
        let channels = channels.into_channels();
        if channels.is_empty() {
            return Ok(());
        }
        self.try_send(SessionCommand::Subscribe(channels))
    }

    /// Unsubscribe from one channel or a list of channels.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session has ended, or
    /// `SessionError::Busy` if the command queue is full.
    pub fn unsubscribe(&self, channels: impl IntoChannels) -> Result<(), SessionError> {
        let channels = channels.into_channels();
        if channels.is_empty() {
            return Ok(());
        }
        self.try_send(SessionCommand::Unsubscribe(channels))
    }

    /// The desired subscription set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QueryTimeout` if the task does not answer
    /// within the query timeout, or `SessionError::Closed` if it has ended.
    pub async fn subscriptions(&self) -> Result<HashSet<String>, SessionError> {
        let query = async {
            let (reply_tx, reply_rx) = oneshot::channel();
            self.commands
                .send(SessionCommand::Subscriptions(reply_tx))
                .await
                .map_err(|_| SessionError::Closed)?;
            reply_rx.await.map_err(|_| SessionError::Closed)
        };

        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| SessionError::QueryTimeout(self.query_timeout))?
    }

    /// Ask the session to close. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the session task has finished.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session task to finish.
    pub async fn closed(self) {
        if let Err(e) = self.task.await
            && e.is_panic()
        {
            tracing::error!(session_id = %self.id, "Session task panicked");
        }
    }

    fn try_send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::Busy,
            mpsc::error::TrySendError::Closed(_) => SessionError::Closed,
        })
    }
}

// =============================================================================
// Actor
// =============================================================================

/// What woke the session loop.
enum Step<T> {
    Cancelled,
    Command(Option<SessionCommand>),
    Ready(T),
}

struct SessionActor<H: StreamHandler> {
    url: String,
    core: SessionCore<H>,
    commands: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
    policy: ReconnectPolicy,
}

impl<H: StreamHandler> SessionActor<H> {
    async fn run(mut self) {
        loop {
            let reason = self.connect_and_run().await;
            self.core.on_transport_disconnected(&reason).await;

            if reason == DisconnectReason::Shutdown {
                break;
            }

            let Some(delay) = self.policy.next_delay() else {
                tracing::warn!(
                    attempts = self.policy.attempt_count(),
                    "Reconnect attempts exhausted"
                );
                break;
            };

            metrics::record_reconnect();
            tracing::info!(
                attempt = self.policy.attempt_count(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting to stream"
            );

            if !self.wait_offline(delay).await {
                break;
            }
        }

        tracing::info!("Stream session closed");
    }

    /// Sleep out a backoff delay while still serving commands. Returns
    /// `false` if the session should stop instead of reconnecting.
    async fn wait_offline(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            let step = tokio::select! {
                () = self.cancel.cancelled() => Step::Cancelled,
                command = self.commands.recv() => Step::Command(command),
                () = &mut sleep => Step::Ready(()),
            };

            match step {
                Step::Cancelled | Step::Command(None) => return false,
                Step::Command(Some(command)) => self.serve_offline(command),
                Step::Ready(()) => return true,
            }
        }
    }

    /// Connect, authenticate and stream until the transport goes away.
    async fn connect_and_run(&mut self) -> DisconnectReason {
        if self.cancel.is_cancelled() {
            return DisconnectReason::Shutdown;
        }

        tracing::info!(url = %self.url, "Connecting to stream");
        self.core.on_connecting();

        let connect = tokio_tungstenite::connect_async(self.url.clone());
        tokio::pin!(connect);

        let ws_stream = loop {
            let step = tokio::select! {
                () = self.cancel.cancelled() => Step::Cancelled,
                command = self.commands.recv() => Step::Command(command),
                result = &mut connect => Step::Ready(result),
            };

            match step {
                Step::Cancelled | Step::Command(None) => return DisconnectReason::Shutdown,
                Step::Command(Some(command)) => self.serve_offline(command),
                Step::Ready(Ok((ws_stream, _response))) => break ws_stream,
                Step::Ready(Err(e)) => return DisconnectReason::ConnectFailed(e.to_string()),
            }
        };

        let (mut write, mut read) = ws_stream.split();

        let auth = self.core.on_transport_connected();
        if let Err(e) = send_command(&mut write, &auth).await {
            return DisconnectReason::Transport(e.to_string());
        }

        loop {
            let step = tokio::select! {
                () = self.cancel.cancelled() => Step::Cancelled,
                command = self.commands.recv() => Step::Command(command),
                msg = read.next() => Step::Ready(msg),
            };

            match step {
                Step::Cancelled | Step::Command(None) => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "Close frame not sent");
                    }
                    return DisconnectReason::Shutdown;
                }
                Step::Command(Some(command)) => {
                    let Some(outbound) = self.apply(command) else {
                        continue;
                    };
                    if let Err(e) = send_command(&mut write, &outbound).await {
                        return DisconnectReason::Transport(e.to_string());
                    }
                }
                Step::Ready(Some(Ok(Message::Text(text)))) => {
                    let outbound = self.core.on_frame(text.as_str()).await;
                    if self.core.is_authenticated() {
                        self.policy.reset();
                    }
                    for command in &outbound {
                        if let Err(e) = send_command(&mut write, command).await {
                            return DisconnectReason::Transport(e.to_string());
                        }
                    }
                }
                Step::Ready(Some(Ok(Message::Ping(data)))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        return DisconnectReason::Transport(e.to_string());
                    }
                }
                Step::Ready(Some(Ok(Message::Close(frame)))) => {
                    tracing::info!("Server sent close frame");
                    return close_reason(frame);
                }
                Step::Ready(Some(Ok(_))) => {
                    // Binary and pong frames carry nothing for us.
                }
                Step::Ready(Some(Err(e))) => return DisconnectReason::Transport(e.to_string()),
                Step::Ready(None) => {
                    tracing::info!("WebSocket stream ended");
                    return DisconnectReason::Closed;
                }
            }
        }
    }

    /// Apply a caller command to the core. Returns a command to write, if any.
    fn apply(&mut self, command: SessionCommand) -> Option<Command> {
        match command {
            SessionCommand::Subscribe(channels) => self.core.subscribe(&channels),
            SessionCommand::Unsubscribe(channels) => self.core.unsubscribe(&channels),
            SessionCommand::Subscriptions(reply) => {
                // The caller may have timed out and gone away.
                let _ = reply.send(self.core.subscriptions().as_set().clone());
                None
            }
        }
    }

    fn serve_offline(&mut self, command: SessionCommand) {
        if let Some(dropped) = self.apply(command) {
            tracing::debug!(
                action = dropped.action.as_str(),
                channels = ?dropped.channels(),
                "No open transport; command not sent"
            );
        }
    }
}

/// Encode and write one command.
async fn send_command<W>(write: &mut W, command: &Command) -> Result<(), TransportError>
where
    W: SinkExt<Message> + Unpin,
    W::Error: Display,
{
    let json = JsonCodec::new().encode(command)?;

    tracing::debug!(
        action = command.action.as_str(),
        channels = ?command.channels(),
        "Sending command"
    );

    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| TransportError::Send(e.to_string()))
}

fn close_reason(frame: Option<CloseFrame>) -> DisconnectReason {
    match frame {
        Some(frame) if !frame.reason.is_empty() => DisconnectReason::Remote {
            code: u16::from(frame.code),
            reason: frame.reason.to_string(),
        },
        _ => DisconnectReason::Closed,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::HandlerReply;
    use crate::domain::streaming::MarketEvent;

    struct Noop;

    #[async_trait]
    impl StreamHandler for Noop {
        type State = ();

        async fn on_message(&mut self, _: MarketEvent, _: &()) -> HandlerReply<()> {
            HandlerReply::Keep
        }

        async fn on_connect(&mut self, _: &()) -> HandlerReply<()> {
            HandlerReply::Keep
        }

        async fn on_disconnect(&mut self, _: &DisconnectReason, _: &()) -> HandlerReply<()> {
            HandlerReply::Keep
        }
    }

    #[test]
    fn missing_handler_is_a_config_error() {
        let result = StreamSession::builder::<Noop>("key").spawn();
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::MissingHandler))
        ));
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let result = StreamSession::builder("").handler(Noop).spawn();
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::EmptyValue(_)))
        ));
    }

    #[test]
    fn endpoint_selection() {
        let builder = StreamSession::builder::<Noop>("key");
        assert_eq!(builder.endpoint(), REALTIME_STREAM_URL);

        let builder = builder.delayed(true);
        assert_eq!(builder.endpoint(), DELAYED_STREAM_URL);

        let builder = builder.url("ws://127.0.0.1:1");
        assert_eq!(builder.endpoint(), "ws://127.0.0.1:1");
    }

    #[test]
    fn from_config_applies_stream_settings() {
        let mut config = ClientConfig::new(ApiKey::new("key").unwrap());
        config.stream.delayed = true;
        let builder = StreamSession::from_config::<Noop>(&config);
        assert_eq!(builder.endpoint(), DELAYED_STREAM_URL);

        config.stream.url = Some("ws://localhost:9".to_string());
        let builder = StreamSession::from_config::<Noop>(&config);
        assert_eq!(builder.endpoint(), "ws://localhost:9");
    }

    #[test]
    fn close_reason_mapping() {
        assert_eq!(close_reason(None), DisconnectReason::Closed);
        let frame = CloseFrame {
            code: 1008.into(),
            reason: "policy violation".to_string().into(),
        };
        assert_eq!(
            close_reason(Some(frame)),
            DisconnectReason::Remote {
                code: 1008,
                reason: "policy violation".to_string()
            }
        );
    }

    #[tokio::test]
    async fn handle_reports_closed_after_shutdown() {
        let handle = StreamSession::builder("key")
            .handler(Noop)
            .url("ws://127.0.0.1:9")
            .reconnect(ReconnectConfig {
                initial_delay: Duration::from_secs(60),
                ..ReconnectConfig::default()
            })
            .spawn()
            .unwrap();

        handle.close();
        // Cancellation is observed between steps, so this settles quickly.
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(matches!(
            handle.subscribe("AM.AAPL"),
            Err(SessionError::Closed)
        ));
        assert!(matches!(
            handle.subscriptions().await,
            Err(SessionError::Closed)
        ));
        handle.closed().await;
    }

    #[tokio::test]
    async fn queries_are_served_while_offline() {
        let handle = StreamSession::builder("key")
            .handler(Noop)
            .url("ws://127.0.0.1:9")
            .reconnect(ReconnectConfig {
                initial_delay: Duration::from_secs(60),
                ..ReconnectConfig::default()
            })
            .spawn()
            .unwrap();

        handle.subscribe(["AM.AAPL"]).unwrap();
        handle.unsubscribe("AM.AAPL").unwrap();
        assert!(handle.subscriptions().await.unwrap().is_empty());

        handle.close();
        handle.closed().await;
    }
}
