//! Session Core
//!
//! Transport-free state machine for one streaming session: connection
//! state, desired subscriptions, and handler state threading. The session
//! actor feeds it transport events and caller commands, and writes back
//! whatever commands it returns.
//!
//! Keeping this separate from the socket loop means every rule about
//! subscriptions and handler invocation is testable without a server.

use uuid::Uuid;

use crate::application::ports::StreamHandler;
use crate::domain::streaming::{ConnectionState, DisconnectReason, InboundEvent};
use crate::domain::subscription::SubscriptionSet;
use crate::infrastructure::config::ApiKey;
use crate::infrastructure::metrics;

use super::auth::AuthHandler;
use super::codec::JsonCodec;
use super::messages::Command;

/// Session state owned by the actor task.
pub struct SessionCore<H: StreamHandler> {
    auth: AuthHandler,
    codec: JsonCodec,
    handler: H,
    state: H::State,
    subscriptions: SubscriptionSet,
    restore_subscriptions: bool,
    session_id: Uuid,
}

impl<H: StreamHandler> SessionCore<H> {
    /// Create a disconnected core.
    pub fn new(api_key: ApiKey, handler: H, state: H::State, restore_subscriptions: bool) -> Self {
        Self {
            auth: AuthHandler::new(api_key),
            codec: JsonCodec::new(),
            handler,
            state,
            subscriptions: SubscriptionSet::new(),
            restore_subscriptions,
            session_id: Uuid::nil(),
        }
    }

    /// Tag metrics with the owning session's id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    /// Id used to label this session's metrics.
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Current connection state.
    pub const fn connection_state(&self) -> ConnectionState {
        self.auth.state()
    }

    /// Whether the server has accepted the key on the current transport.
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Current handler state.
    pub const fn state(&self) -> &H::State {
        &self.state
    }

    /// Desired subscriptions.
    pub const fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    // =========================================================================
    // Transport events
    // =========================================================================

    /// A connect attempt is starting.
    pub const fn on_connecting(&mut self) {
        self.auth.on_connecting();
    }

    /// The transport opened. Returns the `auth` command, which must be the
    /// first frame written.
    pub fn on_transport_connected(&mut self) -> Command {
        self.auth.on_transport_connected()
    }

    /// Process one inbound text frame. Returns commands to write, in order.
    ///
    /// A frame that does not decode is dropped and changes nothing.
    pub async fn on_frame(&mut self, text: &str) -> Vec<Command> {
        metrics::record_frame();

        let events = match self.codec.decode(text) {
            Ok(events) => events,
            Err(e) => {
                metrics::record_frame_dropped();
                tracing::trace!(error = %e, "Dropping undecodable frame");
                return Vec::new();
            }
        };

        let mut outbound = Vec::new();
        for event in events {
            metrics::record_event(&event);
            self.on_event(event, &mut outbound).await;
        }
        outbound
    }

    async fn on_event(&mut self, event: InboundEvent, outbound: &mut Vec<Command>) {
        match event {
            InboundEvent::ConnectionStatus { message } => {
                tracing::debug!(message = ?message, "Stream connection acknowledged");
            }
            InboundEvent::AuthSuccess { message } => {
                self.auth.on_auth_success();
                tracing::info!(message = ?message, "Stream authenticated");

                let reply = self.handler.on_connect(&self.state).await;
                reply.apply(&mut self.state);

                if self.restore_subscriptions && !self.subscriptions.is_empty() {
                    let channels = self.subscriptions.to_sorted_vec();
                    tracing::info!(count = channels.len(), "Restoring subscriptions");
                    outbound.push(Command::subscribe(&channels));
                }
            }
            InboundEvent::Status { status, message } => {
                tracing::warn!(status = %status, message = ?message, "Stream status");
            }
            InboundEvent::MarketData(event) => {
                let reply = self.handler.on_message(event, &self.state).await;
                reply.apply(&mut self.state);
            }
        }
    }

    /// The transport went away (or never came up).
    ///
    /// The handler hears about it only if a connection was in progress or
    /// open. Desired subscriptions survive.
    pub async fn on_transport_disconnected(&mut self, reason: &DisconnectReason) {
        let previous = self.auth.state();
        self.auth.reset();

        if previous == ConnectionState::Disconnected {
            return;
        }

        match reason {
            DisconnectReason::Shutdown => {
                tracing::info!(state = previous.as_str(), "Stream shut down");
            }
            _ => {
                tracing::warn!(state = previous.as_str(), reason = %reason, "Stream disconnected");
            }
        }

        let reply = self.handler.on_disconnect(reason, &self.state).await;
        reply.apply(&mut self.state);
    }

    // =========================================================================
    // Caller commands
    // =========================================================================

    /// Subscribe while authenticated: record the channels and return the
    /// command. Unauthenticated calls change nothing.
    pub fn subscribe(&mut self, channels: &[String]) -> Option<Command> {
        if channels.is_empty() {
            return None;
        }
        if !self.is_authenticated() {
            tracing::debug!(channels = ?channels, "Not authenticated; ignoring subscribe");
            return None;
        }

        self.subscriptions.insert_all(channels);
        metrics::set_subscriptions(self.session_id, self.subscriptions.len());
        Some(Command::subscribe(channels))
    }

    /// Remove the channels and return the unsubscribe command regardless
    /// of connection state.
    pub fn unsubscribe(&mut self, channels: &[String]) -> Option<Command> {
        if channels.is_empty() {
            return None;
        }

        self.subscriptions.remove_all(channels);
        metrics::set_subscriptions(self.session_id, self.subscriptions.len());
        Some(Command::unsubscribe(channels))
    }
}

impl<H: StreamHandler> std::fmt::Debug for SessionCore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCore")
            .field("state", &self.auth.state())
            .field("subscriptions", &self.subscriptions.len())
            .field("restore_subscriptions", &self.restore_subscriptions)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
