//! Stream Handler Port (Driver Port)
//!
//! The capability a caller supplies to a streaming session. The session
//! invokes it for lifecycle changes and market data, threading a
//! caller-owned state value through every call.
//!
//! Each callback sees the current state by reference and answers with a
//! [`HandlerReply`]: `Update` replaces the stored state, `Keep` leaves it
//! as it was. The session never looks inside the state.

use async_trait::async_trait;

use crate::domain::streaming::{DisconnectReason, MarketEvent};

/// What a handler callback wants done with the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerReply<S> {
    /// Replace the stored state.
    Update(S),
    /// Retain the prior state.
    Keep,
}

impl<S> HandlerReply<S> {
    /// Apply the reply to the stored state.
    pub fn apply(self, state: &mut S) {
        if let Self::Update(next) = self {
            *state = next;
        }
    }

    /// Whether the reply carries a new state.
    #[must_use]
    pub const fn is_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }
}

impl<S> From<Option<S>> for HandlerReply<S> {
    fn from(value: Option<S>) -> Self {
        value.map_or(Self::Keep, Self::Update)
    }
}

/// Callbacks a streaming session drives.
///
/// All three are required; a session cannot be built without a handler.
/// Callbacks run on the session task one at a time, so a slow callback
/// delays the next frame but never races another callback.
#[async_trait]
pub trait StreamHandler: Send + 'static {
    /// Caller-owned state threaded through every callback.
    type State: Default + Send + Sync + 'static;

    /// A market data event arrived.
    async fn on_message(
        &mut self,
        event: MarketEvent,
        state: &Self::State,
    ) -> HandlerReply<Self::State>;

    /// The server accepted the credential.
    async fn on_connect(&mut self, state: &Self::State) -> HandlerReply<Self::State>;

    /// The transport went away.
    async fn on_disconnect(
        &mut self,
        reason: &DisconnectReason,
        state: &Self::State,
    ) -> HandlerReply<Self::State>;
}
