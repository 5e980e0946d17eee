//! Socket Authentication
//!
//! The feed expects the API key as the first command on a new transport.
//!
//! # Authentication Flow
//!
//! 1. Connect to the WebSocket endpoint
//! 2. Send `{"action":"auth","params":"<api key>"}` right away
//! 3. Receive `{"ev":"status","status":"connected"}` (informational)
//! 4. Receive `{"ev":"status","status":"auth_success"}` or another status
//!    such as `auth_failed`
//!
//! The server may deliver steps 3 and 4 in either order relative to the
//! client's command; only `auth_success` moves the state forward.

use crate::domain::streaming::ConnectionState;
use crate::infrastructure::config::ApiKey;

use super::messages::Command;

/// Tracks the connection state machine for one session.
///
/// `Disconnected -> Connecting -> ConnectedUnauthenticated -> Authenticated`,
/// with every state returning to `Disconnected` when the transport goes away.
#[derive(Debug)]
pub struct AuthHandler {
    api_key: ApiKey,
    state: ConnectionState,
}

impl AuthHandler {
    /// Create a handler in the `Disconnected` state.
    #[must_use]
    pub const fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if currently authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// A transport connect attempt is starting.
    pub const fn on_connecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// The transport is open. Returns the `auth` command to send first.
    #[must_use]
    pub fn on_transport_connected(&mut self) -> Command {
        self.state = ConnectionState::ConnectedUnauthenticated;
        Command::auth(&self.api_key)
    }

    /// The server accepted the key.
    pub const fn on_auth_success(&mut self) {
        self.state = ConnectionState::Authenticated;
    }

    /// Reset to disconnected state (e.g., after connection close).
    pub const fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::polygon::messages::Action;

    fn handler() -> AuthHandler {
        AuthHandler::new(ApiKey::new("key").unwrap())
    }

    #[test]
    fn full_handshake() {
        let mut auth = handler();
        assert_eq!(auth.state(), ConnectionState::Disconnected);

        auth.on_connecting();
        assert_eq!(auth.state(), ConnectionState::Connecting);

        let cmd = auth.on_transport_connected();
        assert_eq!(cmd.action, Action::Auth);
        assert_eq!(cmd.params, "key");
        assert_eq!(auth.state(), ConnectionState::ConnectedUnauthenticated);
        assert!(!auth.is_authenticated());

        auth.on_auth_success();
        assert!(auth.is_authenticated());
    }

    #[test]
    fn reset_from_any_state() {
        let mut auth = handler();
        auth.on_connecting();
        let _ = auth.on_transport_connected();
        auth.on_auth_success();

        auth.reset();
        assert_eq!(auth.state(), ConnectionState::Disconnected);
        assert!(!auth.is_authenticated());
    }
}
