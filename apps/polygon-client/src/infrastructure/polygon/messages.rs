//! Outbound Socket Commands
//!
//! Every command the client sends has the same shape:
//!
//! ```json
//! {"action":"auth","params":"<api key>"}
//! {"action":"subscribe","params":"AM.AAPL,T.MSFT"}
//! {"action":"unsubscribe","params":"AM.AAPL"}
//! ```
//!
//! Channel lists are comma-joined in the order given.

use serde::{Deserialize, Serialize};

use crate::infrastructure::config::ApiKey;

/// Separator between channels in a command's `params`.
pub const CHANNEL_SEPARATOR: &str = ",";

/// Command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Present the API key.
    Auth,
    /// Start receiving channels.
    Subscribe,
    /// Stop receiving channels.
    Unsubscribe,
}

impl Action {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

/// A command frame.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Verb.
    pub action: Action,
    /// API key or comma-joined channel list.
    pub params: String,
}

impl Command {
    /// Authentication command carrying the key.
    #[must_use]
    pub fn auth(api_key: &ApiKey) -> Self {
        Self {
            action: Action::Auth,
            params: api_key.expose().to_string(),
        }
    }

    /// Subscribe to the given channels.
    #[must_use]
    pub fn subscribe(channels: &[String]) -> Self {
        Self {
            action: Action::Subscribe,
            params: channels.join(CHANNEL_SEPARATOR),
        }
    }

    /// Unsubscribe from the given channels.
    #[must_use]
    pub fn unsubscribe(channels: &[String]) -> Self {
        Self {
            action: Action::Unsubscribe,
            params: channels.join(CHANNEL_SEPARATOR),
        }
    }

    /// Channels carried by a subscribe/unsubscribe command.
    #[must_use]
    pub fn channels(&self) -> Vec<&str> {
        match self.action {
            Action::Auth => Vec::new(),
            Action::Subscribe | Action::Unsubscribe => self
                .params
                .split(CHANNEL_SEPARATOR)
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: &str = match self.action {
            Action::Auth => "[REDACTED]",
            Action::Subscribe | Action::Unsubscribe => &self.params,
        };
        f.debug_struct("Command")
            .field("action", &self.action)
            .field("params", &params)
            .finish()
    }
}
