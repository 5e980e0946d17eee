//! Socket Feed Adapter
//!
//! Streaming sessions against the realtime or delayed stocks feed:
//!
//! - **auth**: connection state machine and the `auth` command
//! - **codec**: JSON frames in, JSON commands out
//! - **core**: subscriptions and handler dispatch, transport-free
//! - **session**: the socket task and its caller handle

pub mod auth;
pub mod codec;
pub mod core;
pub mod messages;
pub mod reconnect;
pub mod session;

pub use auth::AuthHandler;
pub use codec::{CodecError, JsonCodec};
pub use self::core::SessionCore;
pub use messages::{Action, Command};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use session::{
    DEFAULT_QUERY_TIMEOUT, SessionBuilder, SessionError, SessionHandle, StreamSession,
};
