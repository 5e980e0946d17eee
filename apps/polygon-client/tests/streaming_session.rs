//! End-to-end streaming session tests against a local WebSocket server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use polygon_client::{
    DisconnectReason, HandlerReply, MarketEvent, ReconnectConfig, SessionHandle, StreamHandler,
    StreamSession,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

const WAIT: Duration = Duration::from_secs(5);

const CONNECTED: &str = r#"[{"ev":"status","status":"connected","message":"Connected Successfully"}]"#;
const AUTH_SUCCESS: &str = r#"[{"ev":"status","status":"auth_success","message":"authenticated"}]"#;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, PartialEq)]
enum Seen {
    Connect,
    Message(String),
    Disconnect(DisconnectReason),
}

/// Forwards every callback to the test; the state counts messages.
struct Forwarder {
    seen: mpsc::UnboundedSender<Seen>,
}

#[async_trait]
impl StreamHandler for Forwarder {
    type State = u32;

    async fn on_message(&mut self, event: MarketEvent, count: &u32) -> HandlerReply<u32> {
        let symbol = event.symbol().unwrap_or_default().to_string();
        let _ = self.seen.send(Seen::Message(symbol));
        HandlerReply::Update(count + 1)
    }

    async fn on_connect(&mut self, _count: &u32) -> HandlerReply<u32> {
        let _ = self.seen.send(Seen::Connect);
        HandlerReply::Keep
    }

    async fn on_disconnect(&mut self, reason: &DisconnectReason, _count: &u32) -> HandlerReply<u32> {
        let _ = self.seen.send(Seen::Disconnect(reason.clone()));
        HandlerReply::Keep
    }
}

struct Harness {
    listener: TcpListener,
    handle: SessionHandle,
    seen: mpsc::UnboundedReceiver<Seen>,
}

async fn start(initial_delay: Duration, restore: bool) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (tx, seen) = mpsc::unbounded_channel();

    let reconnect = ReconnectConfig {
        initial_delay,
        max_delay: initial_delay,
        ..ReconnectConfig::default()
    }
    .without_jitter();

    let handle = StreamSession::builder("test-key")
        .handler(Forwarder { seen: tx })
        .url(url)
        .reconnect(reconnect)
        .restore_subscriptions(restore)
        .spawn()
        .unwrap();

    Harness {
        listener,
        handle,
        seen,
    }
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = tokio::time::timeout(WAIT, listener.accept())
        .await
        .expect("client did not connect")
        .unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn next_text(server: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        let message = tokio::time::timeout(WAIT, server.next())
            .await
            .expect("no frame from client")
            .expect("client stream ended")
            .unwrap();
        if let Message::Text(text) = message {
            return text.to_string();
        }
    }
}

async fn send(server: &mut WebSocketStream<TcpStream>, text: &str) {
    server.send(Message::Text(text.into())).await.unwrap();
}

async fn next_seen(seen: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(WAIT, seen.recv())
        .await
        .expect("handler was not invoked")
        .expect("handler dropped")
}

/// Accept, check the auth command and authenticate.
async fn handshake(harness: &mut Harness) -> WebSocketStream<TcpStream> {
    let mut server = accept(&harness.listener).await;
    send(&mut server, CONNECTED).await;
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"auth","params":"test-key"}"#
    );
    send(&mut server, AUTH_SUCCESS).await;
    assert_eq!(next_seen(&mut harness.seen).await, Seen::Connect);
    assert_no_callback(&mut harness.seen).await;
    server
}

/// Give the session a moment, then check no further callback is queued.
async fn assert_no_callback(seen: &mut mpsc::UnboundedReceiver<Seen>) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Ok(extra) = seen.try_recv() {
        panic!("unexpected callback: {extra:?}");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn authenticates_subscribes_and_delivers_batches_in_order() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = handshake(&mut harness).await;

    harness.handle.subscribe(["T.AAPL", "T.MSFT"]).unwrap();
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"subscribe","params":"T.AAPL,T.MSFT"}"#
    );

    send(
        &mut server,
        r#"[{"ev":"T","sym":"AAPL","p":189.5,"s":100,"t":1700000000000},{"ev":"T","sym":"MSFT","p":370.1,"s":5,"t":1700000000001}]"#,
    )
    .await;
    assert_eq!(next_seen(&mut harness.seen).await, Seen::Message("AAPL".into()));
    assert_eq!(next_seen(&mut harness.seen).await, Seen::Message("MSFT".into()));

    let subscriptions = harness.handle.subscriptions().await.unwrap();
    assert_eq!(subscriptions.len(), 2);
    assert!(subscriptions.contains("T.AAPL"));

    harness.handle.close();
    tokio::time::timeout(WAIT, harness.handle.closed()).await.unwrap();
}

#[tokio::test]
async fn unsubscribe_sends_command_and_shrinks_set() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = handshake(&mut harness).await;

    harness.handle.subscribe(vec!["Q.AAPL", "Q.MSFT"]).unwrap();
    next_text(&mut server).await;
    harness.handle.unsubscribe("Q.AAPL").unwrap();
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"unsubscribe","params":"Q.AAPL"}"#
    );

    let subscriptions = harness.handle.subscriptions().await.unwrap();
    assert_eq!(subscriptions.into_iter().collect::<Vec<_>>(), vec!["Q.MSFT".to_string()]);
}

#[tokio::test]
async fn subscribe_before_auth_is_ignored() {
    let harness = start(Duration::from_secs(30), false).await;
    let mut server = accept(&harness.listener).await;
    next_text(&mut server).await;

    harness.handle.subscribe("AM.*").unwrap();
    assert!(harness.handle.subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn unsubscribe_before_auth_still_goes_on_the_wire() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = accept(&harness.listener).await;
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"auth","params":"test-key"}"#
    );

    harness.handle.unsubscribe(["T.AAPL", "T.MSFT"]).unwrap();
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"unsubscribe","params":"T.AAPL,T.MSFT"}"#
    );

    // Exactly one command: the next frame is the subscribe sent after auth.
    send(&mut server, AUTH_SUCCESS).await;
    assert_eq!(next_seen(&mut harness.seen).await, Seen::Connect);
    harness.handle.subscribe("T.AAPL").unwrap();
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"subscribe","params":"T.AAPL"}"#
    );
}

#[tokio::test]
async fn auth_failure_does_not_connect() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = accept(&harness.listener).await;
    next_text(&mut server).await;

    send(
        &mut server,
        r#"{"ev":"status","status":"auth_failed","message":"authentication failed"}"#,
    )
    .await;
    send(&mut server, r#"{"ev":"T","sym":"AAPL"}"#).await;

    // Market data still reaches the handler, but on_connect never fired.
    assert_eq!(next_seen(&mut harness.seen).await, Seen::Message("AAPL".into()));
    harness.handle.subscribe("T.AAPL").unwrap();
    assert!(harness.handle.subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_frames_are_dropped() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = handshake(&mut harness).await;

    send(&mut server, "not json").await;
    send(&mut server, "42").await;
    send(&mut server, r#"[7,{"ev":"A","sym":"TSLA"}]"#).await;

    assert_eq!(next_seen(&mut harness.seen).await, Seen::Message("TSLA".into()));
}

#[tokio::test]
async fn server_close_reports_reason_and_keeps_subscriptions() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = handshake(&mut harness).await;

    harness.handle.subscribe("AM.SPY").unwrap();
    next_text(&mut server).await;

    server
        .close(Some(CloseFrame {
            code: CloseCode::Policy,
            reason: "too many connections".into(),
        }))
        .await
        .unwrap();

    assert_eq!(
        next_seen(&mut harness.seen).await,
        Seen::Disconnect(DisconnectReason::Remote {
            code: 1008,
            reason: "too many connections".to_string(),
        })
    );

    // Served while waiting out the backoff.
    let subscriptions = harness.handle.subscriptions().await.unwrap();
    assert!(subscriptions.contains("AM.SPY"));

    harness.handle.close();
    tokio::time::timeout(WAIT, harness.handle.closed()).await.unwrap();
}

#[tokio::test]
async fn reconnect_restores_desired_subscriptions() {
    let mut harness = start(Duration::from_millis(20), true).await;
    let mut server = handshake(&mut harness).await;

    harness.handle.subscribe(["T.MSFT", "T.AAPL"]).unwrap();
    next_text(&mut server).await;
    drop(server);

    assert!(matches!(
        next_seen(&mut harness.seen).await,
        Seen::Disconnect(_)
    ));

    let mut server = handshake(&mut harness).await;
    assert_eq!(
        next_text(&mut server).await,
        r#"{"action":"subscribe","params":"T.AAPL,T.MSFT"}"#
    );
}

#[tokio::test]
async fn close_sends_close_frame_and_reports_shutdown() {
    let mut harness = start(Duration::from_secs(30), false).await;
    let mut server = handshake(&mut harness).await;

    harness.handle.close();

    let frame = tokio::time::timeout(WAIT, server.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(frame.is_close());
    assert_eq!(
        next_seen(&mut harness.seen).await,
        Seen::Disconnect(DisconnectReason::Shutdown)
    );

    tokio::time::timeout(WAIT, harness.handle.closed()).await.unwrap();
}
