//! Prometheus Metrics Module
//!
//! Streaming sessions record through the `metrics` facade unconditionally;
//! without an installed recorder the calls are no-ops. The binary installs
//! a Prometheus exporter with [`init_metrics`].
//!
//! # Metrics
//!
//! - `polygon_stream_frames_total`: text frames received
//! - `polygon_stream_frames_dropped_total`: frames that failed to decode
//! - `polygon_stream_events_total{kind}`: classified inbound events
//! - `polygon_stream_reconnects_total`: reconnection attempts
//! - `polygon_stream_subscriptions{session_id}`: size of each session's
//!   desired subscription set

use std::net::{Ipv4Addr, SocketAddrV4};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use uuid::Uuid;

use crate::domain::streaming::InboundEvent;

const FRAMES_TOTAL: &str = "polygon_stream_frames_total";
const FRAMES_DROPPED_TOTAL: &str = "polygon_stream_frames_dropped_total";
const EVENTS_TOTAL: &str = "polygon_stream_events_total";
const RECONNECTS_TOTAL: &str = "polygon_stream_reconnects_total";
const SUBSCRIPTIONS: &str = "polygon_stream_subscriptions";

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be bound.
pub fn init_metrics(port: u16) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
        .install()?;

    register_metrics();
    Ok(())
}

fn register_metrics() {
    describe_counter!(FRAMES_TOTAL, "Total text frames received from the feed");
    describe_counter!(
        FRAMES_DROPPED_TOTAL,
        "Total frames dropped because they were not valid JSON frames"
    );
    describe_counter!(EVENTS_TOTAL, "Total inbound events by kind");
    describe_counter!(RECONNECTS_TOTAL, "Total WebSocket reconnection attempts");
    describe_gauge!(SUBSCRIPTIONS, "Channels in the desired subscription set");
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a text frame received.
pub fn record_frame() {
    counter!(FRAMES_TOTAL).increment(1);
}

/// Record a frame dropped by the decoder.
pub fn record_frame_dropped() {
    counter!(FRAMES_DROPPED_TOTAL).increment(1);
}

/// Record one classified event.
pub fn record_event(event: &InboundEvent) {
    counter!(EVENTS_TOTAL, "kind" => event.kind()).increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect() {
    counter!(RECONNECTS_TOTAL).increment(1);
}

/// Update one session's desired subscription count.
#[allow(clippy::cast_precision_loss)]
pub fn set_subscriptions(session_id: Uuid, count: usize) {
    gauge!(SUBSCRIPTIONS, "session_id" => session_id.to_string()).set(count as f64);
}
