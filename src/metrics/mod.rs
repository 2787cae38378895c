//! Prometheus metrics for the relay.
//!
//! - Webhooks received per host
//! - Webhook dispatch outcomes per host
//! - Per-destination delivery results (relayed messages and unknown-host notices)
//! - Dispatch latency

mod helpers;

pub use helpers::{encode_metrics, DeliveryMetrics, DispatchMetrics, WebhookMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "relay";

lazy_static! {
    /// Parsed webhook bodies by host; unresolved names share the `unknown` label
    pub static ref WEBHOOKS_RECEIVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_webhooks_received_total", METRIC_PREFIX),
        "Total webhooks received with a valid body",
        &["host"]
    ).unwrap();

    /// Dispatch calls by host and outcome (sent, unknown_host, delivery_failed)
    pub static ref DISPATCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_total", METRIC_PREFIX),
        "Total webhook dispatch calls by outcome",
        &["host", "outcome"]
    ).unwrap();

    /// Individual chat deliveries by message kind and result
    pub static ref DELIVERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_deliveries_total", METRIC_PREFIX),
        "Total per-chat delivery attempts",
        &["kind", "result"]
    ).unwrap();

    /// Time spent in a dispatch call, including every delivery
    pub static ref DISPATCH_DURATION: Histogram = register_histogram!(
        format!("{}_dispatch_duration_seconds", METRIC_PREFIX),
        "Webhook dispatch duration in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();
}
