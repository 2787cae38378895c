//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, HistogramTimer, TextEncoder};

use super::{DELIVERIES_TOTAL, DISPATCH_DURATION, DISPATCH_TOTAL, WEBHOOKS_RECEIVED_TOTAL};

/// Host label used for names that did not resolve, to keep label cardinality bounded
const UNKNOWN_HOST_LABEL: &str = "unknown";

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording ingress metrics
pub struct WebhookMetrics;

impl WebhookMetrics {
    /// Count a parsed webhook; `host` is `None` when the name did not resolve
    pub fn record_received(host: Option<&str>) {
        WEBHOOKS_RECEIVED_TOTAL
            .with_label_values(&[host.unwrap_or(UNKNOWN_HOST_LABEL)])
            .inc();
    }
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    /// Start timing a dispatch call; the duration is observed when the timer drops
    pub fn start_timer() -> HistogramTimer {
        DISPATCH_DURATION.start_timer()
    }

    pub fn record_sent(host: &str) {
        DISPATCH_TOTAL.with_label_values(&[host, "sent"]).inc();
    }

    pub fn record_delivery_failed(host: &str) {
        DISPATCH_TOTAL.with_label_values(&[host, "delivery_failed"]).inc();
    }

    pub fn record_unknown_host() {
        DISPATCH_TOTAL
            .with_label_values(&[UNKNOWN_HOST_LABEL, "unknown_host"])
            .inc();
    }
}

/// Helper struct for recording per-chat delivery metrics
pub struct DeliveryMetrics;

impl DeliveryMetrics {
    /// Record the results of one fan-out of a relayed message
    pub fn record_messages(delivered: u64, failed: u64) {
        DELIVERIES_TOTAL
            .with_label_values(&["message", "ok"])
            .inc_by(delivered);
        DELIVERIES_TOTAL
            .with_label_values(&["message", "error"])
            .inc_by(failed);
    }

    /// Record the results of one unknown-host notice fan-out
    pub fn record_notices(delivered: u64, failed: u64) {
        DELIVERIES_TOTAL
            .with_label_values(&["notice", "ok"])
            .inc_by(delivered);
        DELIVERIES_TOTAL
            .with_label_values(&["notice", "error"])
            .inc_by(failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_recorded_metrics() {
        DispatchMetrics::record_sent("metrics-test-host");
        DeliveryMetrics::record_messages(2, 1);

        let output = encode_metrics().unwrap();
        assert!(output.contains("relay_dispatch_total"));
        assert!(output.contains("metrics-test-host"));
        assert!(output.contains("relay_deliveries_total"));
    }

    #[test]
    fn test_received_unresolved_host_uses_unknown_label() {
        WebhookMetrics::record_received(None);
        WebhookMetrics::record_received(Some("received-test-host"));

        assert!(
            WEBHOOKS_RECEIVED_TOTAL
                .with_label_values(&["unknown"])
                .get()
                >= 1
        );
        assert_eq!(
            WEBHOOKS_RECEIVED_TOTAL
                .with_label_values(&["received-test-host"])
                .get(),
            1
        );
    }
}
