use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::delivery::DeliveryGateway;
use crate::hosts::{Host, HostRegistry};
use crate::metrics::{DeliveryMetrics, DispatchMetrics};
use crate::template::{render, Payload};

use super::types::{
    DeliveryFailure, DeliveryOutcome, DispatchError, DispatchReport, DispatcherStats,
    DispatcherStatsSnapshot,
};

/// Template key used when a host has no template for the message type
pub const DEFAULT_TEMPLATE_KEY: &str = "default";

/// Used when a host defines neither the message type nor a `default` template
pub const FALLBACK_TEMPLATE: &str = "📡 {{.host}}: {{.message}}";

/// Pick the template for a message type: exact match, then `default`, then the
/// built-in fallback. An empty `default` counts as missing.
pub fn select_template<'a>(host: &'a Host, message_type: &str) -> &'a str {
    if let Some(template) = host.template(message_type) {
        return template;
    }

    match host.template(DEFAULT_TEMPLATE_KEY) {
        Some(template) if !template.is_empty() => template,
        _ => FALLBACK_TEMPLATE,
    }
}

/// Notice broadcast when a webhook names a host that is not routable
pub fn unknown_host_notice(host_name: &str) -> String {
    format!("Unknown host: {}", host_name)
}

/// Routes webhook events to every configured chat
pub struct Dispatcher {
    registry: Arc<HostRegistry>,
    gateway: Arc<dyn DeliveryGateway>,
    stats: DispatcherStats,
}

impl Dispatcher {
    pub fn new(registry: Arc<HostRegistry>, gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self {
            registry,
            gateway,
            stats: DispatcherStats::default(),
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolve the host, render its template and send the text to every destination.
    ///
    /// Unknown or disabled hosts trigger a best-effort notice to all
    /// destinations and fail with [`DispatchError::UnknownHost`]. Delivery is
    /// attempted for every destination even after a failure; any failure makes
    /// the call fail with [`DispatchError::DeliveryFailed`].
    #[tracing::instrument(
        name = "dispatcher.dispatch",
        skip_all,
        fields(host = %host_name, message_type = %message_type)
    )]
    pub async fn dispatch(
        &self,
        host_name: &str,
        message_type: &str,
        payload: &Payload,
    ) -> Result<DispatchReport, DispatchError> {
        let _timer = DispatchMetrics::start_timer();
        self.stats.total_dispatched.fetch_add(1, Ordering::Relaxed);

        let Some(host) = self.registry.lookup_host(host_name) else {
            self.stats.unknown_host.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_unknown_host();
            self.notify_unknown_host(host_name).await;
            return Err(DispatchError::UnknownHost(host_name.to_string()));
        };

        let text = render(select_template(host, message_type), payload);
        let outcomes = self.deliver_all(&text).await;

        let attempted = outcomes.len();
        let failures: Vec<DeliveryFailure> = outcomes
            .into_iter()
            .filter_map(DeliveryOutcome::into_failure)
            .collect();
        let delivered = attempted - failures.len();

        self.stats
            .deliveries_succeeded
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.stats
            .deliveries_failed
            .fetch_add(failures.len() as u64, Ordering::Relaxed);
        DeliveryMetrics::record_messages(delivered as u64, failures.len() as u64);

        if !failures.is_empty() {
            self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            DispatchMetrics::record_delivery_failed(&host.name);
            return Err(DispatchError::DeliveryFailed {
                attempted,
                failures,
            });
        }

        self.stats.total_sent.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_sent(&host.name);

        tracing::debug!(delivered = delivered, "Relayed webhook message");

        Ok(DispatchReport {
            host: host.name.clone(),
            message_type: message_type.to_string(),
            text,
            delivered_to: delivered,
        })
    }

    /// Send `text` to every destination in order, one attempt each.
    ///
    /// Failures are logged here and returned to the caller, which decides
    /// whether they matter.
    pub async fn deliver_all(&self, text: &str) -> Vec<DeliveryOutcome> {
        self.fan_out(text, false).await
    }

    async fn fan_out(&self, text: &str, plain: bool) -> Vec<DeliveryOutcome> {
        let destinations = self.registry.destinations();
        let mut outcomes = Vec::with_capacity(destinations.len());

        for &chat_id in destinations {
            let result = if plain {
                self.gateway.deliver_plain(chat_id, text).await
            } else {
                self.gateway.deliver(chat_id, text).await
            };

            if let Err(ref e) = result {
                tracing::warn!(chat_id = chat_id, error = %e, "Failed to send message to chat");
            }

            outcomes.push(DeliveryOutcome { chat_id, result });
        }

        outcomes
    }

    async fn notify_unknown_host(&self, host_name: &str) {
        // Host names come from the request path and may break Markdown
        let outcomes = self.fan_out(&unknown_host_notice(host_name), true).await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let delivered = outcomes.len() - failed;
        DeliveryMetrics::record_notices(delivered as u64, failed as u64);

        tracing::debug!(
            host = %host_name,
            delivered = delivered,
            failed = failed,
            "Broadcast unknown host notice"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryError;
    use crate::hosts::ChatId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every delivery; fails for chats listed in `failing`
    #[derive(Default)]
    struct MockGateway {
        sent: Mutex<Vec<(ChatId, String)>>,
        failing: Vec<ChatId>,
    }

    impl MockGateway {
        fn failing(chats: &[ChatId]) -> Self {
            Self {
                failing: chats.to_vec(),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<(ChatId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeliveryGateway for MockGateway {
        async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            if self.failing.contains(&chat_id) {
                return Err(DeliveryError::Api {
                    status: 400,
                    description: format!("chat {} not found", chat_id),
                });
            }
            Ok(())
        }
    }

    fn ci_host() -> Host {
        Host::new("ci", true)
            .with_template("deploy", "🚀 {{.host}} deployed {{.version}}")
            .with_template("default", "📡 {{.host}}: {{.message}}")
    }

    fn dispatcher(gateway: Arc<MockGateway>) -> Dispatcher {
        let registry = HostRegistry::new(
            vec![
                ci_host(),
                Host::new("bare", true),
                Host::new("off", false).with_template("default", "never"),
            ],
            vec![111, 222],
        );
        Dispatcher::new(Arc::new(registry), gateway)
    }

    #[test]
    fn test_select_template_exact_match() {
        assert_eq!(
            select_template(&ci_host(), "deploy"),
            "🚀 {{.host}} deployed {{.version}}"
        );
    }

    #[test]
    fn test_select_template_default() {
        assert_eq!(
            select_template(&ci_host(), "unknown_type"),
            "📡 {{.host}}: {{.message}}"
        );
    }

    #[test]
    fn test_select_template_builtin_fallback() {
        assert_eq!(select_template(&Host::new("bare", true), "x"), FALLBACK_TEMPLATE);

        let empty_default = Host::new("h", true).with_template("default", "");
        assert_eq!(select_template(&empty_default, "x"), FALLBACK_TEMPLATE);
    }

    #[test]
    fn test_select_template_explicit_empty_type_template() {
        let host = Host::new("h", true)
            .with_template("ping", "")
            .with_template("default", "d");
        assert_eq!(select_template(&host, "ping"), "");
    }

    #[tokio::test]
    async fn test_dispatch_renders_and_fans_out() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = dispatcher(gateway.clone());

        let payload = Payload::new().with("host", "ci").with("version", "1.2.3");
        let report = dispatcher.dispatch("ci", "deploy", &payload).await.unwrap();

        assert_eq!(report.text, "🚀 ci deployed 1.2.3");
        assert_eq!(report.delivered_to, 2);
        assert_eq!(
            gateway.sent(),
            vec![
                (111, "🚀 ci deployed 1.2.3".to_string()),
                (222, "🚀 ci deployed 1.2.3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_to_default() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = dispatcher(gateway.clone());

        let payload = Payload::new().with("host", "ci").with("message", "hi");
        let report = dispatcher
            .dispatch("ci", "unknown_type", &payload)
            .await
            .unwrap();

        assert_eq!(report.text, "📡 ci: hi");
    }

    #[tokio::test]
    async fn test_dispatch_builtin_fallback() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = dispatcher(gateway.clone());

        let payload = Payload::new().with("host", "bare").with("message", "up");
        let report = dispatcher.dispatch("bare", "", &payload).await.unwrap();

        assert_eq!(report.text, "📡 bare: up");
    }

    #[tokio::test]
    async fn test_unknown_host_broadcasts_notice() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = dispatcher(gateway.clone());

        let err = dispatcher
            .dispatch("ghost", "deploy", &Payload::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownHost(ref h) if h == "ghost"));
        assert_eq!(
            gateway.sent(),
            vec![
                (111, "Unknown host: ghost".to_string()),
                (222, "Unknown host: ghost".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_disabled_host_is_unknown() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = dispatcher(gateway.clone());

        let err = dispatcher
            .dispatch("off", "default", &Payload::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownHost(_)));
        assert!(gateway.sent().iter().all(|(_, text)| text == "Unknown host: off"));
    }

    #[tokio::test]
    async fn test_unknown_host_notice_failures_are_swallowed() {
        let gateway = Arc::new(MockGateway::failing(&[111, 222]));
        let dispatcher = dispatcher(gateway.clone());

        let err = dispatcher
            .dispatch("ghost", "deploy", &Payload::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownHost(_)));
        assert_eq!(gateway.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_delivery_continues_after_failure() {
        let gateway = Arc::new(MockGateway::failing(&[111]));
        let dispatcher = dispatcher(gateway.clone());

        let payload = Payload::new().with("host", "ci").with("message", "hi");
        let err = dispatcher.dispatch("ci", "x", &payload).await.unwrap_err();

        // 222 still received the message
        assert_eq!(gateway.sent().len(), 2);
        assert_eq!(gateway.sent()[1], (222, "📡 ci: hi".to_string()));

        match &err {
            DispatchError::DeliveryFailed {
                attempted,
                failures,
            } => {
                assert_eq!(*attempted, 2);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].chat_id, 111);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.last_failure().map(|f| f.chat_id), Some(111));
    }

    #[tokio::test]
    async fn test_all_failures_are_collected() {
        let gateway = Arc::new(MockGateway::failing(&[111, 222]));
        let dispatcher = dispatcher(gateway.clone());

        let err = dispatcher
            .dispatch("ci", "deploy", &Payload::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to deliver to 2 of 2 destinations");
        assert_eq!(err.last_failure().map(|f| f.chat_id), Some(222));
    }

    #[tokio::test]
    async fn test_deliver_all_reports_each_destination() {
        let gateway = Arc::new(MockGateway::failing(&[222]));
        let dispatcher = dispatcher(gateway);

        let outcomes = dispatcher.deliver_all("text").await;
        let results: Vec<(ChatId, bool)> = outcomes
            .iter()
            .map(|o| (o.chat_id, o.is_success()))
            .collect();

        assert_eq!(results, vec![(111, true), (222, false)]);
    }

    #[tokio::test]
    async fn test_no_destinations_is_success() {
        let registry = HostRegistry::new(vec![ci_host()], vec![]);
        let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(MockGateway::default()));

        let report = dispatcher
            .dispatch("ci", "deploy", &Payload::new())
            .await
            .unwrap();
        assert_eq!(report.delivered_to, 0);
    }

    #[tokio::test]
    async fn test_stats_tracking() {
        let gateway = Arc::new(MockGateway::failing(&[222]));
        let dispatcher = dispatcher(gateway);

        let _ = dispatcher.dispatch("ci", "deploy", &Payload::new()).await;
        let _ = dispatcher.dispatch("ghost", "deploy", &Payload::new()).await;

        let stats = dispatcher.stats();
        assert_eq!(stats.total_dispatched, 2);
        assert_eq!(stats.unknown_host, 1);
        assert_eq!(stats.total_sent, 0);
        assert_eq!(stats.total_failed, 1);
        assert_eq!(stats.deliveries_succeeded, 1);
        assert_eq!(stats.deliveries_failed, 1);
    }
}
