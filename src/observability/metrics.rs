use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub feed_events_total: IntCounterVec,
    pub approval_notifications_total: IntCounter,
    pub auth_checks_total: IntCounterVec,
    pub ws_clients: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let feed_events_total = IntCounterVec::new(
            Opts::new("feed_events_total", "Live feed changes by feed and kind"),
            &["feed", "change"],
        )
        .expect("valid feed_events_total metric");

        let approval_notifications_total = IntCounter::new(
            "approval_notifications_total",
            "Approval notifications shown to operators",
        )
        .expect("valid approval_notifications_total metric");

        let auth_checks_total = IntCounterVec::new(
            Opts::new("auth_checks_total", "Authorization checks by outcome"),
            &["outcome"],
        )
        .expect("valid auth_checks_total metric");

        let ws_clients = IntGauge::new("ws_clients", "Connected dashboard websocket clients")
            .expect("valid ws_clients metric");

        registry
            .register(Box::new(feed_events_total.clone()))
            .expect("register feed_events_total");
        registry
            .register(Box::new(approval_notifications_total.clone()))
            .expect("register approval_notifications_total");
        registry
            .register(Box::new(auth_checks_total.clone()))
            .expect("register auth_checks_total");
        registry
            .register(Box::new(ws_clients.clone()))
            .expect("register ws_clients");

        Self {
            registry,
            feed_events_total,
            approval_notifications_total,
            auth_checks_total,
            ws_clients,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
