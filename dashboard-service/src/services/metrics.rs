use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static DASHBOARD_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static UPSTREAM_FETCH_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the Prometheus recorder and register service counters.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_none() {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
        }
    }

    if PROMETHEUS_REGISTRY.get().is_some() {
        return;
    }

    let registry = Registry::new();

    // Dashboard requests by authorization outcome
    if let Some(counter) = register_counter(
        &registry,
        "dashboard_requests_total",
        "Dashboard requests by authorization status",
        &["status"],
    ) {
        let _ = DASHBOARD_REQUESTS_TOTAL.set(counter);
    }

    // Upstream list/fetch failures by Stripe resource
    if let Some(counter) = register_counter(
        &registry,
        "upstream_fetch_failures_total",
        "Failed payment platform fetches by resource",
        &["resource"],
    ) {
        let _ = UPSTREAM_FETCH_FAILURES_TOTAL.set(counter);
    }

    let _ = PROMETHEUS_REGISTRY.set(registry);
}

fn register_counter(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Option<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .and_then(|counter| {
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        });

    match counter {
        Ok(counter) => Some(counter),
        Err(e) => {
            tracing::warn!(metric = name, error = %e, "Failed to register metric");
            None
        }
    }
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    // Append custom prometheus metrics
    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record a dashboard request by its authorization status.
pub fn record_dashboard_request(status: &str) {
    if let Some(counter) = DASHBOARD_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a failed fetch of one Stripe resource.
pub fn record_upstream_failure(resource: &str) {
    if let Some(counter) = UPSTREAM_FETCH_FAILURES_TOTAL.get() {
        counter.with_label_values(&[resource]).inc();
    }
}
