// Prometheus metrics definitions for the SERPENT backend.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Gateway calls by endpoint and outcome (ok / error / offline).
    /// `offline` counts requests answered from the configuration-absent
    /// fallback without any upstream call.
    pub static ref NEXUS_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("serpent_nexus_requests_total", "Gateway calls by outcome"),
        &["endpoint", "outcome"],
    )
    .unwrap();

    /// Total score rows inserted.
    pub static ref SCORES_SUBMITTED_TOTAL: IntCounter = IntCounter::new(
        "serpent_scores_submitted_total",
        "Score rows inserted",
    )
    .unwrap();

    /// Total accounts created via register.
    pub static ref USERS_REGISTERED_TOTAL: IntCounter = IntCounter::new(
        "serpent_users_registered_total",
        "Accounts created",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Gateway round-trip time in seconds, by endpoint. Includes the
    /// near-zero samples recorded when the gateway is unconfigured.
    pub static ref NEXUS_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "serpent_nexus_request_duration_seconds",
            "Gateway round-trip time in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NEXUS_REQUESTS_TOTAL.clone()),
        Box::new(SCORES_SUBMITTED_TOTAL.clone()),
        Box::new(USERS_REGISTERED_TOTAL.clone()),
        Box::new(NEXUS_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        REGISTRY.register(c).expect("failed to register metric");
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
