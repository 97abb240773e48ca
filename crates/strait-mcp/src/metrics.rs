//! Prometheus-backed instrumentation.
//!
//! Four instruments on a private registry: query count, query errors, the
//! query duration histogram, and the per-tool duration histogram. The
//! registry is exposed as text on the HTTP transport's `/metrics`.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use strait_core::port::Instrumentation;

/// Millisecond latency buckets, 1ms to 10s.
const DURATION_BUCKETS_MS: &[f64] = &[
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

pub struct PromInstruments {
    registry: Registry,
    query_count: IntCounter,
    query_errors: IntCounter,
    query_duration: Histogram,
    tool_duration: HistogramVec,
}

impl PromInstruments {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let query_count = IntCounter::with_opts(Opts::new(
            "strait_query_count_total",
            "Total number of SQL queries executed",
        ))?;
        registry.register(Box::new(query_count.clone()))?;

        let query_errors = IntCounter::with_opts(Opts::new(
            "strait_query_errors_total",
            "Total number of failed SQL queries",
        ))?;
        registry.register(Box::new(query_errors.clone()))?;

        let query_duration = Histogram::with_opts(
            HistogramOpts::new(
                "strait_query_duration_ms",
                "SQL query execution duration in milliseconds",
            )
            .buckets(DURATION_BUCKETS_MS.to_vec()),
        )?;
        registry.register(Box::new(query_duration.clone()))?;

        let tool_duration = HistogramVec::new(
            HistogramOpts::new(
                "strait_tool_duration_ms",
                "Tool call duration in milliseconds",
            )
            .buckets(DURATION_BUCKETS_MS.to_vec()),
            &["tool"],
        )?;
        registry.register(Box::new(tool_duration.clone()))?;

        Ok(Self {
            registry,
            query_count,
            query_errors,
            query_duration,
            tool_duration,
        })
    }

    /// Prometheus text exposition of the registry.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Instrumentation for PromInstruments {
    fn incr_query_count(&self) {
        self.query_count.inc();
    }

    fn incr_query_errors(&self) {
        self.query_errors.inc();
    }

    fn record_query_duration_ms(&self, ms: f64) {
        self.query_duration.observe(ms);
    }

    fn record_tool_duration_ms(&self, tool: &str, ms: f64) {
        self.tool_duration.with_label_values(&[tool]).observe(ms);
    }
}
