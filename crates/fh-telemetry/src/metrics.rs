//! Prometheus metrics for Firehose stages.
//!
//! All metrics follow the naming convention: `fh_<stage>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INGESTION (fh-01)
    // =========================================================================

    pub static ref INGEST_BYTES_READ: IntCounter = IntCounter::new(
        "fh_ingestion_bytes_read_total",
        "Bytes read from the event source"
    ).expect("metric creation failed");

    pub static ref INGEST_RECONNECTS: IntCounter = IntCounter::new(
        "fh_ingestion_reconnects_total",
        "Times the pump re-established its source"
    ).expect("metric creation failed");

    pub static ref LINES_FRAMED: IntCounter = IntCounter::new(
        "fh_ingestion_lines_framed_total",
        "Non-empty records emitted by the line framer"
    ).expect("metric creation failed");

    // =========================================================================
    // AGGREGATION (fh-02)
    // =========================================================================

    pub static ref EVENTS_DECODED: IntCounter = IntCounter::new(
        "fh_aggregation_events_decoded_total",
        "Records decoded into events"
    ).expect("metric creation failed");

    pub static ref DECODE_SKIPS: IntCounter = IntCounter::new(
        "fh_aggregation_decode_skipped_total",
        "Records skipped as malformed or untimed"
    ).expect("metric creation failed");

    pub static ref LATE_EVENTS_ADJUSTED: IntCounter = IntCounter::new(
        "fh_aggregation_late_events_adjusted_total",
        "Events moved forward to the watermark"
    ).expect("metric creation failed");

    /// Windows closed, by output stream
    pub static ref WINDOWS_CLOSED: IntCounterVec = IntCounterVec::new(
        Opts::new("fh_aggregation_windows_closed_total", "Closed windows per output stream"),
        &["stream"]  // stream: tumbling_counts/hopping_counts/mentions/hashtags/retweets
    ).expect("metric creation failed");

    // =========================================================================
    // STORE (fh-03)
    // =========================================================================

    /// Store writes, by namespace
    pub static ref STORE_WRITES: IntCounterVec = IntCounterVec::new(
        Opts::new("fh_store_writes_total", "Write calls per store namespace"),
        &["namespace"]
    ).expect("metric creation failed");

    pub static ref STORE_WRITE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fh_store_write_duration_seconds",
            "Time spent in a single store write call"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("bucket creation failed"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Ingestion
        Box::new(INGEST_BYTES_READ.clone()),
        Box::new(INGEST_RECONNECTS.clone()),
        Box::new(LINES_FRAMED.clone()),
        // Aggregation
        Box::new(EVENTS_DECODED.clone()),
        Box::new(DECODE_SKIPS.clone()),
        Box::new(LATE_EVENTS_ADJUSTED.clone()),
        Box::new(WINDOWS_CLOSED.clone()),
        // Store
        Box::new(STORE_WRITES.clone()),
        Box::new(STORE_WRITE_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
