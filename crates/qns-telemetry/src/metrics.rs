//! Prometheus metrics for the name registry.
//!
//! All metrics follow the naming convention: `qns_registry_<metric>_<unit>`

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Successful registrations, supersessions included
    pub static ref REGISTRATIONS_TOTAL: Counter = Counter::new(
        "qns_registry_registrations_total",
        "Total number of successful domain registrations"
    ).expect("metric creation failed");

    /// Successful data updates
    pub static ref DATA_UPDATES_TOTAL: Counter = Counter::new(
        "qns_registry_data_updates_total",
        "Total number of domain data modifications"
    ).expect("metric creation failed");

    /// Successful lease renewals
    pub static ref RENEWALS_TOTAL: Counter = Counter::new(
        "qns_registry_renewals_total",
        "Total number of lease renewals"
    ).expect("metric creation failed");

    /// Successful ownership transfers
    pub static ref TRANSFERS_TOTAL: Counter = Counter::new(
        "qns_registry_transfers_total",
        "Total number of ownership transfers"
    ).expect("metric creation failed");

    /// Successful treasury withdrawals
    pub static ref WITHDRAWALS_TOTAL: Counter = Counter::new(
        "qns_registry_withdrawals_total",
        "Total number of treasury withdrawals"
    ).expect("metric creation failed");

    /// Rejected calls by error reason
    pub static ref REJECTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("qns_registry_rejections_total", "Total rejected registry calls"),
        &["reason"]
    ).expect("metric creation failed");

    /// Current treasury balance in base units (lossy above 2^53)
    pub static ref TREASURY_BALANCE: Gauge = Gauge::new(
        "qns_registry_treasury_balance",
        "Current withdrawable treasury balance"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Calling it again is a no-op.
///
/// # Errors
///
/// `MetricsInit` if a metric cannot be registered.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REGISTRATIONS_TOTAL.clone()),
        Box::new(DATA_UPDATES_TOTAL.clone()),
        Box::new(RENEWALS_TOTAL.clone()),
        Box::new(TRANSFERS_TOTAL.clone()),
        Box::new(WITHDRAWALS_TOTAL.clone()),
        Box::new(REJECTIONS_TOTAL.clone()),
        Box::new(TREASURY_BALANCE.clone()),
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
///
/// # Errors
///
/// `MetricsInit` if encoding fails.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
