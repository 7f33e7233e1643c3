//! # QNS Telemetry
//!
//! Observability for the Quantum Name Service: tracing subscriber setup and
//! Prometheus metrics.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qns_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `qns-registry` | Service name in logs |
//! | `QNS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `QNS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `QNS_JSON_LOGS` | `false` | JSON formatted logs |
//! | `QNS_NETWORK` | `testnet` | Network identifier |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    gather_metrics, register_metrics, DATA_UPDATES_TOTAL, REGISTRATIONS_TOTAL, REJECTIONS_TOTAL,
    RENEWALS_TOTAL, TRANSFERS_TOTAL, TREASURY_BALANCE, WITHDRAWALS_TOTAL,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the logging subscriber.
///
/// # Errors
///
/// Any [`TelemetryError`] from either step.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
