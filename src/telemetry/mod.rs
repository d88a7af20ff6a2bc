//! Telemetry for the gateway.
//!
//! Structured logging, request spans, and metrics collection.

mod logging;
pub mod metrics;
mod spans;
mod store;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    duration_ms, record_canary_probability, record_control_op, record_prediction_failure,
    record_prediction_success, ControlOp,
};
pub use spans::{RequestSpan, SpanExt};
pub use store::{HistogramSummary, MetricsSnapshot, MetricsStore};
