//! Gateway metrics.
//!
//! Every value goes to the `metrics` facade and is mirrored into the
//! in-process `MetricsStore`.

use std::time::Duration;

use crate::error::ErrorKind;
use crate::models::SlotKind;

use super::store::MetricsStore;

pub const PREDICTIONS_TOTAL: &str = "gateway_predictions_total";
pub const PREDICTION_ERRORS_TOTAL: &str = "gateway_prediction_errors_total";
pub const CONTROL_OPS_TOTAL: &str = "gateway_control_ops_total";
pub const CANARY_PROBABILITY: &str = "gateway_canary_probability";
pub const PREDICT_LATENCY_MS: &str = "gateway_predict_latency_ms";

/// Control operations tracked by `record_control_op`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Initialize,
    UpdateCanary,
    PromoteCanary,
    SetProbability,
}

impl ControlOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::UpdateCanary => "update_canary",
            Self::PromoteCanary => "promote_canary",
            Self::SetProbability => "set_probability",
        }
    }
}

/// Milliseconds with sub-millisecond precision. Never truncates or wraps.
pub fn duration_ms(latency: Duration) -> f64 {
    latency.as_secs_f64() * 1000.0
}

pub fn record_prediction_success(store: &MetricsStore, slot: SlotKind, latency: Duration) {
    let latency_ms = duration_ms(latency);
    metrics::counter!(PREDICTIONS_TOTAL, "slot" => slot.as_str()).increment(1);
    metrics::histogram!(PREDICT_LATENCY_MS).record(latency_ms);
    store.increment_counter(&format!("{}.{}", PREDICTIONS_TOTAL, slot), 1);
    store.record_histogram(PREDICT_LATENCY_MS, latency_ms);
}

pub fn record_prediction_failure(store: &MetricsStore, kind: ErrorKind) {
    metrics::counter!(PREDICTION_ERRORS_TOTAL, "kind" => kind.as_str()).increment(1);
    store.increment_counter(&format!("{}.{}", PREDICTION_ERRORS_TOTAL, kind.as_str()), 1);
}

pub fn record_control_op(store: &MetricsStore, op: ControlOp, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(CONTROL_OPS_TOTAL, "op" => op.as_str(), "outcome" => outcome).increment(1);
    store.increment_counter(&format!("{}.{}.{}", CONTROL_OPS_TOTAL, op.as_str(), outcome), 1);
}

pub fn record_canary_probability(store: &MetricsStore, probability: f64) {
    metrics::gauge!(CANARY_PROBABILITY).set(probability);
    store.set_gauge(CANARY_PROBABILITY, probability);
}
