//! Per-request slot selection.
//!
//! Each request reads one serving generation and uses it for both the
//! routing decision and the reported provenance, so a result never names a
//! version other than the one whose handle produced the labels.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::Span;

use super::handle::{FeatureVector, Label};
use super::random::RandomSource;
use super::slot::SlotKind;
use super::state::ServingState;
use super::swap::SlotManager;
use super::version::VersionId;
use crate::error::{GatewayError, ValidationError};
use crate::telemetry::{
    duration_ms, record_prediction_failure, record_prediction_success, MetricsStore, RequestSpan,
    SpanExt,
};

/// A batch of feature vectors to classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub features: Vec<FeatureVector>,
}

impl PredictionRequest {
    pub fn new(features: Vec<FeatureVector>) -> Self {
        Self { features }
    }

    /// Row lengths are left to the model; only emptiness is checked here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.features.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        Ok(())
    }
}

/// Labels plus the slot and version that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub labels: Vec<Label>,
    pub slot_used: SlotKind,
    pub version_used: VersionId,
}

/// Routes prediction requests between the stable and canary slots.
pub struct Router {
    slots: Arc<SlotManager>,
    random: Arc<dyn RandomSource>,
    metrics: Arc<MetricsStore>,
    next_request_id: AtomicU64,
}

impl Router {
    pub fn new(slots: Arc<SlotManager>, random: Arc<dyn RandomSource>) -> Self {
        let metrics = slots.metrics().clone();
        Self {
            slots,
            random,
            metrics,
            next_request_id: AtomicU64::new(1),
        }
    }

    pub fn slots(&self) -> &Arc<SlotManager> {
        &self.slots
    }

    /// Draw a slot for one request against `state`.
    pub fn choose(&self, state: &ServingState) -> SlotKind {
        if state.probability().routes_to_canary(self.random.next_unit()) {
            SlotKind::Canary
        } else {
            SlotKind::Stable
        }
    }

    /// Route one request and run the chosen model.
    ///
    /// An unloaded slot fails the request; there is no fallback to the
    /// other slot.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, GatewayError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let span = RequestSpan::new(request_id, request.features.len());
        let _enter = span.enter();
        let start = Instant::now();

        let result = self.route(request, &span);

        let latency = start.elapsed();
        span.record_result(&result);
        span.record("latency_ms", duration_ms(latency));
        match &result {
            Ok(served) => record_prediction_success(&self.metrics, served.slot_used, latency),
            Err(e) => record_prediction_failure(&self.metrics, e.kind()),
        }
        result
    }

    fn route(
        &self,
        request: &PredictionRequest,
        span: &Span,
    ) -> Result<PredictionResult, GatewayError> {
        request.validate()?;

        let state = self.slots.current();
        let slot = self.choose(&state);
        let model = state
            .slot(slot)
            .model()
            .ok_or(GatewayError::ServiceUnavailable { slot })?;

        span.record("slot", slot.as_str());
        span.record("version", tracing::field::display(model.version()));
        tracing::debug!(
            slot = slot.as_str(),
            version = %model.version(),
            generation = state.generation(),
            "request routed"
        );

        let labels = model.handle().predict(&request.features)?;
        Ok(PredictionResult {
            labels,
            slot_used: slot,
            version_used: model.version().clone(),
        })
    }
}
