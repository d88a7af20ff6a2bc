//! Slot management: load, swap, and promote without blocking readers.
//!
//! The current `ServingState` lives in an `ArcSwap`. Readers take a full
//! generation with a single atomic load and never wait on writers. Writers
//! load the new model from the store first, outside any lock, then derive
//! and publish the next generation inside a short critical section that
//! serializes them against each other. A failed, timed-out or dropped load
//! publishes nothing.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::handle::ModelHandle;
use super::loader::{LoadError, ModelStore};
use super::probability::CanaryProbability;
use super::slot::{ModelSlot, SlotKind};
use super::state::{ServingSnapshot, ServingState};
use super::version::VersionId;
use crate::error::GatewayError;
use crate::telemetry::{record_canary_probability, record_control_op, ControlOp, MetricsStore};

/// Owns the stable and canary slots and the canary probability.
pub struct SlotManager {
    store: Arc<dyn ModelStore>,
    model_name: String,
    load_timeout: Option<Duration>,
    state: ArcSwap<ServingState>,
    publish_lock: Mutex<()>,
    metrics: Arc<MetricsStore>,
}

impl SlotManager {
    /// Create a manager with both slots unloaded and probability 0.
    pub fn new(store: Arc<dyn ModelStore>, model_name: impl Into<String>) -> Self {
        Self {
            store,
            model_name: model_name.into(),
            load_timeout: None,
            state: ArcSwap::from_pointee(ServingState::new(CanaryProbability::NEVER)),
            publish_lock: Mutex::new(()),
            metrics: Arc::new(MetricsStore::new()),
        }
    }

    /// Fail store loads that take longer than `timeout`.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn with_initial_probability(self, probability: CanaryProbability) -> Self {
        self.state.store(Arc::new(ServingState::new(probability)));
        record_canary_probability(&self.metrics, probability.value());
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsStore>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    /// Current generation. Wait-free.
    pub fn current(&self) -> Arc<ServingState> {
        self.state.load_full()
    }

    /// Consistent view of the current generation. Wait-free.
    pub fn snapshot(&self) -> ServingSnapshot {
        self.state.load().snapshot()
    }

    /// Load `version` into both slots.
    ///
    /// Meant for startup; a failure here leaves the gateway with nothing to
    /// serve and callers should treat it as fatal.
    pub async fn initialize(
        &self,
        version: impl Into<VersionId>,
    ) -> Result<VersionId, GatewayError> {
        let version = version.into();
        let result = self.load_from_store(ControlOp::Initialize, &version).await.map(|handle| {
            let slot = ModelSlot::loaded(version.clone(), handle);
            self.publish(|state| Ok(state.with_both(slot)))
        });
        let next = self.finish(ControlOp::Initialize, result)?;

        tracing::info!(
            model = %self.model_name,
            version = %version,
            generation = next.generation(),
            "serving slots initialized"
        );
        Ok(version)
    }

    /// Load `version` and publish it into the canary slot.
    ///
    /// The canary slot is untouched unless the load succeeds.
    pub async fn update_canary(
        &self,
        version: impl Into<VersionId>,
    ) -> Result<VersionId, GatewayError> {
        let version = version.into();
        let result = self.load_from_store(ControlOp::UpdateCanary, &version).await.map(|handle| {
            let slot = ModelSlot::loaded(version.clone(), handle);
            self.publish(|state| Ok(state.with_canary(slot)))
        });
        let next = self.finish(ControlOp::UpdateCanary, result)?;

        tracing::info!(
            model = %self.model_name,
            version = %version,
            generation = next.generation(),
            "canary updated"
        );
        Ok(version)
    }

    /// Copy the canary pair into the stable slot.
    ///
    /// The canary probability is left as is, so right after promotion both
    /// slots serve the same version.
    pub fn promote_canary(&self) -> Result<VersionId, GatewayError> {
        let result = self.publish(|state| match state.canary() {
            ModelSlot::Unloaded => Err(GatewayError::ServiceUnavailable {
                slot: SlotKind::Canary,
            }),
            canary => Ok(state.with_stable(canary.clone())),
        });
        let next = self.finish(ControlOp::PromoteCanary, Ok(result))?;

        let version = next
            .stable()
            .version()
            .cloned()
            .ok_or(GatewayError::ServiceUnavailable { slot: SlotKind::Stable })?;
        tracing::info!(
            model = %self.model_name,
            version = %version,
            generation = next.generation(),
            "canary promoted to stable"
        );
        Ok(version)
    }

    /// Validate and publish a new canary routing probability.
    pub fn set_canary_probability(&self, p: f64) -> Result<(), GatewayError> {
        let result = CanaryProbability::new(p)
            .map_err(GatewayError::from)
            .map(|probability| self.publish(|state| Ok(state.with_probability(probability))));
        let next = self.finish(ControlOp::SetProbability, result)?;

        tracing::info!(
            model = %self.model_name,
            probability = p,
            generation = next.generation(),
            "canary probability updated"
        );
        Ok(())
    }

    async fn load_from_store(
        &self,
        op: ControlOp,
        version: &VersionId,
    ) -> Result<ModelHandle, GatewayError> {
        let load = self.store.load_model(&self.model_name, version);
        let result = match self.load_timeout {
            Some(timeout) => tokio::time::timeout(timeout, load)
                .await
                .unwrap_or_else(|_| Err(LoadError::Timeout(timeout))),
            None => load.await,
        };
        result.map_err(|e| {
            tracing::warn!(
                model = %self.model_name,
                version = %version,
                op = op.as_str(),
                error = %e,
                "model load failed, serving state unchanged"
            );
            GatewayError::from(e)
        })
    }

    /// Derive and store the next generation. Writers serialize here only.
    ///
    /// The probability gauge is set under the same lock so it always ends on
    /// the value of the last published generation.
    fn publish<F>(&self, derive: F) -> Result<Arc<ServingState>, GatewayError>
    where
        F: FnOnce(&ServingState) -> Result<ServingState, GatewayError>,
    {
        let _guard = self.publish_lock.lock();
        let current = self.state.load_full();
        let next = Arc::new(derive(&current)?);
        self.state.store(next.clone());
        record_canary_probability(&self.metrics, next.probability().value());
        Ok(next)
    }

    fn finish(
        &self,
        op: ControlOp,
        result: Result<Result<Arc<ServingState>, GatewayError>, GatewayError>,
    ) -> Result<Arc<ServingState>, GatewayError> {
        let result = result.and_then(|published| published);
        record_control_op(&self.metrics, op, result.is_ok());
        result
    }
}
