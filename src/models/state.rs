//! Serving state generations.
//!
//! A `ServingState` is immutable. Every control operation derives the next
//! generation from the current one and publishes it as a unit, so a reader
//! holding an `Arc<ServingState>` sees slots and probability from the same
//! generation.

use serde::{Deserialize, Serialize};

use super::probability::CanaryProbability;
use super::slot::{ModelSlot, SlotKind};
use super::version::VersionId;

#[derive(Debug, Clone, Default)]
pub struct ServingState {
    generation: u64,
    stable: ModelSlot,
    canary: ModelSlot,
    probability: CanaryProbability,
}

impl ServingState {
    /// Empty state: both slots unloaded.
    pub fn new(probability: CanaryProbability) -> Self {
        Self {
            probability,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stable(&self) -> &ModelSlot {
        &self.stable
    }

    pub fn canary(&self) -> &ModelSlot {
        &self.canary
    }

    pub fn slot(&self, kind: SlotKind) -> &ModelSlot {
        match kind {
            SlotKind::Stable => &self.stable,
            SlotKind::Canary => &self.canary,
        }
    }

    pub fn probability(&self) -> CanaryProbability {
        self.probability
    }

    pub(crate) fn with_both(&self, slot: ModelSlot) -> Self {
        Self {
            generation: self.generation + 1,
            stable: slot.clone(),
            canary: slot,
            probability: self.probability,
        }
    }

    pub(crate) fn with_canary(&self, canary: ModelSlot) -> Self {
        Self {
            generation: self.generation + 1,
            stable: self.stable.clone(),
            canary,
            probability: self.probability,
        }
    }

    pub(crate) fn with_stable(&self, stable: ModelSlot) -> Self {
        Self {
            generation: self.generation + 1,
            stable,
            canary: self.canary.clone(),
            probability: self.probability,
        }
    }

    pub(crate) fn with_probability(&self, probability: CanaryProbability) -> Self {
        Self {
            generation: self.generation + 1,
            stable: self.stable.clone(),
            canary: self.canary.clone(),
            probability,
        }
    }

    pub fn snapshot(&self) -> ServingSnapshot {
        ServingSnapshot {
            generation: self.generation,
            stable_version: self.stable.version().cloned(),
            canary_version: self.canary.version().cloned(),
            probability: self.probability.value(),
            stable_loaded: self.stable.is_loaded(),
            canary_loaded: self.canary.is_loaded(),
        }
    }
}

/// Point-in-time view of one serving generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSnapshot {
    pub generation: u64,
    pub stable_version: Option<VersionId>,
    pub canary_version: Option<VersionId>,
    pub probability: f64,
    pub stable_loaded: bool,
    pub canary_loaded: bool,
}
