//! Health reporting for the gateway.
//!
//! Derived entirely from a `ServingSnapshot`, so a report never mixes two
//! serving generations.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::models::{ServingSnapshot, VersionId};

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Detailed health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub ready: bool,
    pub stable_loaded: bool,
    pub canary_loaded: bool,
    pub stable_version: Option<VersionId>,
    pub canary_version: Option<VersionId>,
    pub canary_probability: f64,
    pub generation: u64,
    pub uptime_secs: u64,
}

/// Health check configuration.
#[derive(Debug, Clone, Default)]
pub struct HealthConfig {
    /// Report not ready while the canary slot is empty, even at probability 0.
    pub require_canary_loaded: bool,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Liveness: the process is responsive.
    pub fn is_alive(&self) -> bool {
        true
    }

    /// Readiness: every slot that can receive traffic is loaded.
    pub fn is_ready(&self, snapshot: &ServingSnapshot) -> bool {
        let stable_routable = snapshot.probability < 1.0;
        let canary_routable = snapshot.probability > 0.0 || self.config.require_canary_loaded;
        (!stable_routable || snapshot.stable_loaded) && (!canary_routable || snapshot.canary_loaded)
    }

    pub fn report(&self, snapshot: &ServingSnapshot) -> HealthReport {
        let ready = self.is_ready(snapshot);
        let state = if !ready {
            HealthState::Unhealthy
        } else if snapshot.stable_loaded && snapshot.canary_loaded {
            HealthState::Healthy
        } else {
            HealthState::Degraded
        };

        HealthReport {
            state,
            ready,
            stable_loaded: snapshot.stable_loaded,
            canary_loaded: snapshot.canary_loaded,
            stable_version: snapshot.stable_version.clone(),
            canary_version: snapshot.canary_version.clone(),
            canary_probability: snapshot.probability,
            generation: snapshot.generation,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}
