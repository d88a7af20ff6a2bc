//! Canary Gateway
//!
//! Serves two concurrently loaded versions of a model, a stable slot and a
//! canary slot, and routes each prediction request to one of them with a
//! configurable probability.
//!
//! # Design Principles
//!
//! - **Wait-free reads**: requests read one immutable serving generation
//! - **Load before publish**: a model is fully loaded before any slot changes
//! - **No fallback**: a request routed to an unloaded slot fails loudly
//! - **Injected randomness**: routing draws come from a caller-supplied source
//!
//! # Boundaries
//!
//! - Transport: none. An API layer embeds `Gateway` and maps `GatewayError`.
//! - Model store: external, behind the `ModelStore` trait.
//! - State: in-memory only, lost on shutdown.

pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod telemetry;

use std::sync::Arc;

pub use config::GatewayConfig;
pub use error::{ErrorKind, GatewayError, ValidationError};

use health::{HealthChecker, HealthConfig, HealthReport};
use models::{ModelStore, RandomSource, Router, SeededRandom, SlotManager, ThreadRandom, VersionId};
use telemetry::{MetricsSnapshot, MetricsStore};

/// A wired gateway instance.
pub struct Gateway {
    pub slots: Arc<SlotManager>,
    pub router: Router,
    pub health: HealthChecker,
    pub metrics: Arc<MetricsStore>,
    default_version: VersionId,
}

impl Gateway {
    /// Wire a gateway with both slots unloaded.
    ///
    /// Routing uses a seeded source when `config.routing_seed` is set and the
    /// thread-local generator otherwise.
    pub fn new(config: GatewayConfig, store: Arc<dyn ModelStore>) -> Self {
        let random: Arc<dyn RandomSource> = match config.routing_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        Self::with_random(config, store, random)
    }

    pub fn with_random(
        config: GatewayConfig,
        store: Arc<dyn ModelStore>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let metrics = Arc::new(MetricsStore::new());
        let health = HealthChecker::new(HealthConfig {
            require_canary_loaded: config.require_canary_loaded,
        });

        let mut slots = SlotManager::new(store, config.model_name).with_metrics(metrics.clone());
        if let Some(timeout) = config.load_timeout {
            slots = slots.with_load_timeout(timeout);
        }
        let slots = Arc::new(slots.with_initial_probability(config.canary_probability));
        let router = Router::new(slots.clone(), random);

        Self {
            slots,
            router,
            health,
            metrics,
            default_version: config.default_version,
        }
    }

    /// Wire a gateway and load the default version into both slots.
    ///
    /// An error here means there is no model to serve; the process should
    /// not start.
    pub async fn start(
        config: GatewayConfig,
        store: Arc<dyn ModelStore>,
    ) -> Result<Self, GatewayError> {
        let gateway = Self::new(config, store);
        gateway.slots.initialize(gateway.default_version.clone()).await?;
        Ok(gateway)
    }

    pub fn default_version(&self) -> &VersionId {
        &self.default_version
    }

    pub fn health_report(&self) -> HealthReport {
        self.health.report(&self.slots.snapshot())
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
