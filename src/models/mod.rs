//! Model slots and routing.
//!
//! Handles store loading, the stable/canary slot state machine, and
//! per-request routing between the two slots.

mod handle;
mod loader;
mod probability;
mod random;
mod registry;
mod router;
mod slot;
mod state;
mod swap;
mod version;

pub use handle::{FeatureVector, Label, Model, ModelHandle, PredictionError};
pub use loader::{LoadError, ModelStore};
pub use probability::CanaryProbability;
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use registry::InMemoryModelStore;
pub use router::{PredictionRequest, PredictionResult, Router};
pub use slot::{LoadedModel, ModelSlot, SlotKind};
pub use state::{ServingSnapshot, ServingState};
pub use swap::SlotManager;
pub use version::VersionId;
