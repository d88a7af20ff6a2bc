//! Model slots: immutable `(version, handle)` pairs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::handle::ModelHandle;
use super::version::VersionId;

/// Which of the two serving slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Stable,
    Canary,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Canary => "canary",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version together with the handle loaded for it. Never mutated.
#[derive(Debug)]
pub struct LoadedModel {
    version: VersionId,
    handle: ModelHandle,
}

impl LoadedModel {
    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }
}

/// Contents of one slot. Replaced as a whole, never field by field.
#[derive(Debug, Clone, Default)]
pub enum ModelSlot {
    #[default]
    Unloaded,
    Loaded(Arc<LoadedModel>),
}

impl ModelSlot {
    pub fn loaded(version: VersionId, handle: ModelHandle) -> Self {
        Self::Loaded(Arc::new(LoadedModel { version, handle }))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        match self {
            Self::Loaded(model) => Some(model.as_ref()),
            Self::Unloaded => None,
        }
    }

    pub fn version(&self) -> Option<&VersionId> {
        self.model().map(LoadedModel::version)
    }
}
