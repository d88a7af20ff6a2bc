//! Model store interface.
//!
//! The store resolves a `(name, version)` pair to a loaded handle. Loading may
//! block on disk or network I/O, so the interface is async.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::handle::ModelHandle;
use super::version::VersionId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Model not found: {name}/{version}")]
    NotFound { name: String, version: VersionId },

    #[error("Model store unavailable: {0}")]
    Unavailable(String),

    #[error("Model load timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    /// Returns true if retrying the same load may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Resolves model versions to loaded, predict-capable handles.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn load_model(&self, name: &str, version: &VersionId) -> Result<ModelHandle, LoadError>;
}
