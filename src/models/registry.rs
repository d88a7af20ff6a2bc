//! In-memory model store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::handle::ModelHandle;
use super::loader::{LoadError, ModelStore};
use super::version::VersionId;

/// Thread-safe registry of `(name, version)` → handle.
///
/// `latest` resolves to an explicitly registered `latest` entry if present,
/// otherwise to the highest numeric version registered under the name.
pub struct InMemoryModelStore {
    models: Arc<RwLock<HashMap<(String, VersionId), ModelHandle>>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a handle, returning the one it replaced.
    pub async fn register(
        &self,
        name: &str,
        version: impl Into<VersionId>,
        handle: ModelHandle,
    ) -> Option<ModelHandle> {
        self.models
            .write()
            .await
            .insert((name.to_string(), version.into()), handle)
    }

    /// Remove a version from the registry.
    pub async fn unregister(&self, name: &str, version: &VersionId) -> Option<ModelHandle> {
        self.models
            .write()
            .await
            .remove(&(name.to_string(), version.clone()))
    }

    pub async fn contains(&self, name: &str, version: &VersionId) -> bool {
        self.models
            .read()
            .await
            .contains_key(&(name.to_string(), version.clone()))
    }

    /// Number of registered versions across all names.
    pub async fn count(&self) -> usize {
        self.models.read().await.len()
    }

    fn resolve(
        models: &HashMap<(String, VersionId), ModelHandle>,
        name: &str,
        version: &VersionId,
    ) -> Option<ModelHandle> {
        if let Some(handle) = models.get(&(name.to_string(), version.clone())) {
            return Some(handle.clone());
        }
        if !version.is_latest() {
            return None;
        }
        models
            .iter()
            .filter(|((n, _), _)| n == name)
            .filter_map(|((_, v), h)| v.as_number().map(|num| (num, h)))
            .max_by_key(|(num, _)| *num)
            .map(|(_, h)| h.clone())
    }
}

impl Default for InMemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn load_model(&self, name: &str, version: &VersionId) -> Result<ModelHandle, LoadError> {
        let models = self.models.read().await;
        Self::resolve(&models, name, version).ok_or_else(|| LoadError::NotFound {
            name: name.to_string(),
            version: version.clone(),
        })
    }
}
