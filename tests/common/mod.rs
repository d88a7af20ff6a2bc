//! Shared test doubles for gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use canary_gateway::models::{
    FeatureVector, InMemoryModelStore, Label, LoadError, ModelHandle, ModelStore,
    PredictionError, PredictionRequest, RandomSource, VersionId,
};

pub const MODEL: &str = "iris";

/// Model that answers `label` for every row.
pub fn constant_model(label: Label) -> ModelHandle {
    ModelHandle::new(
        move |batch: &[FeatureVector]| -> Result<Vec<Label>, PredictionError> {
            Ok(vec![label; batch.len()])
        },
    )
}

/// Model that rejects rows whose length differs from `width`.
pub fn shaped_model(width: usize, label: Label) -> ModelHandle {
    ModelHandle::new(
        move |batch: &[FeatureVector]| -> Result<Vec<Label>, PredictionError> {
            if let Some(row) = batch.iter().find(|row| row.len() != width) {
                return Err(PredictionError::ShapeMismatch { expected: width, actual: row.len() });
            }
            Ok(vec![label; batch.len()])
        },
    )
}

/// Store holding versions 1 and 2 of `MODEL`; each answers its own number.
/// `latest` resolves to version 2.
pub async fn versioned_store() -> Arc<InMemoryModelStore> {
    let store = InMemoryModelStore::new();
    store.register(MODEL, 1u64, shaped_model(4, 1)).await;
    store.register(MODEL, 2u64, shaped_model(4, 2)).await;
    Arc::new(store)
}

/// Three iris rows.
pub fn iris_batch() -> PredictionRequest {
    PredictionRequest::new(vec![
        vec![5.1, 3.5, 1.4, 0.2],
        vec![6.7, 3.0, 5.2, 2.3],
        vec![5.9, 3.0, 4.2, 1.5],
    ])
}

/// Random source that always returns the same draw.
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Store whose loads never finish within a test's lifetime.
pub struct StalledStore {
    pub delay: Duration,
}

#[async_trait]
impl ModelStore for StalledStore {
    async fn load_model(&self, _name: &str, _version: &VersionId) -> Result<ModelHandle, LoadError> {
        tokio::time::sleep(self.delay).await;
        Ok(constant_model(0))
    }
}

/// Store that serves `inner` until `unreachable` is set, then fails.
pub struct FlakyStore {
    pub inner: Arc<InMemoryModelStore>,
    pub unreachable: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl ModelStore for FlakyStore {
    async fn load_model(&self, name: &str, version: &VersionId) -> Result<ModelHandle, LoadError> {
        if self.unreachable.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(LoadError::Unavailable("connection refused".to_string()));
        }
        self.inner.load_model(name, version).await
    }
}
