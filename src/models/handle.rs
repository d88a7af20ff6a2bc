//! Predict-capable model handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// One row of input features.
pub type FeatureVector = Vec<f64>;

/// Class label produced for one feature vector.
pub type Label = i64;

/// Errors raised by a model during inference. Request-scoped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Feature shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Label count mismatch: {inputs} inputs produced {labels} labels")]
    LabelCountMismatch { inputs: usize, labels: usize },

    #[error("Model error: {0}")]
    Model(String),
}

/// Batch classifier backing a model slot.
///
/// Implementations must be immutable once loaded: the same handle is shared
/// by every request routed to its slot.
pub trait Model: Send + Sync {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, PredictionError>;
}

impl<F> Model for F
where
    F: Fn(&[FeatureVector]) -> Result<Vec<Label>, PredictionError> + Send + Sync,
{
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, PredictionError> {
        self(batch)
    }
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Shared, cheaply clonable handle to a loaded model.
#[derive(Clone)]
pub struct ModelHandle {
    id: u64,
    model: Arc<dyn Model>,
}

impl ModelHandle {
    pub fn new<M: Model + 'static>(model: M) -> Self {
        Self::from_arc(Arc::new(model))
    }

    pub fn from_arc(model: Arc<dyn Model>) -> Self {
        let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
        Self { id, model }
    }

    /// Process-unique id assigned when the handle was created.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run the model over a batch.
    ///
    /// Labels are returned in input order; a model that returns a different
    /// number of labels than inputs is reported as a failure.
    pub fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, PredictionError> {
        let labels = self.model.predict(batch)?;
        if labels.len() != batch.len() {
            return Err(PredictionError::LabelCountMismatch {
                inputs: batch.len(),
                labels: labels.len(),
            });
        }
        Ok(labels)
    }

    pub fn same_model(&self, other: &ModelHandle) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle").field("id", &self.id).finish()
    }
}
