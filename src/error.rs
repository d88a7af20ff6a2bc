//! Gateway error taxonomy.
//!
//! Control-operation errors are raised before any state is published. Request
//! errors are isolated to the request that raised them.

use thiserror::Error;

use crate::models::{LoadError, PredictionError, SlotKind};

/// Malformed control or request input. Always raised before mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Canary probability {0} outside [0.0, 1.0]")]
    ProbabilityOutOfRange(f64),

    #[error("Feature batch is empty")]
    EmptyBatch,
}

/// Errors returned by the slot manager and router.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service unavailable: {slot} slot is not loaded")]
    ServiceUnavailable { slot: SlotKind },

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}

/// Coarse error category for mapping at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Load,
    Validation,
    ServiceUnavailable,
    Prediction,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Validation => "validation",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Prediction => "prediction",
        }
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load(_) => ErrorKind::Load,
            Self::Validation(_) => ErrorKind::Validation,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::Prediction(_) => ErrorKind::Prediction,
        }
    }

    /// Returns true if the caller supplied bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Prediction(_))
    }

    /// Returns true if the same call may succeed later without changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load(e) => e.is_transient(),
            Self::ServiceUnavailable { .. } => true,
            Self::Validation(_) | Self::Prediction(_) => false,
        }
    }
}
