//! Canary routing probability.
//!
//! The only mutable scalar of the serving state. A `CanaryProbability` can
//! only be obtained through validation, so every published value is in
//! `[0.0, 1.0]`.

use serde::Serialize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct CanaryProbability(f64);

impl CanaryProbability {
    pub const NEVER: Self = Self(0.0);
    pub const ALWAYS: Self = Self(1.0);

    /// Validate `p` (NaN is rejected).
    pub fn new(p: f64) -> Result<Self, ValidationError> {
        if (0.0..=1.0).contains(&p) {
            Ok(Self(p))
        } else {
            Err(ValidationError::ProbabilityOutOfRange(p))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Routing rule for a uniform draw `u` in `[0, 1)`.
    pub fn routes_to_canary(&self, u: f64) -> bool {
        u < self.0
    }
}

impl TryFrom<f64> for CanaryProbability {
    type Error = ValidationError;

    fn try_from(p: f64) -> Result<Self, Self::Error> {
        Self::new(p)
    }
}
