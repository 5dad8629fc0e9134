use std::fmt;

use serde::{Deserialize, Serialize};

/// A score clamped to `[0.0, 1.0]`. Used for both `Memory::confidence` and
/// `Memory::importance` — they're independent axes but share the same range
/// and clamping behavior, so one newtype backs both via the two aliases below.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitScore(f64);

impl UnitScore {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for UnitScore {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for UnitScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for UnitScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<UnitScore> for f64 {
    fn from(value: UnitScore) -> Self {
        value.0
    }
}

/// How confident the system is that a memory's fact is accurate.
pub type Confidence = UnitScore;

/// How important a memory is to the scoped subject, independent of confidence.
pub type Importance = UnitScore;
