//! Decision Threshold
//!
//! Ngưỡng xác suất để phân loại attack.
//! The default is deliberately low: recall is favoured over precision.

use serde::{Deserialize, Serialize};

/// Default attack-probability threshold
pub const DEFAULT_PREDICTION_THRESHOLD: f64 = 0.05;

/// Attack-probability cut-off, always within `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    /// Out-of-range values are clamped; NaN falls back to the default.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Strictly greater than the threshold counts as an attack.
    pub fn is_attack(&self, p_attack: f64) -> bool {
        p_attack > self.0
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(DEFAULT_PREDICTION_THRESHOLD)
    }
}
