//! Prediction model

use serde::Serialize;

use crate::logic::features::FeatureVector;
use crate::logic::scoring::Scored;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub is_attack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PredictionDetails>,
}

/// Debug-only scoring breakdown
#[derive(Debug, Serialize)]
pub struct PredictionDetails {
    pub probabilities: [f64; 2],
    pub threshold: f64,
    pub features: FeatureVector,
    pub dropped_packets: usize,
}

impl PredictResponse {
    pub fn from_scored(scored: Scored, debug: bool) -> Self {
        let details = debug.then(|| PredictionDetails {
            probabilities: scored.probabilities,
            threshold: scored.threshold,
            features: scored.features,
            dropped_packets: scored.dropped_packets,
        });

        Self {
            prediction: scored.verdict.prediction,
            is_attack: scored.verdict.is_attack,
            details,
        }
    }
}
