//! Scoring Service
//!
//! validate → extract features → score → threshold → verdict.
//! Mỗi request xử lý độc lập; chỉ model là dùng chung (read-only).

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::logic::features::{FeatureExtractor, FeatureVector, LayoutInfo};
use crate::logic::model::{DecisionThreshold, EngineStatus, InferenceStats, ModelState};

/// Fields every packet must carry (presence only)
pub const REQUIRED_FIELDS: [&str; 5] = ["timestamp", "src_ip", "dst_ip", "src_port", "dst_port"];

/// Binary classification for one flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub prediction: u8,
    pub is_attack: bool,
}

impl Verdict {
    pub fn from_attack(is_attack: bool) -> Self {
        Self {
            prediction: u8::from(is_attack),
            is_attack,
        }
    }
}

/// Verdict plus everything that produced it
#[derive(Debug, Clone)]
pub struct Scored {
    pub verdict: Verdict,
    pub probabilities: [f64; 2],
    pub threshold: f64,
    pub features: FeatureVector,
    pub dropped_packets: usize,
}

/// Check request shape and per-packet required-field presence.
///
/// `null`, `[]` and `{}` count as empty. Anything else that is not an array
/// of objects is an invalid format.
pub fn validate_packets(payload: &Value) -> AppResult<&[Value]> {
    let packets = match payload {
        Value::Null => return Err(AppError::EmptyInput),
        Value::Object(map) if map.is_empty() => return Err(AppError::EmptyInput),
        Value::Array(packets) => packets.as_slice(),
        other => {
            return Err(AppError::InvalidValueFormat(format!(
                "expected a JSON array of packets, got {}",
                json_kind(other)
            )))
        }
    };

    if packets.is_empty() {
        return Err(AppError::EmptyInput);
    }

    for (index, packet) in packets.iter().enumerate() {
        let fields = packet.as_object().ok_or_else(|| {
            AppError::InvalidValueFormat(format!(
                "packet {} is {}, expected an object",
                index,
                json_kind(packet)
            ))
        })?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !fields.contains_key(*field))
            .collect();

        if !missing.is_empty() {
            return Err(AppError::MissingFields { index, fields: missing });
        }
    }

    Ok(packets)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct ScoringService {
    model: ModelState,
    extractor: FeatureExtractor,
    threshold: DecisionThreshold,
    stats: InferenceStats,
}

impl ScoringService {
    pub fn new(model: ModelState, extractor: FeatureExtractor, threshold: DecisionThreshold) -> Self {
        Self {
            model,
            extractor,
            threshold,
            stats: InferenceStats::default(),
        }
    }

    pub fn model(&self) -> &ModelState {
        &self.model
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn idle_threshold_us(&self) -> f64 {
        self.extractor.idle_threshold_us()
    }

    /// Score one flow submitted as a raw JSON payload.
    pub fn score(&self, payload: &Value) -> AppResult<Scored> {
        let classifier = self.model.classifier().ok_or(AppError::ModelUnavailable)?;

        let packets = validate_packets(payload)?;
        let extraction = self.extractor.extract(packets);

        let start = Instant::now();
        let probabilities = classifier.predict_probability(&extraction.features)?;
        self.stats.record(start.elapsed().as_micros() as u64);

        let [_, p_attack] = probabilities;
        let verdict = Verdict::from_attack(self.threshold.is_attack(p_attack));

        tracing::debug!(
            packets = packets.len(),
            dropped = extraction.dropped.len(),
            p_attack,
            is_attack = verdict.is_attack,
            "Flow scored"
        );

        Ok(Scored {
            verdict,
            probabilities,
            threshold: self.threshold.get(),
            features: extraction.features,
            dropped_packets: extraction.dropped.len(),
        })
    }

    pub fn engine_status(&self) -> EngineStatus {
        EngineStatus::collect(&self.model, &self.stats)
    }

    pub fn layout(&self) -> LayoutInfo {
        LayoutInfo::current()
    }
}
