//! Feature Vector - Core data structure for ML input
//!
//! Always exactly [`FEATURE_COUNT`] values in [`FEATURE_LAYOUT`] order.
//! Degenerate flows produce zero-filled entries, never missing ones.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::direction::{classify, DroppedPacket, FlowTimestamps};
use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};
use super::timing::{self, DEFAULT_IDLE_THRESHOLD_US};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Ordered feature values for one flow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// `(name, value)` pairs in layout order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }
}

/// Serialized as a name → value map, keys in layout order.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Compute the feature vector from direction-split timestamps.
pub fn compute(flow: &FlowTimestamps, idle_threshold_us: f64) -> FeatureVector {
    let fwd = timing::inter_arrival_times(&flow.forward);
    let bwd = timing::inter_arrival_times(&flow.backward);
    let all = timing::inter_arrival_times(&flow.all);
    let idle = timing::idle_times(&flow.all, idle_threshold_us);

    FeatureVector::from_values([
        timing::std_dev(&fwd),
        timing::std_dev(&bwd),
        timing::std_dev(&all),
        timing::max(&fwd),
        timing::mean(&all),
        timing::max(&all),
        timing::mean(&fwd),
        timing::sum(&fwd),
        timing::flow_duration(&flow.all),
        timing::max(&bwd),
        timing::max(&idle),
        timing::mean(&idle),
    ])
}

/// Result of running the extractor over a request's packets
#[derive(Debug, Clone)]
pub struct Extraction {
    pub features: FeatureVector,
    pub dropped: Vec<DroppedPacket>,
}

/// Stateless packets → features pipeline
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    idle_threshold_us: f64,
}

impl FeatureExtractor {
    pub fn new(idle_threshold_us: f64) -> Self {
        Self { idle_threshold_us }
    }

    pub fn idle_threshold_us(&self) -> f64 {
        self.idle_threshold_us
    }

    pub fn extract(&self, packets: &[Value]) -> Extraction {
        let flow = classify(packets);
        Extraction {
            features: compute(&flow, self.idle_threshold_us),
            dropped: flow.dropped,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_THRESHOLD_US)
    }
}
