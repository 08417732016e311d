//! Features Module - Flow Feature Extraction Engine
//!
//! packets → direction split → IAT statistics → 12-column vector.
//! Pure CPU work; no I/O, no shared state.

pub mod direction;
pub mod layout;
pub mod timing;
pub mod vector;


// Re-export common types
pub use direction::{DroppedPacket, FlowTimestamps};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use timing::DEFAULT_IDLE_THRESHOLD_US;
pub use vector::{Extraction, FeatureExtractor, FeatureVector};
