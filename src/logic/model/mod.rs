//! Model Module - Classifier capability + decision threshold
//!
//! Model được load một lần, inject vào scoring service.

pub mod inference;
pub mod threshold;

// Re-export common types
pub use inference::{
    Classifier, EngineStatus, InferenceError, InferenceStats, ModelMetadata, ModelState,
    OnnxClassifier,
};
pub use threshold::{DecisionThreshold, DEFAULT_PREDICTION_THRESHOLD};
