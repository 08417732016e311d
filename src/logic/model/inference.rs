//! Inference Engine - ONNX Runtime Integration
//!
//! Load model một lần lúc khởi động, dùng chung read-only cho mọi request.
//!
//! The classifier is a binary probability model exported to ONNX (e.g. a
//! scikit-learn pipeline converted with `zipmap=False`). It takes a `1 x 12`
//! `f32` tensor in [`FEATURE_LAYOUT`](crate::logic::features::FEATURE_LAYOUT)
//! order and returns `[p_benign, p_attack]`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Preferred probability output name (skl2onnx convention)
pub const PROBABILITY_OUTPUT: &str = "probabilities";

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("invalid model input: {0}")]
    Input(String),

    #[error("inference failed: {0}")]
    Runtime(String),

    #[error("unexpected model output: {0}")]
    Output(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub output_name: String,
    pub features: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Opaque binary scoring capability
pub trait Classifier: Send + Sync {
    /// `[p_benign, p_attack]` for one flow
    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError>;

    fn metadata(&self) -> ModelMetadata;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load ONNX model từ file
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path);

        if !std::path::Path::new(model_path).exists() {
            return Err(InferenceError::NotFound(model_path.to_string()));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Load(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(format!("optimization level: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Load("model defines no outputs".to_string()))?;

        let metadata = ModelMetadata {
            model_path: model_path.to_string(),
            model_type: "onnx".to_string(),
            output_name: output_name.clone(),
            features: FEATURE_COUNT,
            loaded_at: chrono::Utc::now(),
        };

        tracing::info!("ONNX model loaded (probability output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let input: Vec<f32> = features.as_slice().iter().map(|&v| v as f32).collect();

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), input)
            .map_err(|e| InferenceError::Input(e.to_string()))?;
        let input_tensor = Tensor::from_array(input_array)
            .map_err(|e| InferenceError::Input(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError::Output(format!("missing output '{}'", self.output_name)))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Output(e.to_string()))?;

        probabilities_from(data)
    }

    fn metadata(&self) -> ModelMetadata {
        self.metadata.clone()
    }
}

/// First row of a `[n, 2]` probability tensor
pub fn probabilities_from(data: &[f32]) -> Result<[f64; 2], InferenceError> {
    match data {
        [p_benign, p_attack, ..] if p_benign.is_finite() && p_attack.is_finite() => {
            Ok([*p_benign as f64, *p_attack as f64])
        }
        [_, _, ..] => Err(InferenceError::Output("non-finite probability".to_string())),
        _ => Err(InferenceError::Output(format!(
            "expected 2 class probabilities, got {}",
            data.len()
        ))),
    }
}

// ============================================================================
// MODEL STATE
// ============================================================================

/// Outcome of the startup model load, fixed for the life of the process
#[derive(Clone)]
pub enum ModelState {
    Loaded(Arc<dyn Classifier>),
    Unavailable { reason: String },
}

impl ModelState {
    pub fn load(model_path: &str) -> Self {
        match OnnxClassifier::load(model_path) {
            Ok(classifier) => ModelState::Loaded(Arc::new(classifier)),
            Err(e) => {
                tracing::error!("Error loading model: {}", e);
                ModelState::Unavailable { reason: e.to_string() }
            }
        }
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        match self {
            ModelState::Loaded(classifier) => Some(classifier),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Loaded(classifier) => f
                .debug_tuple("Loaded")
                .field(&classifier.metadata().model_path)
                .finish(),
            ModelState::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Latency stats
#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceStats {
    pub fn record(&self, latency_us: u64) {
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f64 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.count();
        if count > 0 {
            (sum as f64 / count as f64) / 1000.0
        } else {
            0.0
        }
    }
}

/// Engine status for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model: Option<ModelMetadata>,
    pub unavailable_reason: Option<String>,
    pub inference_device: String,
    pub avg_latency_ms: f64,
    pub inference_count: u64,
}

impl EngineStatus {
    pub fn collect(state: &ModelState, stats: &InferenceStats) -> Self {
        let (model, unavailable_reason) = match state {
            ModelState::Loaded(classifier) => (Some(classifier.metadata()), None),
            ModelState::Unavailable { reason } => (None, Some(reason.clone())),
        };

        Self {
            model_loaded: state.is_loaded(),
            model,
            unavailable_reason,
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: stats.avg_latency_ms(),
            inference_count: stats.count(),
        }
    }
}
