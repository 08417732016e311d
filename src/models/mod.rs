//! Request/response types

pub mod prediction;
pub mod status;

pub use prediction::{PredictResponse, PredictionDetails};
pub use status::{HealthResponse, ModelStatusResponse};
