//! Health and model status

use serde::Serialize;

use crate::logic::features::LayoutInfo;
use crate::logic::model::EngineStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelStatusResponse {
    #[serde(flatten)]
    pub engine: EngineStatus,
    pub threshold: f64,
    pub idle_threshold_us: f64,
    pub debug_mode: bool,
    pub layout: LayoutInfo,
}
