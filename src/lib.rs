//! FlowShield - Flow Timing Intrusion Classifier
//!
//! Scores one network flow per request from its packet timing.
//!
//! # Architecture
//!
//! ```text
//! POST /predict (JSON packets)
//!        │
//!        ▼
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Validation  │──▶│ Direction split  │──▶│ IAT features │──▶│ Classifier│
//! │ (presence)   │   │ fwd / bwd / all  │   │ (12 columns) │   │  (ONNX)   │
//! └──────────────┘   └──────────────────┘   └──────────────┘   └─────┬─────┘
//!                                                                    ▼
//!                                                  p_attack > threshold → verdict
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};

use logic::features::FeatureExtractor;
use logic::model::{DecisionThreshold, ModelState};
use logic::scoring::ScoringService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scoring: Arc<ScoringService>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, model: ModelState) -> Self {
        let scoring = ScoringService::new(
            model,
            FeatureExtractor::new(config.idle_threshold_us),
            DecisionThreshold::new(config.prediction_threshold),
        );

        Self {
            scoring: Arc::new(scoring),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/model/status", get(handlers::model::status))
        .route("/predict", post(handlers::predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
