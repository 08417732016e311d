//! Prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::models::PredictResponse;
use crate::{AppError, AppResult, AppState};

/// Classify one flow.
///
/// The body is parsed by hand so malformed JSON maps to
/// `400 Invalid data format` instead of axum's rejection. An unloaded model
/// answers 503 before the body is looked at.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictResponse>> {
    if !state.scoring.model().is_loaded() {
        return Err(AppError::ModelUnavailable);
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidValueFormat(e.to_string()))?;

    // Extraction + ONNX run are CPU-bound and serialize on the session lock.
    let scoring = state.scoring.clone();
    let scored = tokio::task::spawn_blocking(move || scoring.score(&payload))
        .await
        .map_err(|e| AppError::InternalError(format!("scoring task failed: {}", e)))??;

    if scored.verdict.is_attack {
        tracing::info!("Attack flow detected (p_attack = {:.4})", scored.probabilities[1]);
    }

    Ok(Json(PredictResponse::from_scored(scored, state.config.debug_mode)))
}
