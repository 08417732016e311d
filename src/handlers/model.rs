//! Model status handler

use axum::{extract::State, Json};

use crate::models::ModelStatusResponse;
use crate::AppState;

pub async fn status(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    let scoring = &state.scoring;

    Json(ModelStatusResponse {
        engine: scoring.engine_status(),
        threshold: scoring.threshold().get(),
        idle_threshold_us: scoring.idle_threshold_us(),
        debug_mode: state.config.debug_mode,
        layout: scoring.layout(),
    })
}
