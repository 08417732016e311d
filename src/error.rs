//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::model::InferenceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("Empty packet data")]
    EmptyInput,

    #[error("Missing required fields in packet: {}", .fields.join(", "))]
    MissingFields { index: usize, fields: Vec<&'static str> },

    #[error("Invalid data format: {0}")]
    InvalidValueFormat(String),

    // Model errors
    #[error("Model not loaded. Check server logs.")]
    ModelUnavailable,

    // Generic errors
    #[error("Server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyInput
            | AppError::MissingFields { .. }
            | AppError::InvalidValueFormat(_) => StatusCode::BAD_REQUEST,
            AppError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::MissingFields { index, fields } => {
                tracing::debug!("Packet {} missing fields: {:?}", index, fields);
            }
            AppError::InternalError(msg) => {
                tracing::error!("Prediction error: {}", msg);
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
