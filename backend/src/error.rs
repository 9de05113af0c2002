use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AppError
///
/// Request-level failures that map onto an HTTP status with a JSON error body.
/// Rejected form records are *not* errors; they come back as a `ValidationOutcome`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown form '{0}'")]
    UnknownForm(String),

    #[error("form '{form}' has no stage '{stage}'")]
    UnknownStage { form: String, stage: String },

    #[error("this action requires the '{0}' role")]
    Forbidden(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnknownForm(_) | AppError::UnknownStage { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
