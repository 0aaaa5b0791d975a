use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// Provider answered but the payload could not be used.
    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// A newer request for the same key was issued while this one was in flight.
    #[error("Superseded by request #{latest}")]
    Superseded { latest: u64 },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Superseded { .. } => StatusCode::CONFLICT,
            AppError::Reqwest(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
