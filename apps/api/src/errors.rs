use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::mail::DispatchError;
use crate::relay::validation::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid form data: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Dispatch(DispatchError),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotConfigured(reason) => AppError::Configuration(reason),
            other => AppError::Dispatch(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(e) => {
                tracing::info!("Rejected submission: {e}");
                e.to_string()
            }
            AppError::BadRequest(_) => {
                tracing::info!("{self}");
                self.to_string()
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                msg.clone()
            }
            AppError::Dispatch(e) => {
                tracing::error!("Mail dispatch failed: {e:?}");
                e.to_string()
            }
        };

        (self.status(), Json(json!({ "message": message }))).into_response()
    }
}
