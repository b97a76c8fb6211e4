//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Pricing(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::NotFound(what) => PricingErrorResponse {
                error_type: "not_found".to_string(),
                message: format!("{} not found", what),
                details: None,
            },
            AppError::Validation(msg) => PricingErrorResponse {
                error_type: "validation_error".to_string(),
                message: msg.clone(),
                details: None,
            },
            AppError::Pricing(e) => PricingErrorResponse {
                error_type: "validation_error".to_string(),
                message: e.to_string(),
                details: e.field().map(|field| json!({ "field": field })),
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                PricingErrorResponse {
                    error_type: "internal_error".to_string(),
                    message: "Database error".to_string(),
                    details: None,
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                PricingErrorResponse {
                    error_type: "internal_error".to_string(),
                    message: "Internal error".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
