use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::DispatchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown or disabled host: {0}")]
    UnknownHost(String),

    #[error("Failed to send message: {0}")]
    DeliveryFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownHost(host) => AppError::UnknownHost(host),
            failed @ DispatchError::DeliveryFailed { .. } => {
                let detail = match failed.last_failure() {
                    Some(last) => format!("{} (last: chat {}: {})", failed, last.chat_id, last.error),
                    None => failed.to_string(),
                };
                AppError::DeliveryFailed(detail)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPayload(_) | AppError::UnknownHost(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::DeliveryFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::InvalidPayload(_) => "INVALID_PAYLOAD",
            AppError::UnknownHost(_) => "UNKNOWN_HOST",
            AppError::DeliveryFailed(_) => "DELIVERY_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message returned to the caller; server-side details are hidden in production
    fn client_message(&self) -> String {
        if !is_production() {
            return self.to_string();
        }

        match self {
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::DeliveryFailed(_) => "Failed to send message".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InvalidPayload(_) | AppError::UnknownHost(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let log_message = self.to_string();

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.client_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
