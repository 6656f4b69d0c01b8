//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"error": "<message>"}`; server-side failures are captured to Sentry and
//! logged, and their details are never sent to the client.

use axum::{
    Json,
    extract::{FromRequest, multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bintrack_core::PlatformError;

use crate::services::{InventoryError, PlatformServiceError, UploadError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Inventory operation failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Platform list operation failed.
    #[error(transparent)]
    Platform(#[from] PlatformServiceError),

    /// Upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Inventory(InventoryError::NotFound(_))
            | Self::Platform(PlatformServiceError::Platform(PlatformError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            Self::Inventory(InventoryError::InvalidArgument(_))
            | Self::Platform(PlatformServiceError::Platform(_))
            | Self::Upload(
                UploadError::Empty | UploadError::TooLarge { .. } | UploadError::UnsupportedType(_),
            )
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Inventory(InventoryError::Storage(_))
            | Self::Platform(PlatformServiceError::Storage(_))
            | Self::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Inventory(InventoryError::NotFound(_)) => "Item not found".to_string(),
            Self::Platform(PlatformServiceError::Platform(PlatformError::NotFound(_))) => {
                "Platform not found".to_string()
            }
            _ if self.status().is_server_error() => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

/// JSON request body whose rejections render as [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
