//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::RenderError;

/// API error response body.
///
/// Every failure serializes to this envelope; `details` is only present when
/// there is an underlying cause worth surfacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal {
        message: String,
        details: Option<String>,
    },
    /// Repository error, wrapped with the endpoint's user-facing message
    Repository {
        message: String,
        source: RepositoryError,
    },
}

impl AppError {
    pub fn repository(message: impl Into<String>, source: RepositoryError) -> Self {
        AppError::Repository {
            message: message.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            AppError::Internal { message, details } => {
                tracing::error!(error = %message, details = ?details, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: message,
                        details,
                    },
                )
            }
            AppError::Repository { message, source } => {
                tracing::error!(error = %source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: message,
                        details: Some(source.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::internal("Failed to export data", err.to_string())
    }
}
