//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::application::use_cases::SubmitOrderError;
use crate::domain::order_execution::OrderError;

use super::response::ErrorResponse;

/// Error returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// 400.
    #[error("{0}")]
    BadRequest(String),
    /// 404.
    #[error("{0}")]
    NotFound(String),
    /// 500.
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SubmitOrderError> for HttpError {
    fn from(err: SubmitOrderError) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<OrderError> for HttpError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound { .. } => Self::NotFound(err.to_string()),
            e if e.is_validation() => Self::BadRequest(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
