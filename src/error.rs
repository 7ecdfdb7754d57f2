//! Request-fatal errors raised while producing a compliance report.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::LocationId;

// ---

/// Errors that abort a report request. None of them are retried.
#[derive(Debug, Error)]
pub enum ReportError {
    // ---
    /// Rejected before any storage access.
    #[error("invalid report request: {0}")]
    InvalidRange(String),

    /// A window boundary falls in a DST fold or gap of the reference timezone.
    #[error("local time {local} is ambiguous or does not exist in {timezone}")]
    AmbiguousLocalTime {
        local: NaiveDateTime,
        timezone: String,
    },

    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ReportError {
    // ---
    /// HTTP status the web layer reports for this error.
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            ReportError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            ReportError::UnknownLocation(_) => StatusCode::NOT_FOUND,
            ReportError::AmbiguousLocalTime { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        let message = match &self {
            ReportError::Storage(e) => {
                error!("Storage failure while building report: {}", e);
                "Failed to read sensor data".to_string()
            }
            other => {
                warn!("Rejected report request: {}", other);
                other.to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
