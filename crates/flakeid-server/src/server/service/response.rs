//! Wire format of the `/id64` endpoint.
//!
//! Success bodies carry the ID twice, as a JSON number and as a decimal
//! string for clients that cannot represent 64-bit integers exactly:
//!
//! ```json
//! {"numeric": 58748935, "string": "58748935"}
//! ```
//!
//! Failures carry a stable `code` and a human readable `message`:
//!
//! | Error | Status | Code |
//! |---|---|---|
//! | `NumberOverflow` | 429 Too Many Requests | `ID_OVERFLOW` |
//! | `TimestampOverflow` | 503 Service Unavailable | `TIMESTAMP_OVERFLOW` |
//! | anything else | 500 Internal Server Error | `ERROR` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flakeid::Error;
use serde::{Deserialize, Serialize};

use crate::server::telemetry::increment_id_errors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub numeric: u64,
    pub string: String,
}

impl From<u64> for IdResponse {
    fn from(id: u64) -> Self {
        Self {
            numeric: id,
            string: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// A generation failure on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status, code and message for this error.
    pub fn parts(&self) -> (StatusCode, ErrorResponse) {
        match &self.0 {
            Error::NumberOverflow { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(
                    "ID_OVERFLOW",
                    "the incremental number value is overflown, try later",
                ),
            ),
            Error::TimestampOverflow { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(
                    "TIMESTAMP_OVERFLOW",
                    "the timestamp value is overflown, the service is unavailable",
                ),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("ERROR", other.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        tracing::error!(error = %self.0, code = %body.code, "failed to generate id");
        increment_id_errors(match &self.0 {
            Error::NumberOverflow { .. } => "number_overflow",
            Error::TimestampOverflow { .. } => "timestamp_overflow",
            _ => "other",
        });
        (status, Json(body)).into_response()
    }
}
