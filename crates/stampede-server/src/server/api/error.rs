//! API error responses.
//!
//! Maps failures onto the wire contract: structured 400 bodies for client
//! mistakes, a bare 404 for unknown job IDs, and a 500 for internal faults.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stampede_core::Error;

#[derive(Debug)]
pub enum ApiError {
    /// The request body was not valid JSON (or not JSON at all).
    MalformedBody { errormsg: String },
    /// The body parsed but the spec is unusable (bad pool size, iterations,
    /// headers).
    InvalidSpec { errormsg: String },
    /// The `{id}` path parameter was not a number.
    InvalidId,
    /// No job with the requested ID was ever registered.
    NotFound,
    /// Dispatcher-side failure the client cannot fix.
    Internal { context: String },
}

impl ApiError {
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidSpec { reason } => Self::InvalidSpec { errormsg: reason },
            Error::Lane { context } | Error::Client { context } => Self::Internal { context },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedBody { errormsg } => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Malformed JSON", "errormsg": errormsg})),
            )
                .into_response(),
            Self::InvalidSpec { errormsg } => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid traffic spec", "errormsg": errormsg})),
            )
                .into_response(),
            Self::InvalidId => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid traffic ID"})),
            )
                .into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Internal { context } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal error", "errormsg": context})),
            )
                .into_response(),
        }
    }
}
