//! Router-level error responses.
//!
//! Every failure the edge router can hit is turned into one of these variants
//! before it reaches the client; nothing raw from the upstream or the asset
//! store leaks into a response body.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Failed to connect to API";
pub const NOT_FOUND_MESSAGE: &str = "Not Found";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body too large";

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    /// The upstream API could not be reached (DNS, refused, timeout, unreadable body).
    UpstreamUnavailable,
    /// An API request body exceeded the configured limit; nothing was forwarded.
    PayloadTooLarge,
    /// Neither the requested asset nor the SPA shell exists.
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UpstreamUnavailable => (
                self.status(),
                Json(ErrorBody {
                    error: UPSTREAM_UNAVAILABLE_MESSAGE,
                }),
            )
                .into_response(),
            AppError::PayloadTooLarge => (
                self.status(),
                Json(ErrorBody {
                    error: PAYLOAD_TOO_LARGE_MESSAGE,
                }),
            )
                .into_response(),
            AppError::NotFound => (
                self.status(),
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                NOT_FOUND_MESSAGE,
            )
                .into_response(),
        }
    }
}
