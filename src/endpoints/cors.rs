use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::{consts::CORS_HEADERS, handler_error::HandlerError};

/// Answer a CORS preflight: 200, empty body
pub async fn preflight() -> Response {
  (StatusCode::OK, CORS_HEADERS).into_response()
}

/// Method router fallback, so a wrong verb still gets the JSON envelope
pub async fn method_not_allowed() -> Response {
  HandlerError::MethodNotAllowed.into_response()
}
