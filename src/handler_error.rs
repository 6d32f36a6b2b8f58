use std::borrow::Cow;

use axum::{extract::rejection::QueryRejection, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

use crate::consts::CORS_HEADERS;

#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
  // Caller input
  #[error(r#"Missing required parameter "{0}""#)]
  MissingParameter(&'static str),
  #[error(r#"Invalid parameter "{name}": {reason}"#)]
  InvalidParameter {
    name: &'static str,
    reason: Cow<'static, str>
  },
  #[error("Method not allowed")]
  MethodNotAllowed,
  // ID token
  #[error("Malformed ID token: {0}")]
  MalformedToken(Cow<'static, str>),
  // Identity provider
  #[error("Token exchange failed: {body}")]
  TokenEndpoint {
    status: u16,
    body: String
  },
  #[error("Token endpoint unreachable: {0}")]
  TokenTransport(#[source] reqwest::Error),
  #[error("Token endpoint returned an unreadable response: {0}")]
  TokenResponse(#[source] reqwest::Error),
  #[error("Token endpoint response did not contain an id_token.")]
  MissingIdToken,
  // Validation webhook
  #[error("Webhook responded with status: {0}")]
  WebhookStatus(u16),
  #[error("Webhook request failed: {0}")]
  Webhook(#[source] reqwest::Error),
  #[error("Webhook replied with invalid JSON: {0}")]
  WebhookBody(Cow<'static, str>),
  // Everything else
  #[error("Internal error: {0}")]
  Internal(Cow<'static, str>)
}

impl From<url::ParseError> for HandlerError {
  fn from(err: url::ParseError) -> Self {
    HandlerError::Internal(err.to_string().into())
  }
}

impl From<QueryRejection> for HandlerError {
  fn from(rejection: QueryRejection) -> Self {
    HandlerError::InvalidParameter {
      name: "query",
      reason: rejection.body_text().into()
    }
  }
}

/// JSON error envelope returned by every endpoint
#[derive(Serialize, Debug)]
pub struct ErrorBody {
  pub error: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diagnostic: Option<String>
}

impl HandlerError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::MissingParameter(_) | Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
      Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      Self::MalformedToken(_)
      | Self::TokenEndpoint { .. }
      | Self::TokenTransport(_)
      | Self::TokenResponse(_)
      | Self::MissingIdToken => StatusCode::BAD_GATEWAY,
      Self::WebhookStatus(_)
      | Self::Webhook(_)
      | Self::WebhookBody(_)
      | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR
    }
  }

  /// Stable machine readable `error` field
  pub fn code(&self) -> &'static str {
    match self {
      Self::MissingParameter(_) | Self::InvalidParameter { .. } => "missing_parameter",
      Self::MethodNotAllowed => "method_not_allowed",
      Self::MalformedToken(_) => "malformed_token",
      Self::TokenResponse(_) | Self::MissingIdToken => "protocol_error",
      Self::TokenEndpoint { .. }
      | Self::TokenTransport(_)
      | Self::WebhookStatus(_)
      | Self::Webhook(_)
      | Self::WebhookBody(_) => "upstream_error",
      Self::Internal(_) => "internal_error"
    }
  }

  fn body(&self) -> ErrorBody {
    let diagnostic = match self {
      Self::TokenEndpoint { status, .. } => Some(format!("provider status {status}")),
      _ => None
    };

    let message = match self {
      // don't leak internals to the browser
      Self::Internal(_) => None,
      e => Some(e.to_string())
    };

    ErrorBody {
      error: self.code(),
      message,
      diagnostic
    }
  }
}

impl IntoResponse for HandlerError {
  fn into_response(self) -> Response {
    (
      self.status(),
      CORS_HEADERS,
      Json(self.body())
    ).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn upstream_errors_map_to_the_callers_status_family() {
    let idp = HandlerError::TokenEndpoint {
      status: 401,
      body: r#"{"error":"invalid_grant"}"#.into()
    };
    assert_eq!(idp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(idp.code(), "upstream_error");
    assert_eq!(
      idp.body().message.as_deref(),
      Some(r#"Token exchange failed: {"error":"invalid_grant"}"#)
    );

    let hook = HandlerError::WebhookStatus(503);
    assert_eq!(hook.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(hook.code(), "upstream_error");
  }

  #[test]
  fn internal_errors_hide_their_message() {
    let body = HandlerError::Internal("secret detail".into()).body();
    assert_eq!(body.error, "internal_error");
    assert!(body.message.is_none());
  }
}
