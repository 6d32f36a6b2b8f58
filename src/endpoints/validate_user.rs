use axum::{body::Bytes, extract::State, http::header, response::{IntoResponse, Response}};
use tracing::error;

use crate::{consts::CORS_HEADERS, handler_error::HandlerError, state::AppState, webhook::{forward, ValidationRequest, WebhookReply}};

/// `POST /validate-user`: CORS enabled proxy in front of the validation webhook
#[worker::send]
pub async fn validate_user(
  State(state): State<AppState>,
  body: Bytes
) -> Response {
  match validate_user_result(&state, &body).await {
    Ok(ok) => ok,
    Err(e) => {
      error!("validate-user proxy: {e}");
      e.into_response()
    }
  }
}

async fn validate_user_result(
  state: &AppState,
  body: &[u8]
) -> Result<Response, HandlerError> {
  let request = serde_json::from_slice::<ValidationRequest>(body)
    .map_err(|e| HandlerError::InvalidParameter {
      name: "kerberosId",
      reason: format!("expected {{kerberosId, department}}: {e}").into()
    })?;

  if request.kerberos_id.trim().is_empty() {
    return Err(HandlerError::MissingParameter("kerberosId"))
  }

  let WebhookReply { status, body } = forward(
    &state.http,
    &state.config,
    &request
  ).await?;

  Ok((
    status,
    CORS_HEADERS,
    [(header::CONTENT_TYPE, "application/json")],
    body
  ).into_response())
}
