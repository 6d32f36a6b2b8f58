use axum::{body::Bytes, extract::{rejection::QueryRejection, Query, State}, response::{IntoResponse, Response}, Json};
use chrono::Utc;
use openidconnect::{AuthorizationCode, PkceCodeVerifier};
use serde::Deserialize;
use tracing::{error, info};

use crate::{consts::{CORS_HEADERS, NO_STORE_HEADERS}, handler_error::HandlerError, id_token::decode_unverified, state::AppState, token_exchange::exchange_code, user_metadata::normalize};

/// The browser posts the code from the provider redirect together with the
/// verifier it kept in session storage. The provider redirect itself may also
/// land here with both in the query.
#[derive(Deserialize, Default)]
pub struct CallbackParams {
  code: Option<String>,
  #[serde(alias = "code_verifier")]
  verifier: Option<String>
}

/// `GET /oidc-callback?code=…&verifier=…`
#[worker::send]
pub async fn oidc_callback_query(
  State(state): State<AppState>,
  params: Result<Query<CallbackParams>, QueryRejection>
) -> Response {
  match params {
    Ok(Query(params)) => respond(callback_result(&state, params).await),
    Err(rejection) => respond(Err(rejection.into()))
  }
}

/// `POST /oidc-callback` with JSON `{code, verifier}`
#[worker::send]
pub async fn oidc_callback_body(
  State(state): State<AppState>,
  body: Bytes
) -> Response {
  let params = if body.is_empty() {
    CallbackParams::default()
  } else {
    match serde_json::from_slice(&body) {
      Ok(params) => params,
      Err(e) => return respond(Err(HandlerError::InvalidParameter {
        name: "body",
        reason: format!("expected a JSON object: {e}").into()
      }))
    }
  };

  respond(callback_result(&state, params).await)
}

fn respond(result: Result<Response, HandlerError>) -> Response {
  match result {
    Ok(ok) => ok,
    Err(e) => {
      error!("oidc callback: {e}");
      e.into_response()
    }
  }
}

async fn callback_result(
  state: &AppState,
  CallbackParams { code, verifier }: CallbackParams
) -> Result<Response, HandlerError> {
  // Both are checked before any request leaves the worker
  let code = required(code, "code")?;
  let verifier = required(verifier, "verifier")?;

  let token_set = exchange_code(
    &state.http,
    &state.config,
    &AuthorizationCode::new(code),
    &PkceCodeVerifier::new(verifier)
  ).await?;

  let Some(id_token) = token_set.id_token else {
    return Err(HandlerError::MissingIdToken)
  };

  let claims = decode_unverified(&id_token)?;
  let metadata = normalize(&claims, Utc::now());

  info!(kerberos = %metadata.kerberos, "user signed in");

  Ok((
    NO_STORE_HEADERS,
    CORS_HEADERS,
    Json(metadata)
  ).into_response())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, HandlerError> {
  value.map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .ok_or(HandlerError::MissingParameter(name))
}
