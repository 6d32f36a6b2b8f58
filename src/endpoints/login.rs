use axum::{extract::{rejection::QueryRejection, Query, State}, http::{header, StatusCode}, response::{IntoResponse, Response}};
use serde::Deserialize;
use tracing::{error, info};

use crate::{authorization::{parse_code_challenge, AuthorizationRequest}, consts::NO_STORE_HEADERS, handler_error::HandlerError, state::AppState};

#[derive(Deserialize)]
pub struct LoginParams {
  code_challenge: Option<String>
}

/// `GET /oidc-login`: send the browser to the provider's authorize endpoint
pub async fn oidc_login(
  State(state): State<AppState>,
  params: Result<Query<LoginParams>, QueryRejection>
) -> Response {
  match login_result(&state, params) {
    Ok(ok) => ok,
    Err(e) => {
      error!("{e}");
      e.into_response()
    }
  }
}

fn login_result(
  state: &AppState,
  params: Result<Query<LoginParams>, QueryRejection>
) -> Result<Response, HandlerError> {
  let Query(LoginParams { code_challenge }) = params?;

  let code_challenge = code_challenge
    .as_deref()
    .filter(|c| !c.is_empty())
    .map(parse_code_challenge)
    .transpose()?;

  let request = AuthorizationRequest::new(code_challenge);
  let redirect = request.authorize_url(&state.config)?;

  info!(pkce = request.code_challenge.is_some(), "redirecting to identity provider");

  // 302 rather than axum's `Redirect::to` (303)
  Ok((
    StatusCode::FOUND,
    NO_STORE_HEADERS,
    [(header::LOCATION, redirect.as_str())]
  ).into_response())
}
