use axum::{extract::{rejection::QueryRejection, Query, State}, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use tracing::{debug, error};

use crate::{consts::CORS_HEADERS, handler_error::HandlerError, profiles::lookup_profile, state::AppState};

#[derive(Deserialize)]
pub struct ProfileParams {
  kerberos: Option<String>
}

/// `GET /get-user-profile?kerberos=…`
pub async fn get_user_profile(
  State(state): State<AppState>,
  params: Result<Query<ProfileParams>, QueryRejection>
) -> Response {
  match profile_result(&state, params) {
    Ok(ok) => ok,
    Err(e) => {
      error!("get-user-profile: {e}");
      e.into_response()
    }
  }
}

fn profile_result(
  state: &AppState,
  params: Result<Query<ProfileParams>, QueryRejection>
) -> Result<Response, HandlerError> {
  let Query(ProfileParams { kerberos }) = params?;

  let kerberos = kerberos
    .as_deref()
    .map(str::trim)
    .filter(|k| !k.is_empty())
    .ok_or(HandlerError::MissingParameter("kerberos"))?;

  let profile = lookup_profile(state.profiles.as_ref(), kerberos);
  debug!(kerberos, title = %profile.title, "resolved profile");

  Ok((CORS_HEADERS, Json(profile)).into_response())
}
