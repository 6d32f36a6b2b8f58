use axum::{body::Bytes, extract::State, http::{header, StatusCode}, response::{Html, IntoResponse, Response}};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{consts::NO_STORE_HEADERS, handler_error::HandlerError, saml::{parse_saml_response, SamlIdentity}, state::AppState};

/// Shown when no SAML IdP is configured
const SAML_PLACEHOLDER: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; padding: 20px;">
    <h1>Login</h1>
    <p>SAML sign-in is not configured for this deployment.</p>
    <p><a href="/oidc-login">Continue with single sign-on</a></p>
  </body>
</html>
"#;

/// Source: https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf (3.5.3)
#[derive(Deserialize)]
pub struct SamlForm {
  #[serde(rename = "SAMLResponse")]
  saml_response: Option<String>
}

/// `GET /saml-login`: IdP initiated SSO, superseded by `/oidc-login`
pub async fn saml_login(State(state): State<AppState>) -> Response {
  let Some(sso_url) = &state.config.saml_sso_url else {
    return Html(SAML_PLACEHOLDER).into_response()
  };

  let mut redirect = sso_url.clone();
  redirect.query_pairs_mut()
    .append_pair("RelayState", &state.config.chatbot_url);

  (
    StatusCode::FOUND,
    NO_STORE_HEADERS,
    [(header::LOCATION, redirect.as_str())]
  ).into_response()
}

/// `POST /saml-callback`: assertion consumer service
pub async fn saml_callback(
  State(state): State<AppState>,
  body: Bytes
) -> Response {
  match saml_callback_result(&state, &body) {
    Ok(ok) => ok,
    Err(e) => {
      error!("saml callback: {e}");
      e.into_response()
    }
  }
}

fn saml_callback_result(state: &AppState, body: &[u8]) -> Result<Response, HandlerError> {
  let SamlForm { saml_response } = serde_urlencoded::from_bytes(body)
    .map_err(|e| HandlerError::InvalidParameter {
      name: "body",
      reason: format!("expected a form body: {e}").into()
    })?;

  let Some(saml_response) = saml_response.filter(|r| !r.is_empty()) else {
    return Err(HandlerError::MissingParameter("SAMLResponse"))
  };

  warn!("accepting SAML assertion on the legacy path");

  let SamlIdentity { kerberos, email, name } = parse_saml_response(&saml_response)?;

  let query = serde_urlencoded::to_string([
    ("kerberos", kerberos.as_str()),
    ("email", email.as_str()),
    ("name", name.as_str())
  ]).map_err(|e| HandlerError::Internal(e.to_string().into()))?;

  // CHATBOT_URL may be relative, so it isn't parsed as a `Url`
  let separator = if state.config.chatbot_url.contains('?') { '&' } else { '?' };
  let location = format!("{}{separator}{query}", state.config.chatbot_url);

  let cookie = format!(
    "kerberos={}; Path=/; HttpOnly; Secure; SameSite=Lax",
    url::form_urlencoded::byte_serialize(kerberos.as_bytes()).collect::<String>()
  );

  info!(kerberos = %kerberos, "user signed in through SAML");

  Ok((
    StatusCode::FOUND,
    NO_STORE_HEADERS,
    [
      (header::LOCATION, location),
      (header::SET_COOKIE, cookie)
    ]
  ).into_response())
}
