use axum::http::header;
use base64::{engine::general_purpose::STANDARD, Engine};
use openidconnect::{AuthorizationCode, PkceCodeVerifier};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{config::{ClientAuth, Config}, consts::TOKEN_PATH, handler_error::HandlerError};

/// Sources:
///   https://www.rfc-editor.org/rfc/rfc6749#section-5.1
///   https://openid.net/specs/openid-connect-core-1_0.html#TokenResponse
#[derive(Deserialize, Debug)]
pub struct TokenSet {
  // the widget only needs identity, the access token is never forwarded
  #[allow(dead_code)]
  pub access_token: Option<String>,
  pub id_token: Option<String>,
  pub refresh_token: Option<String>,
  pub token_type: Option<String>,
  pub expires_in: Option<u64>,
  pub scope: Option<String>
}

/// Exchange an authorization code and PKCE verifier for tokens.
/// One attempt, bounded by the configured upstream timeout.
///
/// Source: https://www.rfc-editor.org/rfc/rfc7636#section-4.5
pub async fn exchange_code(
  client: &reqwest::Client,
  config: &Config,
  code: &AuthorizationCode,
  verifier: &PkceCodeVerifier
) -> Result<TokenSet, HandlerError> {
  let token_endpoint = config.issuer_endpoint(TOKEN_PATH)?;

  let mut form = vec![
    ("grant_type", "authorization_code"),
    ("code", code.secret().as_str()),
    ("redirect_uri", config.redirect_uri.as_str()),
    ("code_verifier", verifier.secret().as_str())
  ];

  let mut request = client.post(token_endpoint)
    .timeout(config.upstream_timeout);

  request = match &config.client_auth {
    // client_secret_basic
    // Source: https://www.rfc-editor.org/rfc/rfc6749#section-2.3.1
    ClientAuth::Confidential(secret) => request.header(
      header::AUTHORIZATION,
      format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", config.client_id.as_str(), secret.secret()))
      )
    ),
    ClientAuth::Public => {
      form.push(("client_id", config.client_id.as_str()));
      request
    }
  };

  let response = request
    .form(&form)
    .send()
    .await
    .map_err(HandlerError::TokenTransport)?;

  let status = response.status();
  if !status.is_success() {
    // the provider's error body is what the caller needs to debug this
    let body = response.text()
      .await
      .unwrap_or_default();

    warn!(status = status.as_u16(), "token exchange rejected by provider");

    return Err(HandlerError::TokenEndpoint {
      status: status.as_u16(),
      body
    })
  }

  let token_set = response.json::<TokenSet>()
    .await
    .map_err(HandlerError::TokenResponse)?;

  if token_set.id_token.is_none() {
    return Err(HandlerError::MissingIdToken)
  }

  info!(
    token_type = token_set.token_type.as_deref().unwrap_or_default(),
    expires_in = token_set.expires_in.unwrap_or_default(),
    scope = token_set.scope.as_deref().unwrap_or_default(),
    refresh_token = token_set.refresh_token.is_some(),
    "token exchange succeeded"
  );

  Ok(token_set)
}
