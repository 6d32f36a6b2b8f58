use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use getrandom::getrandom;
use openidconnect::{CsrfToken, Nonce};
use url::Url;

use crate::{config::Config, consts::{AUTHORIZE_PATH, OIDC_SCOPES}, handler_error::HandlerError};

/// Parameters of one login attempt. Nothing here is persisted; state and
/// nonce are not checked again on callback.
///
/// Sources:
///  https://www.rfc-editor.org/rfc/rfc6749.html#section-4.1.1
///  https://openid.net/specs/openid-connect-core-1_0.html#AuthRequest
pub struct AuthorizationRequest {
  pub state: CsrfToken,
  pub nonce: Nonce,
  /// Derived by the browser from the verifier it keeps in session storage
  pub code_challenge: Option<CodeChallenge>
}

/// S256 PKCE challenge computed by the browser. The verifier never
/// reaches this service until the token exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeChallenge(String);

impl CodeChallenge {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl AuthorizationRequest {
  pub fn new(code_challenge: Option<CodeChallenge>) -> Self {
    AuthorizationRequest {
      state: CsrfToken::new(new_token::<16>()),
      nonce: Nonce::new(new_token::<16>()),
      code_challenge
    }
  }

  /// `{issuer}/v1/authorize?client_id=…&response_type=code&scope=…`
  pub fn authorize_url(&self, config: &Config) -> Result<Url, HandlerError> {
    let mut url = config.issuer_endpoint(AUTHORIZE_PATH)?;

    let mut query = url.query_pairs_mut();
    query.append_pair("client_id", config.client_id.as_str());
    query.append_pair("response_type", "code");
    query.append_pair("scope", OIDC_SCOPES);
    query.append_pair("redirect_uri", config.redirect_uri.as_str());
    query.append_pair("state", self.state.secret());
    query.append_pair("nonce", self.nonce.secret());
    if let Some(challenge) = &self.code_challenge {
      query.append_pair("code_challenge", challenge.as_str());
      query.append_pair("code_challenge_method", "S256");
    }
    drop(query);

    Ok(url)
  }
}

/// Validate a browser supplied S256 challenge: base64url of a SHA-256 digest.
///
/// Source: https://www.rfc-editor.org/rfc/rfc7636#section-4.2
pub fn parse_code_challenge(challenge: &str) -> Result<CodeChallenge, HandlerError> {
  let invalid = |reason: &'static str| HandlerError::InvalidParameter {
    name: "code_challenge",
    reason: reason.into()
  };

  let digest = URL_SAFE_NO_PAD.decode(challenge)
    .map_err(|_| invalid("must be unpadded base64url"))?;

  if digest.len() != 32 {
    return Err(invalid("must encode a 32 byte SHA-256 digest"))
  }

  Ok(CodeChallenge(challenge.to_string()))
}

/// Random URL-safe token with `BYTES` bytes of entropy
pub fn new_token<const BYTES: usize>() -> String {
  let mut rand_buf = [0u8; BYTES];
  // only fails without a platform entropy source
  getrandom(&mut rand_buf).unwrap();
  URL_SAFE_NO_PAD.encode(rand_buf)
}
