use base64::{alphabet, engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig}, Engine};
use serde_json::{Map, Value};
use tracing::debug;

use crate::handler_error::HandlerError;

/// base64url, accepting both padded and unpadded segments
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
  &alphabet::URL_SAFE,
  GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
);

/// Payload of an ID token. Every field is optional and provider specific
/// fields are kept.
///
/// Source: https://openid.net/specs/openid-connect-core-1_0.html#StandardClaims
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityClaims(Map<String, Value>);

impl IdentityClaims {
  pub fn new(claims: Map<String, Value>) -> Self {
    IdentityClaims(claims)
  }

  /// String valued claim. Empty strings and other JSON types read as absent.
  pub fn string(&self, name: &str) -> Option<&str> {
    self.0.get(name)
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
  }

  /// `groups` as a list. Providers send either an array or a single string.
  pub fn groups(&self) -> Option<Vec<String>> {
    match self.0.get("groups")? {
      Value::Array(groups) => Some(
        groups.iter()
          .filter_map(Value::as_str)
          .map(str::to_string)
          .collect()
      ),
      Value::String(group) => Some(vec![group.clone()]),
      _ => None
    }
  }

  pub fn subject(&self) -> Option<&str> {
    self.string("sub")
  }
}

/// Decode the payload of a compact JWT.
///
/// Warning: this does not validate the JWS signature, issuer, audience or
/// expiry. The token must come straight from the provider's token endpoint
/// over TLS.
pub fn decode_unverified(jwt: &str) -> Result<IdentityClaims, HandlerError> {
  let segments = jwt.split('.').collect::<Vec<_>>();

  let [_header, payload, _signature] = segments.as_slice() else {
    return Err(HandlerError::MalformedToken(
      format!("expected 3 segments, found {}", segments.len()).into()
    ))
  };

  let bytes = SEGMENT_ENGINE.decode(payload)
    .map_err(|e| HandlerError::MalformedToken(format!("payload is not base64url: {e}").into()))?;

  let claims = match serde_json::from_slice(&bytes) {
    Ok(Value::Object(claims)) => claims,
    Ok(_) => return Err(HandlerError::MalformedToken("payload is not a JSON object".into())),
    Err(e) => return Err(HandlerError::MalformedToken(format!("payload is not JSON: {e}").into()))
  };

  debug!("decoded ID token payload without signature verification");

  Ok(IdentityClaims::new(claims))
}
