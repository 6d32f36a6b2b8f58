use std::time::Duration;

use itertools::Itertools;
use openidconnect::{ClientId, ClientSecret, IssuerUrl, RedirectUrl};
use url::Url;
use worker::Env;

use crate::consts::{DEFAULT_CHATBOT_URL, DEFAULT_LOG_LEVEL, DEFAULT_UPSTREAM_TIMEOUT_SECS};

/// Declares every recognized environment key once. Generates the public
/// `EnvKey` enum and its `ALL` listing, whose string values match
/// the variant names.
macro_rules! env_keys {
  (
    // comma delimited key names (same as their values)
    $($name:ident),+
    // optional trailing comma
    $(,)?
  ) => {
    #[allow(non_camel_case_types)]
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum EnvKey {
      $($name,)+
    }

    impl EnvKey {
      pub const ALL: &'static [EnvKey] = &[$(EnvKey::$name,)+];

      pub fn as_str(self) -> &'static str {
        match self {
          $(EnvKey::$name => stringify!($name),)+
        }
      }
    }
  };
}

env_keys!(
  OIDC_ISSUER,
  OIDC_CLIENT_ID,
  OIDC_CLIENT_SECRET,
  OIDC_REDIRECT_URI,
  VALIDATION_WEBHOOK_URL,
  SAML_IDP_SSO_URL,
  CHATBOT_URL,
  LOG_LEVEL,
  UPSTREAM_TIMEOUT_SECS
);

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
  #[error("Missing configuration: {}", .0.iter().map(|k| k.as_str()).join(", "))]
  Missing(Vec<EnvKey>),
  #[error(r#"Invalid value for "{}": {reason}"#, .key.as_str())]
  Invalid {
    key: EnvKey,
    reason: String
  }
}

/// How the token exchange authenticates this client to the provider.
#[derive(Clone, Debug)]
pub enum ClientAuth {
  /// client_secret_basic
  Confidential(ClientSecret),
  /// public client, `client_id` in the form body
  Public
}

#[derive(Clone, Debug)]
pub struct Config {
  pub issuer: IssuerUrl,
  pub client_id: ClientId,
  pub client_auth: ClientAuth,
  pub redirect_uri: RedirectUrl,
  pub webhook_url: Url,
  pub saml_sso_url: Option<Url>,
  /// May be relative to the site serving the widget
  pub chatbot_url: String,
  pub log_level: String,
  pub upstream_timeout: Duration
}

impl Config {
  /// Load from the Worker environment. Secrets take precedence over
  /// plain vars of the same name.
  pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
    Self::from_lookup(|key| {
      env.secret(key)
        .map(|s| s.to_string())
        .or_else(|_| env.var(key).map(|v| v.to_string()))
        .ok()
    })
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>
  {
    // blank values count as unset
    let get = |key: EnvKey| lookup(key.as_str())
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty());

    let missing = [
      EnvKey::OIDC_ISSUER,
      EnvKey::OIDC_CLIENT_ID,
      EnvKey::OIDC_REDIRECT_URI,
      EnvKey::VALIDATION_WEBHOOK_URL
    ].into_iter()
      .filter(|key| get(*key).is_none())
      .collect::<Vec<_>>();

    if !missing.is_empty() {
      return Err(ConfigError::Missing(missing))
    }

    // presence checked above
    let required = |key: EnvKey| get(key).unwrap_or_default();

    let issuer = IssuerUrl::new(
      required(EnvKey::OIDC_ISSUER)
        .trim_end_matches('/')
        .to_string()
    ).map_err(|e| invalid(EnvKey::OIDC_ISSUER, e))?;

    let redirect_uri = RedirectUrl::new(required(EnvKey::OIDC_REDIRECT_URI))
      .map_err(|e| invalid(EnvKey::OIDC_REDIRECT_URI, e))?;

    let webhook_url = Url::parse(&required(EnvKey::VALIDATION_WEBHOOK_URL))
      .map_err(|e| invalid(EnvKey::VALIDATION_WEBHOOK_URL, e))?;

    let saml_sso_url = get(EnvKey::SAML_IDP_SSO_URL)
      .map(|v| Url::parse(&v))
      .transpose()
      .map_err(|e| invalid(EnvKey::SAML_IDP_SSO_URL, e))?;

    let client_auth = match get(EnvKey::OIDC_CLIENT_SECRET) {
      Some(secret) => ClientAuth::Confidential(ClientSecret::new(secret)),
      None => ClientAuth::Public
    };

    let upstream_timeout = match get(EnvKey::UPSTREAM_TIMEOUT_SECS) {
      None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
      Some(v) => match v.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => return Err(invalid(
          EnvKey::UPSTREAM_TIMEOUT_SECS,
          "expected a positive number of seconds"
        ))
      }
    };

    Ok(Config {
      issuer,
      client_id: ClientId::new(required(EnvKey::OIDC_CLIENT_ID)),
      client_auth,
      redirect_uri,
      webhook_url,
      saml_sso_url,
      chatbot_url: get(EnvKey::CHATBOT_URL)
        .unwrap_or_else(|| DEFAULT_CHATBOT_URL.to_string()),
      log_level: get(EnvKey::LOG_LEVEL)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
      upstream_timeout
    })
  }

  /// `{issuer}{path}`, e.g. `https://idp.example/oauth2/default/v1/token`
  pub fn issuer_endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
      "{issuer}{path}",
      issuer = self.issuer.as_str().trim_end_matches('/')
    ))
  }
}

fn invalid(key: EnvKey, reason: impl ToString) -> ConfigError {
  ConfigError::Invalid {
    key,
    reason: reason.to_string()
  }
}
