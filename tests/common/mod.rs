#![allow(dead_code)]

use std::collections::HashMap;

use axum::{body::{to_bytes, Body}, http::{Request, Response}, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chat_widget_oidc::{router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt; // oneshot

pub const CLIENT_ID: &str = "abc";
pub const REDIRECT_URI: &str = "https://bot.example/callback.html";

/// Configuration pointing the provider and webhook at `upstream`
pub fn test_config(upstream: &str, extra: &[(&str, &str)]) -> Config {
  let mut values = HashMap::from([
    ("OIDC_ISSUER".to_string(), format!("{upstream}/oauth2/default")),
    ("OIDC_CLIENT_ID".to_string(), CLIENT_ID.to_string()),
    ("OIDC_REDIRECT_URI".to_string(), REDIRECT_URI.to_string()),
    ("VALIDATION_WEBHOOK_URL".to_string(), format!("{upstream}/hook"))
  ]);
  values.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

  Config::from_lookup(|key| values.get(key).cloned()).unwrap()
}

pub fn test_app(config: Config) -> Router {
  router(AppState::new(config))
}

/// Unsigned compact JWT carrying `claims`
pub fn jwt(claims: &Value) -> String {
  format!(
    "{}.{}.c2lnbmF0dXJl",
    URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
    URL_SAFE_NO_PAD.encode(claims.to_string())
  )
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
  app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
  to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
  serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
  response.headers()
    .get(name)
    .unwrap_or_else(|| panic!("missing header {name}"))
    .to_str()
    .unwrap()
}
