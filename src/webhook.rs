use axum::{body::Bytes, http::StatusCode};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{config::Config, handler_error::HandlerError};

/// Body accepted by `/validate-user` and forwarded unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
  pub kerberos_id: String,
  /// Any JSON value; an explicit `null` is forwarded, an absent key is not
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub department: Option<Value>
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
  Value::deserialize(deserializer).map(Some)
}

/// Webhook answer relayed to the browser as-is
pub struct WebhookReply {
  pub status: StatusCode,
  /// Raw JSON bytes, key order and formatting untouched
  pub body: Bytes
}

/// POST `request` to the validation webhook. Only 2xx JSON replies are relayed.
pub async fn forward(
  client: &reqwest::Client,
  config: &Config,
  request: &ValidationRequest
) -> Result<WebhookReply, HandlerError> {
  info!(kerberos_id = %request.kerberos_id, "forwarding validation request");

  let response = client.post(config.webhook_url.clone())
    .timeout(config.upstream_timeout)
    .json(request)
    .send()
    .await
    .map_err(HandlerError::Webhook)?;

  let status = response.status();
  if !status.is_success() {
    warn!(status = status.as_u16(), "validation webhook rejected request");
    return Err(HandlerError::WebhookStatus(status.as_u16()))
  }

  let body = response.bytes()
    .await
    .map_err(HandlerError::Webhook)?;

  serde_json::from_slice::<IgnoredAny>(&body)
    .map_err(|e| HandlerError::WebhookBody(e.to_string().into()))?;

  Ok(WebhookReply { status, body })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn round_trip(body: Value) -> Value {
    let request = serde_json::from_value::<ValidationRequest>(body).unwrap();
    serde_json::to_value(request).unwrap()
  }

  #[test]
  fn department_is_forwarded_as_sent() {
    assert_eq!(
      round_trip(json!({"kerberosId": "jdoe", "department": 16})),
      json!({"kerberosId": "jdoe", "department": 16})
    );
    assert_eq!(
      round_trip(json!({"kerberosId": "jdoe", "department": {"code": "AA"}})),
      json!({"kerberosId": "jdoe", "department": {"code": "AA"}})
    );
    assert_eq!(
      round_trip(json!({"kerberosId": "jdoe", "department": null})),
      json!({"kerberosId": "jdoe", "department": null})
    );
    assert_eq!(round_trip(json!({"kerberosId": "jdoe"})), json!({"kerberosId": "jdoe"}));
  }
}
