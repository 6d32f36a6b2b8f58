use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{consts::KERBEROS_SUFFIX, id_token::IdentityClaims};

/// What the browser stores after login and uses to initialize the chat widget.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
  pub name: String,
  pub email: String,
  pub kerberos: String,
  pub first_name: String,
  pub last_name: String,
  pub groups: Vec<String>,
  pub department: String,
  pub title: String,
  /// ISO-8601, UTC
  pub login_time: String
}

/// Strip the institutional email domain from a username, if present.
pub fn kerberos_id(username: &str) -> &str {
  username.strip_suffix(KERBEROS_SUFFIX)
    .unwrap_or(username)
}

/// Map provider claims onto `UserMetadata`. Missing claims become empty values.
pub fn normalize(claims: &IdentityClaims, now: DateTime<Utc>) -> UserMetadata {
  let text = |name: &str| claims.string(name)
    .unwrap_or_default()
    .to_string();

  let given_name = claims.string("given_name");
  let family_name = claims.string("family_name");

  let name = match (claims.string("name"), given_name, family_name) {
    (Some(name), _, _) => name.to_string(),
    (None, Some(given), Some(family)) => format!("{given} {family}"),
    _ => String::new()
  };

  let username = claims.string("preferred_username")
    .or_else(|| claims.subject())
    .unwrap_or_default();

  UserMetadata {
    name,
    email: text("email"),
    kerberos: kerberos_id(username).to_string(),
    first_name: text("given_name"),
    last_name: text("family_name"),
    groups: claims.groups().unwrap_or_default(),
    department: text("department"),
    title: text("title"),
    login_time: now.to_rfc3339_opts(SecondsFormat::Millis, true)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::{json, Value};

  use super::*;

  fn claims(value: Value) -> IdentityClaims {
    let Value::Object(map) = value else { panic!("claims must be an object") };
    IdentityClaims::new(map)
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
  }

  #[test]
  fn maps_every_claim() {
    let metadata = normalize(&claims(json!({
      "sub": "00u1",
      "name": "Jane Doe",
      "email": "jdoe@mit.edu",
      "preferred_username": "jdoe@mit.edu",
      "given_name": "Jane",
      "family_name": "Doe",
      "groups": ["staff"],
      "department": "AeroAstro",
      "title": "Professor"
    })), now());

    assert_eq!(metadata, UserMetadata {
      name: "Jane Doe".into(),
      email: "jdoe@mit.edu".into(),
      kerberos: "jdoe".into(),
      first_name: "Jane".into(),
      last_name: "Doe".into(),
      groups: vec!["staff".into()],
      department: "AeroAstro".into(),
      title: "Professor".into(),
      login_time: "2024-03-01T12:30:00.000Z".into()
    });
  }

  #[test]
  fn builds_name_from_given_and_family() {
    let both = normalize(&claims(json!({"given_name": "Jane", "family_name": "Doe"})), now());
    assert_eq!(both.name, "Jane Doe");

    let one = normalize(&claims(json!({"given_name": "Jane"})), now());
    assert_eq!(one.name, "");
    assert_eq!(one.first_name, "Jane");
  }

  #[test]
  fn kerberos_falls_back_to_subject() {
    let from_sub = normalize(&claims(json!({"sub": "asmith@mit.edu"})), now());
    assert_eq!(from_sub.kerberos, "asmith");

    let foreign = normalize(&claims(json!({"preferred_username": "asmith@example.com"})), now());
    assert_eq!(foreign.kerberos, "asmith@example.com");

    let neither = normalize(&claims(json!({})), now());
    assert_eq!(neither.kerberos, "");
    assert!(neither.groups.is_empty());
  }

  #[test]
  fn only_a_trailing_suffix_is_stripped() {
    assert_eq!(kerberos_id("jdoe@mit.edu"), "jdoe");
    assert_eq!(kerberos_id("jdoe@mit.edu.evil"), "jdoe@mit.edu.evil");
    assert_eq!(kerberos_id("jdoe"), "jdoe");
  }

  #[test]
  fn serializes_camel_case() {
    let value = serde_json::to_value(normalize(&claims(json!({})), now())).unwrap();
    assert!(value.get("firstName").is_some());
    assert!(value.get("loginTime").is_some());
  }
}
