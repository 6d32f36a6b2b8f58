use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD, Engine};
use quick_xml::{events::Event, Reader};
use tracing::debug;

use crate::{handler_error::HandlerError, user_metadata::kerberos_id};

/// Identity attributes pulled out of a SAML assertion
#[derive(Debug, Default, PartialEq)]
pub struct SamlIdentity {
  pub kerberos: String,
  pub email: String,
  pub name: String
}

fn invalid(reason: impl Into<String>) -> HandlerError {
  HandlerError::InvalidParameter {
    name: "SAMLResponse",
    reason: Cow::Owned(reason.into())
  }
}

/// Decode a base64 `SAMLResponse` form value and read its attribute statement.
///
/// Warning: like the OIDC path this trusts the assertion without checking
/// its XML signature or conditions.
pub fn parse_saml_response(encoded: &str) -> Result<SamlIdentity, HandlerError> {
  // form encoders sometimes wrap long values
  let compact = encoded.split_whitespace()
    .collect::<String>();

  let xml = STANDARD.decode(compact)
    .map_err(|e| invalid(format!("not base64: {e}")))?;
  let xml = String::from_utf8(xml)
    .map_err(|_| invalid("not UTF-8"))?;

  let mut kerberos = None;
  let mut email = None;
  let mut name = None;

  // Attribute names vary between IdPs. Matching is case sensitive and a
  // later attribute overrides an earlier one.
  for (attribute, value) in attributes(&xml)? {
    if attribute.contains("kerberos") {
      kerberos = Some(value.clone());
    }
    if attribute.contains("email") {
      email = Some(value.clone());
    }
    if attribute.contains("name") {
      name = Some(value);
    }
  }

  let Some(kerberos) = kerberos else {
    return Err(invalid("assertion has no kerberos attribute"))
  };

  debug!("parsed SAML assertion without signature verification");

  Ok(SamlIdentity {
    kerberos: kerberos_id(&kerberos).to_string(),
    email: email.unwrap_or_default(),
    name: name.unwrap_or_default()
  })
}

/// `(Name, first AttributeValue)` of every `Attribute` element, in document order
fn attributes(xml: &str) -> Result<Vec<(String, String)>, HandlerError> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut found = Vec::new();
  // Name of the Attribute element we're inside of, and whether its value was taken
  let mut current: Option<(String, bool)> = None;
  let mut in_value = false;

  loop {
    match reader.read_event().map_err(|e| invalid(format!("malformed XML: {e}")))? {
      Event::Start(e) => match e.local_name().as_ref() {
        b"Attribute" => {
          let name = e.try_get_attribute("Name")
            .map_err(|e| invalid(format!("malformed XML: {e}")))?
            .map(|a| a.unescape_value().map(|v| v.into_owned()))
            .transpose()
            .map_err(|e| invalid(format!("malformed XML: {e}")))?
            .unwrap_or_default();
          current = Some((name, false));
        },
        b"AttributeValue" => in_value = true,
        _ => ()
      },
      Event::Text(t) if in_value => {
        if let Some((name, taken @ false)) = &mut current {
          let value = t.unescape()
            .map_err(|e| invalid(format!("malformed XML: {e}")))?;
          found.push((name.clone(), value.into_owned()));
          *taken = true;
        }
      },
      Event::End(e) => match e.local_name().as_ref() {
        b"Attribute" => current = None,
        b"AttributeValue" => in_value = false,
        _ => ()
      },
      Event::Eof => break,
      _ => ()
    }
  }

  Ok(found)
}

#[cfg(test)]
mod tests {
  use super::*;

  const ASSERTION: &str = r#"<?xml version="1.0"?>
<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">
  <saml:Assertion>
    <saml:AttributeStatement>
      <saml:Attribute Name="urn:mit:kerberosId">
        <saml:AttributeValue>jdoe@mit.edu</saml:AttributeValue>
      </saml:Attribute>
      <saml:Attribute Name="email">
        <saml:AttributeValue>jdoe@mit.edu</saml:AttributeValue>
        <saml:AttributeValue>john.doe@mit.edu</saml:AttributeValue>
      </saml:Attribute>
      <saml:Attribute Name="name">
        <saml:AttributeValue>John O&apos;Doe</saml:AttributeValue>
      </saml:Attribute>
      <saml:Attribute Name="givenName">
        <saml:AttributeValue>John</saml:AttributeValue>
      </saml:Attribute>
    </saml:AttributeStatement>
  </saml:Assertion>
</samlp:Response>"#;

  #[test]
  fn reads_identity_attributes() {
    let identity = parse_saml_response(&STANDARD.encode(ASSERTION)).unwrap();

    assert_eq!(identity, SamlIdentity {
      kerberos: "jdoe".into(),
      email: "jdoe@mit.edu".into(),
      name: "John O'Doe".into()
    });
  }

  #[test]
  fn attribute_matching_is_case_sensitive_and_last_wins() {
    let xml = r#"<Response>
      <Attribute Name="kerberos"><AttributeValue>first@mit.edu</AttributeValue></Attribute>
      <Attribute Name="displayName"><AttributeValue>Ignored</AttributeValue></Attribute>
      <Attribute Name="KERBEROS"><AttributeValue>ignored</AttributeValue></Attribute>
      <Attribute Name="urn:kerberos"><AttributeValue>second@mit.edu</AttributeValue></Attribute>
    </Response>"#;

    let identity = parse_saml_response(&STANDARD.encode(xml)).unwrap();
    assert_eq!(identity, SamlIdentity {
      kerberos: "second".into(),
      email: "".into(),
      name: "".into()
    });
  }

  #[test]
  fn tolerates_wrapped_base64() {
    let encoded = STANDARD.encode(ASSERTION);
    let (head, tail) = encoded.split_at(40);

    let identity = parse_saml_response(&format!("{head}\r\n{tail}")).unwrap();
    assert_eq!(identity.kerberos, "jdoe");
  }

  #[test]
  fn rejects_bad_input() {
    let no_kerberos = STANDARD.encode(
      r#"<Response><Attribute Name="email"><AttributeValue>x@mit.edu</AttributeValue></Attribute></Response>"#
    );
    let broken = STANDARD.encode("<Response><Attribute></Response>");

    for encoded in ["%%%", no_kerberos.as_str(), broken.as_str()] {
      assert!(
        matches!(
          parse_saml_response(encoded),
          Err(HandlerError::InvalidParameter { name: "SAMLResponse", .. })
        ),
        "{encoded:?} should be rejected"
      );
    }
  }
}
