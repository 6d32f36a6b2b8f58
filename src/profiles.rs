use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::KERBEROS_SUFFIX;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockProfile {
  pub name: String,
  pub first_name: String,
  pub last_name: String,
  pub title: String,
  pub department: String,
  pub email: String
}

impl MockProfile {
  /// Placeholder for identifiers the directory doesn't know
  pub fn unknown(kerberos: &str) -> Self {
    MockProfile {
      name: format!("{kerberos} (Unknown)"),
      first_name: kerberos.to_string(),
      last_name: String::new(),
      title: "MIT User".to_string(),
      department: "Unknown Department".to_string(),
      email: format!("{kerberos}{KERBEROS_SUFFIX}")
    }
  }
}

/// Resolves a kerberos id to a profile. Swap the implementation for a real
/// directory service without touching the endpoint.
pub trait ProfileDirectory: Send + Sync {
  fn resolve(&self, kerberos: &str) -> Option<MockProfile>;
}

/// Total lookup: directory hit, else the synthesized placeholder
pub fn lookup_profile(directory: &dyn ProfileDirectory, kerberos: &str) -> MockProfile {
  directory.resolve(kerberos)
    .unwrap_or_else(|| MockProfile::unknown(kerberos))
}

/// Fixed in-memory directory
pub struct StaticDirectory {
  profiles: BTreeMap<String, MockProfile>
}

impl StaticDirectory {
  pub fn new(profiles: impl IntoIterator<Item = (String, MockProfile)>) -> Self {
    StaticDirectory {
      profiles: profiles.into_iter().collect()
    }
  }

  /// The test users the chatbot team validates against
  pub fn builtin() -> Self {
    let profile = |first: &str, last: &str, title: &str, department: &str, kerberos: &str| (
      kerberos.to_string(),
      MockProfile {
        name: format!("{first} {last}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        title: title.to_string(),
        department: department.to_string(),
        email: format!("{kerberos}{KERBEROS_SUFFIX}")
      }
    );

    let oconaill = (
      "oconaill".to_string(),
      MockProfile {
        name: "Brian O'Conaill".to_string(),
        first_name: "Brian".to_string(),
        last_name: "O'Conaill".to_string(),
        title: "Director of Administration and Finance".to_string(),
        department: "Department of Aeronautics and Astronautics".to_string(),
        email: format!("oconaill{KERBEROS_SUFFIX}")
      }
    );

    Self::new([
      oconaill,
      profile("John", "Doe", "Professor", "AeroAstro", "jdoe"),
      profile("Alice", "Smith", "Research Scientist", "AeroAstro", "asmith")
    ])
  }
}

impl ProfileDirectory for StaticDirectory {
  fn resolve(&self, kerberos: &str) -> Option<MockProfile> {
    self.profiles.get(kerberos).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_builtin_users() {
    let profile = lookup_profile(&StaticDirectory::builtin(), "asmith");

    assert_eq!(profile.name, "Alice Smith");
    assert_eq!(profile.title, "Research Scientist");
    assert_eq!(profile.email, "asmith@mit.edu");

    let profile = lookup_profile(&StaticDirectory::builtin(), "oconaill");
    assert_eq!(profile, MockProfile {
      name: "Brian O'Conaill".into(),
      first_name: "Brian".into(),
      last_name: "O'Conaill".into(),
      title: "Director of Administration and Finance".into(),
      department: "Department of Aeronautics and Astronautics".into(),
      email: "oconaill@mit.edu".into()
    });
  }

  #[test]
  fn unknown_users_get_a_deterministic_placeholder() {
    let directory = StaticDirectory::builtin();

    let first = lookup_profile(&directory, "nobody");
    let second = lookup_profile(&directory, "nobody");

    assert_eq!(first, second);
    assert_eq!(first, MockProfile {
      name: "nobody (Unknown)".into(),
      first_name: "nobody".into(),
      last_name: "".into(),
      title: "MIT User".into(),
      department: "Unknown Department".into(),
      email: "nobody@mit.edu".into()
    });
  }

  #[test]
  fn lookups_are_case_sensitive() {
    let profile = lookup_profile(&StaticDirectory::builtin(), "JDOE");
    assert_eq!(profile.email, "JDOE@mit.edu");
    assert_eq!(profile.title, "MIT User");
  }
}
