//! Strongly-typed keys for domain entities.
//!
//! Every key is a validated string. Integration ids are opaque to clients
//! (the wire may carry them as strings or numbers); the server mints new ones
//! as prefixed ULIDs so they stay unique and sort by creation time.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing a key from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError {
    /// The type of key that failed to parse.
    pub key_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.key_type, self.reason)
    }
}

impl std::error::Error for ParseKeyError {}

/// Accepts either a JSON string or a JSON integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Number(u64),
}

impl From<RawKey> for String {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Text(s) => s,
            RawKey::Number(n) => n.to_string(),
        }
    }
}

/// Macro to generate a validated string key type.
///
/// `$validate` is a `fn(&str) -> Result<(), String>` applied on parse and on
/// deserialization.
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident, $validate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Builds a key from a literal.
            ///
            /// # Panics
            ///
            /// Panics if `s` is not a valid key.
            #[must_use]
            pub fn from_static(s: &'static str) -> Self {
                match s.parse() {
                    Ok(key) => key,
                    Err(e) => panic!("invalid static key: {e}"),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseKeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let validate: fn(&str) -> Result<(), String> = $validate;
                validate(s).map_err(|reason| ParseKeyError {
                    key_type: stringify!($name),
                    reason,
                })?;
                Ok(Self(s.to_string()))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw: String = RawKey::deserialize(deserializer)?.into();
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

fn non_empty(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".to_string());
    }
    if s.contains('/') {
        return Err(format!("'{s}' must not contain '/'"));
    }
    Ok(())
}

fn slug(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".to_string());
    }
    match s
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(format!("'{s}' contains invalid character '{c}'")),
        None => Ok(()),
    }
}

define_key!(
    /// Opaque, server-assigned identifier of an integration.
    IntegrationId,
    non_empty
);

define_key!(
    /// URL slug identifying an organization.
    OrganizationSlug,
    slug
);

define_key!(
    /// Identifier of an integration provider (e.g. `example`).
    ProviderKey,
    slug
);

impl IntegrationId {
    /// Mints a fresh `int_`-prefixed ULID identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("int_{}", Ulid::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_integration_ids_are_prefixed_and_unique() {
        let a = IntegrationId::generate();
        let b = IntegrationId::generate();
        assert!(a.as_str().starts_with("int_"));
        assert_ne!(a, b);
    }

    #[test]
    fn integration_id_accepts_numbers_on_the_wire() {
        let id: IntegrationId = serde_json::from_str("1").expect("deserialize");
        assert_eq!(id.as_str(), "1");
        let id: IntegrationId = serde_json::from_str("\"abc\"").expect("deserialize");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn integration_id_serializes_as_string() {
        let id: IntegrationId = "42".parse().expect("parse");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"42\"");
    }

    #[test]
    fn integration_id_rejects_path_separators() {
        let err = "a/b".parse::<IntegrationId>().unwrap_err();
        assert_eq!(err.key_type, "IntegrationId");
        assert!("".parse::<IntegrationId>().is_err());
    }

    #[test]
    fn slugs_are_lowercase_ascii() {
        assert!("acme-corp".parse::<OrganizationSlug>().is_ok());
        assert!("acme_2".parse::<ProviderKey>().is_ok());

        let err = "Acme".parse::<OrganizationSlug>().unwrap_err();
        assert_eq!(err.key_type, "OrganizationSlug");
        assert!(err.reason.contains("'A'"));
    }

    #[test]
    fn invalid_slug_fails_deserialization() {
        let result: Result<ProviderKey, _> = serde_json::from_str("\"has space\"");
        assert!(result.is_err());
    }
}
