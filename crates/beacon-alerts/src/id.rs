//! Alert identifiers.
//!
//! An [`AlertId`] is a random 128-bit value (a v4 UUID) rendered as unpadded
//! URL-safe base64, which yields a 22 character token. Identifiers carry no
//! information about the alert they name: the same condition firing on two
//! separate runs receives two unrelated identifiers.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a freshly generated identifier.
pub const ALERT_ID_LEN: usize = 22;

/// Separator used when several identifiers are stored in one cell.
pub const ID_SEPARATOR: char = ',';

/// Opaque, globally unique identifier of one alert record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    /// Generates a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes()))
    }

    /// Wraps an identifier read back from a persisted log.
    ///
    /// No format check is applied; logs written by other tools keep their ids.
    #[must_use]
    pub fn from_persisted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AlertId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Joins identifiers into the comma-separated form stored on dataset rows.
#[must_use]
pub fn join_ids(ids: &[AlertId]) -> String {
    let mut joined = String::with_capacity(ids.len() * (ALERT_ID_LEN + 1));
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            joined.push(ID_SEPARATOR);
        }
        joined.push_str(id.as_str());
    }
    joined
}

/// Splits a dataset cell back into identifiers, ignoring blanks.
#[must_use]
pub fn split_ids(cell: &str) -> Vec<AlertId> {
    cell.split(ID_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AlertId::from_persisted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_id_is_compact_and_url_safe() {
        let id = AlertId::generate();
        assert_eq!(id.as_str().len(), ALERT_ID_LEN);
        assert!(!id.as_str().contains('='));
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn generated_id_decodes_to_sixteen_bytes() {
        let id = AlertId::generate();
        let bytes = URL_SAFE_NO_PAD.decode(id.as_str()).unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut ids = HashSet::new();
        for _ in 0..10_000 {
            assert!(ids.insert(AlertId::generate()), "duplicate alert id");
        }
    }

    #[test]
    fn join_and_split() {
        let ids = vec![
            AlertId::from_persisted("a1"),
            AlertId::from_persisted("b2"),
            AlertId::from_persisted("c3"),
        ];
        let joined = join_ids(&ids);
        assert_eq!(joined, "a1,b2,c3");
        assert_eq!(split_ids(&joined), ids);
    }

    #[test]
    fn join_empty_is_empty() {
        assert_eq!(join_ids(&[]), "");
        assert!(split_ids("").is_empty());
        assert!(split_ids(" , ").is_empty());
    }

    #[test]
    fn display_matches_as_str() {
        let id = AlertId::from_persisted("xyz");
        assert_eq!(id.to_string(), "xyz");
    }
}
