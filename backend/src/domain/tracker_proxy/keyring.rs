//! Server-side tracker key storage.
//!
//! Keys are held in [`Zeroizing`] buffers so they are wiped on drop, and
//! their `Debug` output is redacted. Logs may carry a key's fingerprint but
//! never the key itself.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::{TrackerNameError, TrackerRequest, validate_tracker_name};
use crate::domain::ports::KeyedTracker;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Private key for one tracker.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerKey(Zeroizing<String>);

impl TrackerKey {
    /// Wrap key material.
    pub fn new(material: impl Into<String>) -> Self {
        Self(Zeroizing::new(material.into()))
    }

    /// Borrow the key material for forwarding to the locator backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated SHA-256 fingerprint, safe to log.
    ///
    /// # Examples
    /// ```
    /// use rocktags::domain::TrackerKey;
    ///
    /// let fp = TrackerKey::new("secret").fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl std::fmt::Debug for TrackerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackerKey({})", self.fingerprint())
    }
}

/// Errors raised while parsing a keyring specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyringParseError {
    /// An entry is not of the form `name=key`.
    #[error("keyring entry {index} is not of the form name=key")]
    MalformedEntry {
        /// Zero-based entry position.
        index: usize,
    },
    /// An entry names an invalid tracker.
    #[error("keyring entry {index} has an invalid tracker name: {source}")]
    InvalidName {
        /// Zero-based entry position.
        index: usize,
        /// Validation failure.
        #[source]
        source: TrackerNameError,
    },
    /// An entry carries an empty key.
    #[error("keyring entry {index} has an empty key")]
    EmptyKey {
        /// Zero-based entry position.
        index: usize,
    },
    /// A tracker name appears twice.
    #[error("tracker '{name}' appears more than once in the keyring")]
    DuplicateName {
        /// Repeated tracker name.
        name: String,
    },
}

/// Tracker name to private key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TrackerKeyring {
    keys: BTreeMap<String, TrackerKey>,
}

impl TrackerKeyring {
    /// An empty keyring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=key;name=key`. Whitespace around entries and around the
    /// `=` is ignored, as are empty entries. Keys may themselves contain `=`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringParseError`] on malformed entries, invalid tracker
    /// names, empty keys or repeated names.
    ///
    /// # Examples
    /// ```
    /// use rocktags::domain::TrackerKeyring;
    ///
    /// let keyring = TrackerKeyring::parse("cat1=abc==; cat2 = def").expect("valid keyring");
    /// assert_eq!(keyring.len(), 2);
    /// assert_eq!(keyring.get("cat1").map(|k| k.expose()), Some("abc=="));
    /// ```
    pub fn parse(spec: &str) -> Result<Self, KeyringParseError> {
        let mut keyring = Self::new();
        for (index, entry) in spec
            .split(';')
            .map(str::trim)
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
        {
            let (name, key) = entry
                .split_once('=')
                .ok_or(KeyringParseError::MalformedEntry { index })?;
            let tracker = name.trim();
            validate_tracker_name(tracker)
                .map_err(|source| KeyringParseError::InvalidName { index, source })?;
            let material = key.trim();
            if material.is_empty() {
                return Err(KeyringParseError::EmptyKey { index });
            }
            if keyring.contains(tracker) {
                return Err(KeyringParseError::DuplicateName {
                    name: tracker.to_owned(),
                });
            }
            keyring.insert(tracker, TrackerKey::new(material));
        }
        Ok(keyring)
    }

    /// Add or replace a key.
    pub fn insert(&mut self, name: impl Into<String>, key: TrackerKey) {
        self.keys.insert(name.into(), key);
    }

    /// Key for `name`, if configured.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TrackerKey> {
        self.keys.get(name)
    }

    /// Whether a key is configured for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Number of configured keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Configured tracker names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Pair each request with its key, dropping names without one.
    #[must_use]
    pub fn resolve(&self, requests: &[TrackerRequest]) -> Vec<KeyedTracker> {
        requests
            .iter()
            .filter_map(|request| {
                self.get(&request.name).map(|key| KeyedTracker {
                    name: request.name.clone(),
                    private_key: key.clone(),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for TrackerKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.keys.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn debug_output_never_contains_key_material() {
        let keyring = TrackerKeyring::parse("cat1=super-secret").expect("valid keyring");
        let rendered = format!("{keyring:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("cat1"));
    }

    #[rstest]
    fn fingerprint_is_deterministic_and_distinct() {
        let a = TrackerKey::new("a");
        assert_eq!(a.fingerprint(), TrackerKey::new("a").fingerprint());
        assert_ne!(a.fingerprint(), TrackerKey::new("b").fingerprint());
        assert_eq!(a.fingerprint(), a.fingerprint().to_lowercase());
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::single("cat1=abc", 1)]
    #[case::trailing_separator("cat1=abc;", 1)]
    #[case::padded(" cat1 = abc ; cat2=def ", 2)]
    fn parses_valid_specs(#[case] spec: &str, #[case] expected: usize) {
        assert_eq!(TrackerKeyring::parse(spec).expect("valid spec").len(), expected);
    }

    #[rstest]
    fn keys_may_contain_equals_signs() {
        let keyring = TrackerKeyring::parse("cat1=E5kj==").expect("valid spec");
        assert_eq!(keyring.get("cat1").map(TrackerKey::expose), Some("E5kj=="));
    }

    #[rstest]
    #[case::missing_equals("cat1", KeyringParseError::MalformedEntry { index: 0 })]
    #[case::empty_key("cat1=", KeyringParseError::EmptyKey { index: 0 })]
    #[case::bad_name(
        "cat1=a;bad name=b",
        KeyringParseError::InvalidName { index: 1, source: TrackerNameError::InvalidCharacters }
    )]
    #[case::duplicate(
        "cat1=a;cat1=b",
        KeyringParseError::DuplicateName { name: "cat1".to_owned() }
    )]
    fn rejects_invalid_specs(#[case] spec: &str, #[case] expected: KeyringParseError) {
        assert_eq!(TrackerKeyring::parse(spec), Err(expected));
    }

    #[rstest]
    fn resolve_drops_names_without_keys() {
        let keyring = TrackerKeyring::parse("cat1=abc").expect("valid spec");
        let keyed = keyring.resolve(&[TrackerRequest::new("cat1"), TrackerRequest::new("cat9")]);
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed.first().map(|k| k.name.as_str()), Some("cat1"));
    }
}
