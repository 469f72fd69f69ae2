//! Tracker keyring loading.
//!
//! Keys come from `TRACKER_KEYS` (`name=key;name=key`) or, when that is
//! unset, from the file named by `TRACKER_KEY_FILE`. With neither set the
//! keyring is empty and the proxy answers `{}` for every batch.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::{KeyringParseError, TrackerKeyring};

/// Inline keyring variable.
pub const KEYS_ENV: &str = "TRACKER_KEYS";
/// Keyring file variable.
pub const KEY_FILE_ENV: &str = "TRACKER_KEY_FILE";

/// Errors raised while loading the keyring.
#[derive(Debug, Error)]
pub enum KeyringConfigError {
    /// The keyring text is malformed.
    #[error("invalid tracker keyring in {origin}: {source}")]
    Parse {
        /// Variable or file the text came from.
        origin: String,
        /// Parse failure.
        #[source]
        source: KeyringParseError,
    },
    /// The keyring file could not be read.
    #[error("failed to read tracker key file at {path}: {source}")]
    Read {
        /// Configured path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Load the tracker keyring from the environment.
///
/// # Errors
///
/// Returns [`KeyringConfigError`] when the file cannot be read or the text
/// does not parse.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use rocktags::config::keyring_from_env;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "TRACKER_KEYS" => Some("cat1=abc".to_owned()),
///     _ => None,
/// });
/// let keyring = keyring_from_env(&env).expect("valid keyring");
/// assert!(keyring.contains("cat1"));
/// ```
pub fn keyring_from_env<E: Env>(env: &E) -> Result<TrackerKeyring, KeyringConfigError> {
    if let Some(spec) = env.string(KEYS_ENV).map(Zeroizing::new) {
        return parse(&spec, KEYS_ENV.to_owned());
    }
    if let Some(path) = env.string(KEY_FILE_ENV).map(PathBuf::from) {
        let spec = read_key_file(&path).map_err(|source| KeyringConfigError::Read {
            path: path.clone(),
            source,
        })?;
        return parse(&spec, path.display().to_string());
    }
    warn!("no tracker keys configured; proxy will answer empty responses");
    Ok(TrackerKeyring::new())
}

fn parse(spec: &str, origin: String) -> Result<TrackerKeyring, KeyringConfigError> {
    let keyring = TrackerKeyring::parse(spec).map_err(|source| KeyringConfigError::Parse {
        origin: origin.clone(),
        source,
    })?;
    info!(
        origin = %origin,
        trackers = ?keyring.names().collect::<Vec<_>>(),
        "loaded tracker keyring"
    );
    Ok(keyring)
}

fn read_key_file(path: &Path) -> io::Result<Zeroizing<String>> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path must include a file name")
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory
        .read_to_string(Path::new(file_name))
        .map(|text| Zeroizing::new(text.lines().collect::<Vec<_>>().join(";")))
}
