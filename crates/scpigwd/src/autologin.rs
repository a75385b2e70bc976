//! Persisted credentials replayed when a session opens.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::SESSION_TARGET;

/// Credentials a new session logs in with before reading client commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLoginRecord {
    /// Disabled records are kept on disk but ignored.
    pub enabled: bool,
    /// Engine account name.
    pub username: Vec<u8>,
    /// Engine account password.
    pub password: Vec<u8>,
}

/// Errors raised while persisting a record.
#[derive(Debug, Error)]
pub enum AutoLoginError {
    /// The record file could not be written.
    #[error("failed to write auto-login record {path}: {source}")]
    Write {
        /// Destination file.
        path: Utf8PathBuf,
        /// Filesystem error.
        #[source]
        source: io::Error,
    },
    /// The record could not be encoded as JSON.
    #[error("failed to encode auto-login record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AutoLoginRecord {
    /// Reads the record at `path`.
    ///
    /// A missing, unreadable, or malformed file yields `None`; sessions then
    /// run without auto-login.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Option<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
            Err(error) => {
                debug!(target: SESSION_TARGET, %path, %error, "auto-login record unreadable");
                return None;
            }
        };
        serde_json::from_slice(&bytes)
            .inspect_err(|error| {
                debug!(target: SESSION_TARGET, %path, %error, "auto-login record malformed");
            })
            .ok()
    }

    /// Writes the record to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AutoLoginError`] when encoding or writing fails.
    pub fn store(&self, path: &Utf8Path) -> Result<(), AutoLoginError> {
        let encoded = serde_json::to_vec_pretty(self)?;
        fs::write(path, encoded).map_err(|source| AutoLoginError::Write {
            path: path.to_owned(),
            source,
        })
    }

    /// The `LOGIN` line injected into the session.
    pub(crate) fn login_command(&self) -> String {
        format!(
            "LOGIN {} {}",
            String::from_utf8_lossy(&self.username),
            String::from_utf8_lossy(&self.password)
        )
    }
}
