//! JSON policy document persistence.
//!
//! Firewall rule sets are edited as JSON documents.  This adapter reads
//! and writes those documents at user-chosen paths so a rule set built in
//! one session can be imported into another.  Unlike the app config there
//! is no silent fallback: a missing or malformed file is always an error,
//! because importing "nothing" into a firewall would be surprising.

use std::path::Path;

use thiserror::Error;

use fyre_core::{PolicyDocument, PolicyError};

/// Error type for policy file operations.
#[derive(Debug, Error)]
pub enum PolicyFileError {
    /// The file could not be read or written at all.
    #[error("I/O error accessing policy file at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contents were not a valid policy document.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Loads a policy document from `path`.
///
/// # Errors
///
/// Returns [`PolicyFileError::Io`] when the file cannot be read and
/// [`PolicyFileError::Policy`] when its contents are not a valid document.
pub fn load_policy(path: &Path) -> Result<PolicyDocument, PolicyFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| PolicyFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PolicyDocument::from_json_str(&content)?)
}

/// Persists `document` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`PolicyFileError::Io`] for file-system failures and
/// [`PolicyFileError::Policy`] if serialization fails.
pub fn save_policy(path: &Path, document: &PolicyDocument) -> Result<(), PolicyFileError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| PolicyFileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = document.to_json_string()?;
    std::fs::write(path, content).map_err(|source| PolicyFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
