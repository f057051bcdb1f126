//! Build description loading helpers.
//!
//! Parses a `BUILD.yaml` into the [`BuildManifest`] AST. The YAML must be
//! valid on its own; there is no preprocessing pass. Errors carry enough
//! context to name the offending file or declaration.

use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, io};
use thiserror::Error;

use crate::ast::BuildManifest;

/// Build description format major version this binary understands.
pub const SUPPORTED_MAJOR: u64 = 1;

/// Errors raised while loading a build description.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The build description file could not be read.
    #[error("failed to read build description at {path}")]
    Read {
        /// Path that was being read.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The build description was not valid YAML or used malformed
    /// attribute shapes.
    #[error("failed to parse build description: {message}")]
    Parse {
        /// Parser diagnostic text.
        message: String,
    },

    /// The description declares a format version this binary cannot
    /// honour.
    #[error("unsupported makegen_version {version}; this build supports major version 1")]
    UnsupportedVersion {
        /// Version declared by the description.
        version: semver::Version,
    },
}

/// Parse a build description from a string.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] on malformed YAML or attribute shapes
/// and [`ManifestError::UnsupportedVersion`] on a format-version mismatch.
pub fn from_str(yaml: &str) -> Result<BuildManifest, ManifestError> {
    let manifest: BuildManifest =
        serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
            message: e.to_string(),
        })?;
    if manifest.makegen_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            version: manifest.makegen_version,
        });
    }
    Ok(manifest)
}

/// Load a [`BuildManifest`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: &Utf8Path) -> Result<BuildManifest, ManifestError> {
    let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&data)
}
