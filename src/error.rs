//! Error types for the release bundling pipeline.
//!
//! Each stage owns a narrow error enum ([`ConfigError`], [`DigestError`],
//! [`VersionError`], [`DescriptorError`]); [`BundleError`] wraps them and
//! attaches the filesystem path involved so diagnostics name the offending
//! file.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::descriptor::DescriptorError;
pub use crate::digest::DigestError;
pub use crate::version::VersionError;

use crate::digest::Sha256Digest;

/// Errors that abort a bundling run.
#[derive(Debug, Error)]
pub enum BundleError {
    /// An input file (binary, manifest, template, config) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        /// Path of the unreadable input.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An output file (archive, descriptor) could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        /// Path of the output that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The zip layer rejected an archive operation.
    #[error("archive error for {}: {source}", path.display())]
    Archive {
        /// Path of the archive being written or inspected.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// No line of the manifest declares a release version.
    #[error("Could not find the release version number in {}", path.display())]
    VersionNotFound {
        /// Path of the manifest that was searched.
        path: PathBuf,
    },

    /// The release descriptor template is malformed or lacks required fields.
    #[error("release descriptor {}: {source}", path.display())]
    Descriptor {
        /// Path of the template or output descriptor.
        path: PathBuf,
        /// The parse or structure failure.
        #[source]
        source: DescriptorError,
    },

    /// The bundle configuration file is invalid.
    #[error("configuration {}: {source}", path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// The parse or validation failure.
        #[source]
        source: ConfigError,
    },

    /// The descriptor records a different hash than the archive on disk.
    #[error("{} has SHA-256 {actual} but the descriptor records {recorded}", archive.display())]
    DigestMismatch {
        /// Path of the archive that was hashed.
        archive: PathBuf,
        /// Digest found in the release descriptor.
        recorded: Sha256Digest,
        /// Digest of the archive on disk.
        actual: Sha256Digest,
    },
}

impl BundleError {
    /// Returns `true` when the run failed because the manifest carries no
    /// version line.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoop_bundle::error::BundleError;
    ///
    /// let err = BundleError::VersionNotFound { path: "Cargo.toml".into() };
    /// assert!(err.is_version_not_found());
    /// ```
    #[must_use]
    pub const fn is_version_not_found(&self) -> bool {
        matches!(self, Self::VersionNotFound { .. })
    }
}

/// Result type alias using [`BundleError`].
pub type Result<T> = std::result::Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn version_not_found_names_the_manifest() {
        let err = BundleError::VersionNotFound {
            path: PathBuf::from("Cargo.toml"),
        };

        assert_eq!(
            err.to_string(),
            "Could not find the release version number in Cargo.toml"
        );
        assert!(err.is_version_not_found());
    }

    #[rstest]
    fn read_input_reports_path_and_cause() {
        let err = BundleError::ReadInput {
            path: PathBuf::from("missing.exe"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        let message = err.to_string();
        assert!(message.contains("missing.exe"), "got: {message}");
        assert!(message.contains("no such file"), "got: {message}");
        assert!(!err.is_version_not_found());
    }
}
