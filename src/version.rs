//! Release version extraction from the project manifest.
//!
//! The version comes from the first line of the manifest that starts with a
//! `version = "X.Y.Z"` assignment. The quoted value is taken verbatim as long
//! as it is a run of digits and dots; pre-release suffixes such as
//! `1.0.0-beta.1` do not match, and a manifest
//! without any matching line is reported as [`VersionError::NotFound`] rather
//! than falling back to a guessed default.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::error::BundleError;

/// Start of line, `version` (optionally followed by `?`), `=`, then a quoted
/// run of digits and dots.
static VERSION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^version\??[ \t]*=[ \t]*"([0-9.]+)""#).expect("version pattern is valid")
});

/// Errors arising from version extraction and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// No manifest line declares a version.
    #[error("no `version = \"X.Y.Z\"` line found")]
    NotFound,

    /// A version string is not a run of digits and dots.
    #[error("invalid version \"{value}\": {reason}")]
    Invalid {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// A release version made of ASCII digits and dots, such as `1.2.3`.
///
/// Dots are not checked for placement, so `1..2` is kept as written.
///
/// # Examples
///
/// ```
/// use scoop_bundle::version::ReleaseVersion;
///
/// let version = ReleaseVersion::try_from("10.0.1").expect("valid version");
/// assert_eq!(version.as_str(), "10.0.1");
/// assert_eq!(ReleaseVersion::try_from("1..2").expect("dots kept").as_str(), "1..2");
/// assert!(ReleaseVersion::try_from("1.0-beta").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ReleaseVersion {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_version(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for ReleaseVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the release version from manifest text.
///
/// Returns the capture of the first matching line, unchanged.
///
/// # Errors
///
/// Returns [`VersionError::NotFound`] when no line matches. Every capture of
/// the pattern is a valid [`ReleaseVersion`], so no other error occurs.
///
/// # Examples
///
/// ```
/// use scoop_bundle::version::extract_version;
///
/// let manifest = "[package]\nname = \"magicutil\"\nversion = \"1.2.3\"\n";
/// assert_eq!(extract_version(manifest).expect("found").as_str(), "1.2.3");
/// ```
pub fn extract_version(text: &str) -> Result<ReleaseVersion, VersionError> {
    let first = VERSION_LINE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .ok_or(VersionError::NotFound)?;
    Ok(ReleaseVersion(first.as_str().to_owned()))
}

/// Read the manifest at `path` and extract its release version.
///
/// # Errors
///
/// Returns [`BundleError::ReadInput`] if the manifest cannot be read and
/// [`BundleError::VersionNotFound`] if it has no version line.
pub fn read_version(path: &Path) -> Result<ReleaseVersion, BundleError> {
    let text = std::fs::read_to_string(path).map_err(|source| BundleError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let version = extract_version(&text).map_err(|_: VersionError| BundleError::VersionNotFound {
        path: path.to_path_buf(),
    })?;
    log::debug!("found version {version} in {}", path.display());
    Ok(version)
}

fn validate_version(value: &str) -> Result<(), VersionError> {
    let invalid = |reason: &str| VersionError::Invalid {
        value: value.to_owned(),
        reason: reason.to_owned(),
    };
    if value.is_empty() {
        return Err(invalid("version is empty"));
    }
    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid("only digits and dots are allowed"));
    }
    Ok(())
}
