//! SHA-256 digests of release archives.
//!
//! The descriptor's `architecture.64bit.hash` field carries the digest that
//! the package installer checks after download, so the value must be the
//! 64-character lowercase hex form of the archive's SHA-256.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::error::BundleError;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Errors arising from digest validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The value is not a 64-character lowercase hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256 {
        /// Description of the validation failure.
        reason: String,
    },
}

/// A validated hex-encoded SHA-256 digest.
///
/// # Examples
///
/// ```
/// use scoop_bundle::digest::Sha256Digest;
///
/// let hex = "0".repeat(64);
/// let digest = Sha256Digest::try_from(hex.as_str()).expect("valid digest");
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Hashes `bytes` held in memory.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(bytes))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // `LowerHex` on the finalized output is always 64 lowercase hex chars.
    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` once, in fixed-size chunks.
///
/// # Errors
///
/// Returns [`BundleError::ReadInput`] if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest, BundleError> {
    let read_error = |source: std::io::Error| BundleError::ReadInput {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::open(path).map_err(read_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(read_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    let digest = Sha256Digest::from_hasher(hasher);
    log::trace!("sha256 of {} is {digest}", path.display());
    Ok(digest)
}

fn validate_sha256(value: &str) -> Result<(), DigestError> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(DigestError::InvalidSha256 {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DigestError::InvalidSha256 {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(DigestError::InvalidSha256 {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}
