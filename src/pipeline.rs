//! Bundling pipeline orchestration.
//!
//! Runs the four stages strictly in order: archive the binary, hash the
//! archive, read the version, write the release descriptor. The first failure
//! aborts the run; files already produced are left in place.

use std::io::Write;
use std::path::PathBuf;

use crate::archive::create_archive;
use crate::config::BundleConfig;
use crate::descriptor::{ReleaseDescriptor, build_descriptor};
use crate::digest::{Sha256Digest, compute_sha256};
use crate::error::{BundleError, Result};
use crate::version::{ReleaseVersion, read_version};

/// Progress line written before the archive is created.
pub const ARCHIVE_PROGRESS: &str = "Bundling the executable in a zip file...";

/// Progress line written before the release descriptor is built.
pub const DESCRIPTOR_PROGRESS: &str = "Writing the release json file...";

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOutput {
    /// Path of the created zip archive.
    pub archive_path: PathBuf,
    /// SHA-256 of the archive bytes.
    pub digest: Sha256Digest,
    /// Version read from the manifest.
    pub version: ReleaseVersion,
    /// Path of the written release descriptor.
    pub descriptor_path: PathBuf,
    /// The descriptor as written.
    pub descriptor: ReleaseDescriptor,
}

/// Run the bundling pipeline described by `config`.
///
/// Progress lines go to `progress`; write failures on that stream are
/// ignored.
///
/// # Errors
///
/// Returns the first [`BundleError`] raised by any stage. A manifest without a
/// version line yields [`BundleError::VersionNotFound`].
pub fn run_bundle(config: &BundleConfig, progress: &mut dyn Write) -> Result<BundleOutput> {
    write_progress(progress, ARCHIVE_PROGRESS);
    create_archive(&config.binary_path, &config.archive_path, &config.entry_name)?;
    let digest = compute_sha256(&config.archive_path)?;
    let version = read_version(&config.manifest_path)?;

    write_progress(progress, DESCRIPTOR_PROGRESS);
    let descriptor = build_descriptor(
        &config.template_path,
        &config.output_path,
        &version,
        &digest,
    )?;

    log::info!(
        "bundled {} {version} ({digest})",
        config.archive_path.display()
    );
    Ok(BundleOutput {
        archive_path: config.archive_path.clone(),
        digest,
        version,
        descriptor_path: config.output_path.clone(),
        descriptor,
    })
}

/// Check that an existing descriptor records the digest of an existing
/// archive.
///
/// Nothing is written. Useful after a release has been assembled, or before
/// publishing, to confirm the descriptor was not built from a stale archive.
///
/// # Errors
///
/// Returns [`BundleError::ReadInput`] if either file is missing,
/// [`BundleError::Descriptor`] if the descriptor is malformed or holds no
/// valid hash, and [`BundleError::DigestMismatch`] if the hashes differ.
pub fn verify_bundle(config: &BundleConfig) -> Result<Sha256Digest> {
    let descriptor = ReleaseDescriptor::load(&config.output_path)?;
    let recorded = descriptor
        .sha256()
        .map_err(|source| BundleError::Descriptor {
            path: config.output_path.clone(),
            source,
        })?;
    let actual = compute_sha256(&config.archive_path)?;
    if recorded != actual {
        return Err(BundleError::DigestMismatch {
            archive: config.archive_path.clone(),
            recorded,
            actual,
        });
    }
    log::debug!("{} matches its descriptor", config.archive_path.display());
    Ok(actual)
}

fn write_progress(progress: &mut dyn Write, message: &str) {
    if writeln!(progress, "{message}").is_err() {
        // Progress output is best-effort.
    }
}
