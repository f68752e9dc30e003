//! Single-entry zip archives for release distribution.
//!
//! The archive holds exactly one file, stored uncompressed under a fixed
//! entry name with the zip epoch as its timestamp. Identical inputs therefore
//! yield byte-identical archives and identical digests.

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::BundleError;

/// Unix permissions recorded for the packaged executable.
const EXECUTABLE_MODE: u32 = 0o755;

/// Create a zip archive at `destination` holding `source` as `entry_name`.
///
/// The source is opened before the destination is created, so a missing
/// source leaves any existing archive untouched. An existing destination is
/// otherwise truncated and rewritten.
///
/// # Errors
///
/// Returns [`BundleError::ReadInput`] naming `source` if it cannot be opened
/// or read, [`BundleError::WriteOutput`] if `destination` cannot be created
/// (for example when its parent directory is missing), and
/// [`BundleError::Archive`] naming `destination` if writing the entry or
/// finishing the zip fails.
pub fn create_archive(
    source: &Path,
    destination: &Path,
    entry_name: &str,
) -> Result<(), BundleError> {
    let read_error = |err: std::io::Error| BundleError::ReadInput {
        path: source.to_path_buf(),
        source: err,
    };
    let mut input = fs::File::open(source).map_err(read_error)?;
    let output = fs::File::create(destination).map_err(|err| BundleError::WriteOutput {
        path: destination.to_path_buf(),
        source: err,
    })?;

    let archive_error = |err: zip::result::ZipError| BundleError::Archive {
        path: destination.to_path_buf(),
        source: err,
    };
    let mut writer = ZipWriter::new(output);
    writer
        .start_file(entry_name, entry_options())
        .map_err(archive_error)?;
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(read_error(err)),
        };
        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|err| archive_error(err.into()))?;
    }
    writer.finish().map_err(archive_error)?;

    log::debug!(
        "archived {} as {entry_name} into {}",
        source.display(),
        destination.display()
    );
    Ok(())
}

/// List the entry names of the zip archive at `path`, in central directory
/// order.
///
/// # Errors
///
/// Returns [`BundleError::ReadInput`] if the file cannot be opened and
/// [`BundleError::Archive`] if it is not a readable zip archive.
pub fn archive_entry_names(path: &Path) -> Result<Vec<String>, BundleError> {
    let file = fs::File::open(path).map_err(|err| BundleError::ReadInput {
        path: path.to_path_buf(),
        source: err,
    })?;
    let archive = ZipArchive::new(file).map_err(|err| BundleError::Archive {
        path: path.to_path_buf(),
        source: err,
    })?;
    Ok(archive.file_names().map(str::to_owned).collect())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(EXECUTABLE_MODE)
}
