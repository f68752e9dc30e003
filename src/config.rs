//! Bundle configuration.
//!
//! `BundleConfig` names every path the bundler touches. The defaults reproduce
//! the historical release layout (a Windows GNU cross build of `MagicUtil.exe`
//! packaged into `dist/`), and each field can be overridden from a TOML file or
//! directly in code so tests can point the pipeline at a temporary directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::BundleError;

/// Errors arising from bundle configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document is malformed or contains unknown keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The archive entry name is empty.
    #[error("entry_name must not be empty")]
    EmptyEntryName,
}

/// Paths used by a bundling run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// The prebuilt executable to package.
    pub binary_path: PathBuf,
    /// Where the zip archive is written.
    pub archive_path: PathBuf,
    /// Name of the executable inside the archive, independent of the
    /// source filename.
    pub entry_name: String,
    /// Project manifest holding the `version = "X.Y.Z"` line.
    pub manifest_path: PathBuf,
    /// Release descriptor template.
    pub template_path: PathBuf,
    /// Where the completed release descriptor is written.
    pub output_path: PathBuf,
}

impl BundleConfig {
    /// Parses a configuration from TOML, falling back to defaults for absent
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys, and
    /// [`ConfigError::EmptyEntryName`] when `entry_name` is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoop_bundle::config::BundleConfig;
    ///
    /// let config = BundleConfig::from_toml_str("entry_name = \"tool.exe\"\n")
    ///     .expect("valid configuration");
    /// assert_eq!(config.entry_name, "tool.exe");
    /// assert_eq!(config.manifest_path, BundleConfig::default().manifest_path);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ReadInput`] if the file cannot be read and
    /// [`BundleError::Config`] if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let source = std::fs::read_to_string(path).map_err(|source| BundleError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source).map_err(|source| BundleError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects configurations that cannot produce a usable archive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyEntryName`] when `entry_name` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_name.trim().is_empty() {
            return Err(ConfigError::EmptyEntryName);
        }
        Ok(())
    }

    /// Replaces the binary path.
    #[must_use]
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Replaces the archive path.
    #[must_use]
    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    /// Replaces the archive entry name.
    #[must_use]
    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    /// Replaces the manifest path.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Replaces the descriptor template path.
    #[must_use]
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Replaces the descriptor output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Resolves every relative path against `root`.
    ///
    /// Absolute paths are kept as they are.
    #[must_use]
    pub fn rooted_at(self, root: &Path) -> Self {
        Self {
            binary_path: root.join(self.binary_path),
            archive_path: root.join(self.archive_path),
            entry_name: self.entry_name,
            manifest_path: root.join(self.manifest_path),
            template_path: root.join(self.template_path),
            output_path: root.join(self.output_path),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/x86_64-pc-windows-gnu/release/MagicUtil.exe"),
            archive_path: PathBuf::from("dist/magicutil-x86_64.zip"),
            entry_name: "MagicUtil.exe".to_owned(),
            manifest_path: PathBuf::from("Cargo.toml"),
            template_path: PathBuf::from("scoop/magicutil-base.json"),
            output_path: PathBuf::from("dist/magicutil.json"),
        }
    }
}
