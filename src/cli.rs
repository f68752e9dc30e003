//! Command-line argument definitions for `scoop-bundle`.
//!
//! Every flag is optional. Without arguments the bundler uses the built-in
//! release layout; `--config` layers a TOML file over it and the remaining
//! flags override individual paths last.

use clap::Parser;
use std::path::PathBuf;

use crate::config::BundleConfig;
use crate::error::BundleError;

/// Package a prebuilt executable into a zip archive and write its Scoop
/// release descriptor.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "scoop-bundle")]
#[command(version, about)]
#[command(after_help = concat!(
    "DEFAULT LAYOUT:\n",
    "  binary    target/x86_64-pc-windows-gnu/release/MagicUtil.exe\n",
    "  archive   dist/magicutil-x86_64.zip (entry MagicUtil.exe)\n",
    "  manifest  Cargo.toml\n",
    "  template  scoop/magicutil-base.json\n",
    "  output    dist/magicutil.json\n",
))]
pub struct Cli {
    /// TOML file overriding the default layout.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Prebuilt executable to package.
    #[arg(long, value_name = "FILE")]
    pub binary: Option<PathBuf>,

    /// Zip archive to create.
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Name of the executable inside the archive.
    #[arg(long, value_name = "NAME")]
    pub entry_name: Option<String>,

    /// Project manifest holding the release version.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Release descriptor template.
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Release descriptor to write.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Check that the existing descriptor matches the existing archive
    /// instead of bundling.
    #[arg(long)]
    pub verify: bool,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the `--config`
    /// file, then individual flags.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ReadInput`] or [`BundleError::Config`] if the
    /// configuration file cannot be loaded, and [`BundleError::Config`] if
    /// `--entry-name` is blank.
    pub fn resolve_config(&self) -> Result<BundleConfig, BundleError> {
        let base = match &self.config {
            Some(path) => BundleConfig::load(path)?,
            None => BundleConfig::default(),
        };
        let config = self.apply_overrides(base);
        config.validate().map_err(|source| BundleError::Config {
            path: self
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from("<command line>")),
            source,
        })?;
        Ok(config)
    }

    fn apply_overrides(&self, mut config: BundleConfig) -> BundleConfig {
        if let Some(path) = &self.binary {
            config = config.with_binary_path(path);
        }
        if let Some(path) = &self.archive {
            config = config.with_archive_path(path);
        }
        if let Some(name) = &self.entry_name {
            config = config.with_entry_name(name);
        }
        if let Some(path) = &self.manifest {
            config = config.with_manifest_path(path);
        }
        if let Some(path) = &self.template {
            config = config.with_template_path(path);
        }
        if let Some(path) = &self.output {
            config = config.with_output_path(path);
        }
        config
    }
}
