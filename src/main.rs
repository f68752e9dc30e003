//! `scoop-bundle` CLI entrypoint.
//!
//! Packages the release executable into a zip archive and writes the Scoop
//! release descriptor that points at it. Exits with status 1 and a diagnostic
//! on stderr when any stage fails.

use clap::Parser;
use scoop_bundle::cli::Cli;
use scoop_bundle::error::{BundleError, Result};
use scoop_bundle::pipeline::{run_bundle, verify_bundle};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let config = cli.resolve_config()?;
    if cli.verify {
        let digest = verify_bundle(&config)?;
        write_line(stdout, format!("{} OK ({digest})", config.archive_path.display()));
        return Ok(());
    }
    run_bundle(&config, stdout)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        // The message already reads as a complete diagnostic.
        Err(err @ BundleError::VersionNotFound { .. }) => {
            write_line(stderr, err);
            1
        }
        Err(err) => {
            write_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_line(stream: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stream, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}
