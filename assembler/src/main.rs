//! Assembler CLI entrypoint.
//!
//! Loads the invocation configuration, builds one archive per format the
//! descriptor requests, and prints each produced archive with its
//! classifier.

use assembler::cli::Cli;
use assembler::config::AssemblyConfig;
use assembler::driver::{AttachedArtifact, assemble};
use assembler::error::Result;
use assembler::unpack::ArchiveUnpacker;
use clap::Parser;
use std::io::Write;

/// Exit code for descriptor and configuration mistakes.
const USAGE_EXIT_CODE: i32 = 2;

/// Exit code for failures while building an archive.
const FAILURE_EXIT_CODE: i32 = 1;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let mut config = AssemblyConfig::discover(cli.config.as_deref())?.merge(cli.overrides());
    config.descriptor_source()?;
    if let Some(path) = &cli.artifacts {
        config.artifacts = AssemblyConfig::load_artifacts(path)?;
    }
    let request = config.resolve()?;
    let attached = assemble(&request, &ArchiveUnpacker)?;
    if !cli.quiet {
        report_artifacts(&attached, stdout);
    }
    Ok(())
}

fn report_artifacts(attached: &[AttachedArtifact], stdout: &mut dyn Write) {
    for artifact in attached {
        write_line(
            stdout,
            format_args!("{} ({})", artifact.path.display(), artifact.classifier),
        );
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format_args!("error: {err}"));
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_line(stderr, format_args!("  caused by: {cause}"));
                source = cause.source();
            }
            if err.is_usage_error() {
                USAGE_EXIT_CODE
            } else {
                FAILURE_EXIT_CODE
            }
        }
    }
}

fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}
