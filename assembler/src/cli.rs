//! CLI argument definitions for the assembler.
//!
//! Flags mirror the fields of [`AssemblyConfig`]; any flag given on the
//! command line overrides the configuration file.

use crate::config::AssemblyConfig;
use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;

/// Build distributable archives from an assembly descriptor.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "assembler")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build distributable archives from an assembly descriptor.\n\n",
    "A descriptor lists the output formats (tar, tar.gz, tar.bz2, zip, jar, dir) ",
    "and the dependency sets and file sets that go into every archive. Each ",
    "format produces <final-name>-<id>.<format> in the output directory.\n\n",
    "Settings are read from assembler.toml when present (or the file given with ",
    "--config); command-line flags override them.",
))]
#[command(after_help = concat!(
    "BUILT-IN DESCRIPTORS:\n",
    "  bin                    README, LICENSE and NOTICE files plus built jars\n",
    "  jar-with-dependencies  Compiled classes with unpacked runtime dependencies\n",
    "  src                    Project sources and build files\n\n",
    "EXAMPLES:\n",
    "  Build the archives of a descriptor file:\n",
    "    $ assembler --descriptor src/assembly/dist.toml\n\n",
    "  Build the built-in source bundle with a custom name:\n",
    "    $ assembler --descriptor-id src --final-name widget-1.2",
))]
pub struct Cli {
    /// Configuration file [default: assembler.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Assembly descriptor file.
    #[arg(short, long, value_name = "FILE", conflicts_with = "descriptor_id")]
    pub descriptor: Option<Utf8PathBuf>,

    /// Built-in descriptor id (bin, jar-with-dependencies, src).
    #[arg(short = 'i', long, value_name = "ID")]
    pub descriptor_id: Option<String>,

    /// Project base directory [default: .].
    #[arg(short, long, value_name = "DIR")]
    pub base_dir: Option<Utf8PathBuf>,

    /// Archive name prefix [default: base directory name].
    #[arg(short = 'n', long, value_name = "NAME")]
    pub final_name: Option<String>,

    /// Directory receiving the archives [default: <base-dir>/target].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Scratch directory for staging [default: <output-dir>/archive-tmp].
    #[arg(short, long, value_name = "DIR")]
    pub work_root: Option<Utf8PathBuf>,

    /// TOML file listing resolved dependency artifacts.
    #[arg(short, long, value_name = "FILE")]
    pub artifacts: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// The configuration fields set on the command line.
    ///
    /// The `--artifacts` file is not read here; it is loaded once the
    /// descriptor source is known to be valid.
    #[must_use]
    pub fn overrides(&self) -> AssemblyConfig {
        AssemblyConfig {
            descriptor: self.descriptor.clone(),
            descriptor_id: self.descriptor_id.clone(),
            base_dir: self.base_dir.clone(),
            final_name: self.final_name.clone(),
            output_dir: self.output_dir.clone(),
            work_root: self.work_root.clone(),
            artifacts: Vec::new(),
        }
    }

    /// Log level selected by `-v`/`-q`.
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
