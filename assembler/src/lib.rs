//! Assembler library.
//!
//! Builds distributable archives (tar, tar.gz, tar.bz2, zip, jar, or an
//! exploded directory) from a declarative assembly descriptor. It is used by
//! the `assembler` CLI binary and can be driven programmatically through
//! [`driver::assemble`].
//!
//! # Modules
//!
//! - [`archiver`] - Archive-writer trait and the tar, zip and directory writers
//! - [`artifact`] - Resolved dependency artifacts and the scope hierarchy
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Invocation configuration and defaults
//! - [`descriptor`] - Assembly descriptor model and loading
//! - [`driver`] - Per-format orchestration of an assembly
//! - [`error`] - Semantic error types
//! - [`filter`] - Dependency selection by scope and coordinate patterns
//! - [`mapping`] - Filename-mapping templates for dependency entries
//! - [`paths`] - In-archive output directory computation
//! - [`patterns`] - Include/exclude globs, default excludes and tree scanning
//! - [`planner`] - Translation of dependency and file sets into archive entries
//! - [`selector`] - Format token to archive-writer mapping
//! - [`staging`] - Line-ending normalisation of file sets
//! - [`unpack`] - Cached extraction of dependency archives

pub mod archiver;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod paths;
pub mod patterns;
pub mod planner;
pub mod selector;
pub mod staging;
pub mod unpack;
