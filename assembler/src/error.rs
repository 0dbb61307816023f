//! Error types for the assembler.
//!
//! Usage errors (bad descriptor sources, malformed modes, unknown formats)
//! are reported before any archive is finalised. I/O errors keep the paths of
//! the operation that failed so the caller can tell which input was at fault.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing an assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Neither an explicit descriptor nor a built-in descriptor id was given.
    #[error("you must specify a descriptor or a descriptor id")]
    MissingDescriptorSource,

    /// Both an explicit descriptor and a built-in descriptor id were given.
    #[error("descriptor {path} and descriptor id '{id}' are mutually exclusive")]
    ConflictingDescriptorSource {
        /// The explicit descriptor path.
        path: PathBuf,
        /// The built-in descriptor id.
        id: String,
    },

    /// A built-in descriptor with the requested id does not exist.
    #[error("descriptor with id '{id}' not found; available: {available}")]
    DescriptorNotFound {
        /// The requested id.
        id: String,
        /// Comma-separated list of built-in ids.
        available: String,
    },

    /// The descriptor file could not be read.
    #[error("unable to read descriptor {path}")]
    DescriptorRead {
        /// Path of the descriptor.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The descriptor could not be parsed.
    #[error("error parsing descriptor {origin}: {reason}")]
    DescriptorParse {
        /// Descriptor path or built-in id.
        origin: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A directory or file mode was not a valid octal permission string.
    #[error("invalid {kind} mode '{value}': expected an octal permission string")]
    InvalidMode {
        /// Which mode was invalid (`directory` or `file`).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A file set requested an unknown line-ending policy.
    #[error("illegal line ending specified: '{value}'")]
    InvalidLineEnding {
        /// The rejected token.
        value: String,
    },

    /// No archive writer is registered for the requested format.
    #[error("unable to obtain archiver for format '{format}'")]
    UnsupportedFormat {
        /// The requested format token.
        format: String,
    },

    /// A `tar.<suffix>` format named an unknown compression method.
    #[error("unknown compression format: {suffix}")]
    UnknownCompression {
        /// The unrecognised suffix.
        suffix: String,
    },

    /// An include or exclude pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the compile failure.
        reason: String,
    },

    /// A file set's source directory does not exist or is not a directory.
    #[error("source directory {path} is not readable")]
    SourceDirectoryMissing {
        /// The missing directory.
        path: PathBuf,
    },

    /// The field lookup behind a filename mapping failed.
    #[error("cannot evaluate file name mapping '{expression}': {reason}")]
    TemplateEvaluation {
        /// The placeholder expression that failed.
        expression: String,
        /// Description of the lookup failure.
        reason: String,
    },

    /// Copying a file into a staging area failed.
    #[error("error copying file {source_path} to {target_path}")]
    Staging {
        /// File being read.
        source_path: PathBuf,
        /// File being written.
        target_path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A dependency artifact could not be unpacked.
    #[error("unable to unpack {artifact}: {reason}")]
    Unpack {
        /// Path of the dependency archive.
        artifact: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Writing the final archive failed.
    #[error("error creating assembly {path}")]
    ArchiveWrite {
        /// Destination archive path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An archive was finalised before a destination file was set.
    #[error("no destination file set for archive")]
    MissingDestination,

    /// Invocation configuration could not be loaded.
    #[error("invalid configuration {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssemblyError {
    /// Whether this error is a configuration problem rather than a runtime
    /// failure.
    ///
    /// Usage errors are detected before any archive is written.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDescriptorSource
                | Self::ConflictingDescriptorSource { .. }
                | Self::DescriptorNotFound { .. }
                | Self::InvalidMode { .. }
                | Self::InvalidLineEnding { .. }
                | Self::UnsupportedFormat { .. }
                | Self::UnknownCompression { .. }
                | Self::InvalidPattern { .. }
                | Self::SourceDirectoryMissing { .. }
                | Self::Config { .. }
        )
    }
}

/// Result type alias using [`AssemblyError`].
pub type Result<T> = std::result::Result<T, AssemblyError>;
