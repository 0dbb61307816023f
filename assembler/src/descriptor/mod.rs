//! Assembly descriptor model.
//!
//! A descriptor names the archive formats to produce and the dependency sets
//! and file sets that populate each archive. The model is passive: mode
//! strings and line-ending tokens are kept as written and validated by the
//! planner when they are used.

pub mod reader;

use crate::error::{AssemblyError, Result};
use serde::Deserialize;
use std::fmt;

/// Default mapping applied to dependency file names.
pub const DEFAULT_FILE_NAME_MAPPING: &str = "${artifactId}-${version}.${extension}";

/// Default permission bits for directories, in octal.
pub const DEFAULT_DIRECTORY_MODE: &str = "755";

/// Default permission bits for files, in octal.
pub const DEFAULT_FILE_MODE: &str = "644";

/// One assembly request: the archives to build and what goes into them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Assembly {
    /// Identifier appended to the final name of every produced archive.
    pub id: String,
    /// Requested output formats, e.g. `zip` or `tar.gz`.
    #[serde(default)]
    pub formats: Vec<String>,
    /// Whether archive paths are nested under a directory named after the
    /// final name.
    #[serde(default = "default_true")]
    pub include_base_directory: bool,
    /// Dependency sets, processed in order.
    #[serde(default)]
    pub dependency_sets: Vec<DependencySet>,
    /// File sets, processed in order after the dependency sets.
    #[serde(default)]
    pub file_sets: Vec<FileSet>,
}

const fn default_true() -> bool {
    true
}

/// A filtered subset of resolved dependencies placed into the archive.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DependencySet {
    /// Output directory inside the archive; `None` means the archive root.
    pub output_directory: Option<String>,
    /// Directory permission bits as an octal string.
    pub directory_mode: String,
    /// File permission bits as an octal string.
    pub file_mode: String,
    /// Scope selector, e.g. `runtime`.
    pub scope: String,
    /// Coordinate patterns an artifact must match to be included.
    pub includes: Vec<String>,
    /// Coordinate patterns that exclude an artifact.
    pub excludes: Vec<String>,
    /// Whether matching artifacts are unpacked instead of copied.
    pub unpack: bool,
    /// Template producing each artifact's file name.
    pub output_file_name_mapping: String,
}

impl Default for DependencySet {
    fn default() -> Self {
        Self {
            output_directory: None,
            directory_mode: DEFAULT_DIRECTORY_MODE.to_owned(),
            file_mode: DEFAULT_FILE_MODE.to_owned(),
            scope: "runtime".to_owned(),
            includes: Vec::new(),
            excludes: Vec::new(),
            unpack: false,
            output_file_name_mapping: DEFAULT_FILE_NAME_MAPPING.to_owned(),
        }
    }
}

/// A filtered directory subtree placed into the archive.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSet {
    /// Source directory, relative to the base directory. `None` means the
    /// base directory itself.
    pub directory: Option<String>,
    /// Output directory inside the archive. Defaults to `directory`.
    pub output_directory: Option<String>,
    /// Directory permission bits as an octal string.
    pub directory_mode: String,
    /// File permission bits as an octal string.
    pub file_mode: String,
    /// Glob patterns selecting files; empty selects everything.
    pub includes: Vec<String>,
    /// Glob patterns removing files from the selection.
    pub excludes: Vec<String>,
    /// Line-ending policy token (`keep`, `dos`, `crlf`, `unix`, `lf`).
    pub line_ending: Option<String>,
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            directory: None,
            output_directory: None,
            directory_mode: DEFAULT_DIRECTORY_MODE.to_owned(),
            file_mode: DEFAULT_FILE_MODE.to_owned(),
            includes: Vec::new(),
            excludes: Vec::new(),
            line_ending: None,
        }
    }
}

/// Line-ending normalisation applied to a file set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineEnding {
    /// Copy files untouched.
    #[default]
    Keep,
    /// Terminate every line with `\r\n`.
    Dos,
    /// Terminate every line with `\n`.
    Unix,
}

impl LineEnding {
    /// Parse an optional policy token. A missing token means [`Self::Keep`].
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidLineEnding`] for unknown tokens.
    pub fn parse(token: Option<&str>) -> Result<Self> {
        match token {
            None | Some("keep") => Ok(Self::Keep),
            Some("dos" | "crlf") => Ok(Self::Dos),
            Some("unix" | "lf") => Ok(Self::Unix),
            Some(other) => Err(AssemblyError::InvalidLineEnding {
                value: other.to_owned(),
            }),
        }
    }

    /// The terminator written after each line, or `None` when files are kept
    /// as they are.
    #[must_use]
    pub const fn terminator(self) -> Option<&'static str> {
        match self {
            Self::Keep => None,
            Self::Dos => Some("\r\n"),
            Self::Unix => Some("\n"),
        }
    }
}

/// Permission bits parsed from an octal string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileMode(u32);

impl FileMode {
    /// Wrap raw permission bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Parse an octal permission string such as `"755"` or `"0644"`.
    ///
    /// `kind` names the mode in the error message.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidMode`] when `value` is not octal or
    /// exceeds `0o7777`.
    pub fn parse_octal(kind: &'static str, value: &str) -> Result<Self> {
        let invalid = || AssemblyError::InvalidMode {
            kind,
            value: value.to_owned(),
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let bits = u32::from_str_radix(trimmed, 8).map_err(|_| invalid())?;
        if bits > 0o7777 {
            return Err(invalid());
        }
        Ok(Self(bits))
    }

    /// The raw permission bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}
