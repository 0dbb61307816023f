//! Descriptor loading.
//!
//! A descriptor comes either from an explicit TOML file or from one of the
//! built-in descriptors compiled into the binary. Exactly one source must be
//! named; that check happens before the filesystem is touched.

use super::Assembly;
use crate::error::{AssemblyError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Built-in descriptors, keyed by id.
pub const BUILTIN_DESCRIPTORS: &[(&str, &str)] = &[
    ("bin", include_str!("builtin/bin.toml")),
    (
        "jar-with-dependencies",
        include_str!("builtin/jar-with-dependencies.toml"),
    ),
    ("src", include_str!("builtin/src.toml")),
];

/// Where a descriptor is read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DescriptorSource {
    /// A descriptor file on disk.
    File(PathBuf),
    /// A built-in descriptor id such as `bin`.
    Builtin(String),
}

impl DescriptorSource {
    /// Choose the descriptor source from the two mutually exclusive options.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingDescriptorSource`] when neither is
    /// given and [`AssemblyError::ConflictingDescriptorSource`] when both are.
    pub fn from_options(descriptor: Option<&Path>, descriptor_id: Option<&str>) -> Result<Self> {
        match (descriptor, descriptor_id) {
            (Some(path), None) => Ok(Self::File(path.to_path_buf())),
            (None, Some(id)) => Ok(Self::Builtin(id.to_owned())),
            (None, None) => Err(AssemblyError::MissingDescriptorSource),
            (Some(path), Some(id)) => Err(AssemblyError::ConflictingDescriptorSource {
                path: path.to_path_buf(),
                id: id.to_owned(),
            }),
        }
    }

    /// Read and parse the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::DescriptorRead`] if the file cannot be read,
    /// [`AssemblyError::DescriptorNotFound`] for an unknown built-in id, and
    /// [`AssemblyError::DescriptorParse`] for malformed content.
    pub fn read(&self) -> Result<Assembly> {
        match self {
            Self::File(path) => {
                debug!("reading descriptor {}", path.display());
                let text =
                    fs::read_to_string(path).map_err(|source| AssemblyError::DescriptorRead {
                        path: path.clone(),
                        source,
                    })?;
                parse_assembly(&text, &path.display().to_string())
            }
            Self::Builtin(id) => {
                debug!("using built-in descriptor '{id}'");
                let text = builtin_descriptor(id).ok_or_else(|| AssemblyError::DescriptorNotFound {
                    id: id.clone(),
                    available: builtin_ids().join(", "),
                })?;
                parse_assembly(text, id)
            }
        }
    }
}

/// Look up the text of a built-in descriptor.
#[must_use]
pub fn builtin_descriptor(id: &str) -> Option<&'static str> {
    BUILTIN_DESCRIPTORS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, text)| *text)
}

/// Ids of all built-in descriptors.
#[must_use]
pub fn builtin_ids() -> Vec<&'static str> {
    BUILTIN_DESCRIPTORS.iter().map(|(name, _)| *name).collect()
}

/// Parse descriptor text. `origin` names the source in error messages.
///
/// # Errors
///
/// Returns [`AssemblyError::DescriptorParse`] if the text is not a valid
/// descriptor.
pub fn parse_assembly(text: &str, origin: &str) -> Result<Assembly> {
    toml::from_str(text).map_err(|e| AssemblyError::DescriptorParse {
        origin: origin.to_owned(),
        reason: e.to_string(),
    })
}
