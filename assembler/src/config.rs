//! Invocation configuration.
//!
//! Settings come from an optional TOML file (`assembler.toml` in the working
//! directory, or the file named by `--config`) and are overridden field by
//! field by command-line flags. [`AssemblyConfig::resolve`] then fills in
//! defaults and produces an [`AssemblyRequest`].

use crate::artifact::ResolvedArtifact;
use crate::descriptor::reader::DescriptorSource;
use crate::driver::AssemblyRequest;
use crate::error::{AssemblyError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "assembler.toml";

/// Output directory, relative to the base directory, when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "target";

/// Work root, relative to the output directory, when none is given.
pub const DEFAULT_WORK_ROOT: &str = "archive-tmp";

/// Final name used when the base directory has no usable name.
const FALLBACK_FINAL_NAME: &str = "assembly";

/// Assembly settings before defaults are applied.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// Explicit descriptor file.
    pub descriptor: Option<Utf8PathBuf>,
    /// Built-in descriptor id.
    pub descriptor_id: Option<String>,
    /// Project base directory.
    pub base_dir: Option<Utf8PathBuf>,
    /// Archive name prefix.
    pub final_name: Option<String>,
    /// Directory receiving the archives.
    pub output_dir: Option<Utf8PathBuf>,
    /// Scratch root for unpacking and staging.
    pub work_root: Option<Utf8PathBuf>,
    /// Resolved dependencies. Relative files resolve against the base
    /// directory.
    pub artifacts: Vec<ResolvedArtifact>,
}

/// A standalone artifact list, as read by `--artifacts`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<ResolvedArtifact>,
}

impl AssemblyConfig {
    /// Parse configuration from TOML text; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] for malformed TOML or unknown keys.
    pub fn from_toml(text: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| config_error(origin, &e.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        debug!("loading configuration from {path}");
        let text = fs::read_to_string(path).map_err(|e| config_error(path, &e.to_string()))?;
        Self::from_toml(&text, path)
    }

    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] if a chosen file cannot be loaded.
    pub fn discover(explicit: Option<&Utf8Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Utf8Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Replace artifacts with those listed in a standalone TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] if the file cannot be loaded.
    pub fn load_artifacts(path: &Utf8Path) -> Result<Vec<ResolvedArtifact>> {
        let text = fs::read_to_string(path).map_err(|e| config_error(path, &e.to_string()))?;
        let list: ArtifactList =
            toml::from_str(&text).map_err(|e| config_error(path, &e.to_string()))?;
        Ok(list.artifacts)
    }

    /// Apply `overrides` on top of `self`, field by field.
    ///
    /// Naming either descriptor source in `overrides` replaces both sources,
    /// so a command-line `--descriptor-id` wins over a file's `descriptor`.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        let (descriptor, descriptor_id) =
            if overrides.descriptor.is_some() || overrides.descriptor_id.is_some() {
                (overrides.descriptor, overrides.descriptor_id)
            } else {
                (self.descriptor, self.descriptor_id)
            };
        Self {
            descriptor,
            descriptor_id,
            base_dir: overrides.base_dir.or(self.base_dir),
            final_name: overrides.final_name.or(self.final_name),
            output_dir: overrides.output_dir.or(self.output_dir),
            work_root: overrides.work_root.or(self.work_root),
            artifacts: if overrides.artifacts.is_empty() {
                self.artifacts
            } else {
                overrides.artifacts
            },
        }
    }

    /// The descriptor source named by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingDescriptorSource`] or
    /// [`AssemblyError::ConflictingDescriptorSource`] unless exactly one
    /// source is set.
    pub fn descriptor_source(&self) -> Result<DescriptorSource> {
        DescriptorSource::from_options(
            self.descriptor.as_deref().map(Utf8Path::as_std_path),
            self.descriptor_id.as_deref(),
        )
    }

    /// Validate the descriptor source and apply defaults.
    ///
    /// The descriptor source is checked first, before anything else is
    /// looked up.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingDescriptorSource`] or
    /// [`AssemblyError::ConflictingDescriptorSource`] unless exactly one
    /// descriptor source is set.
    pub fn resolve(self) -> Result<AssemblyRequest> {
        let source = self.descriptor_source()?;

        let base_dir = self.base_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| base_dir.join(DEFAULT_OUTPUT_DIR));
        let work_root = self
            .work_root
            .unwrap_or_else(|| output_dir.join(DEFAULT_WORK_ROOT));
        let final_name = self
            .final_name
            .unwrap_or_else(|| default_final_name(&base_dir));
        let base_std = base_dir.clone().into_std_path_buf();
        let artifacts = self
            .artifacts
            .into_iter()
            .map(|mut artifact| {
                if artifact.file.is_relative() {
                    artifact.file = base_std.join(&artifact.file);
                }
                artifact
            })
            .collect();

        Ok(AssemblyRequest {
            source,
            base_dir: base_std,
            final_name,
            output_dir: output_dir.into_std_path_buf(),
            work_root: work_root.into_std_path_buf(),
            artifacts,
        })
    }
}

/// The base directory's own name, resolving `.` and similar through the
/// current directory.
fn default_final_name(base_dir: &Utf8Path) -> String {
    if let Some(name) = base_dir.file_name() {
        return name.to_owned();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(base_dir))
        .ok()
        .and_then(|path| path.canonicalize().ok())
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map_or_else(|| FALLBACK_FINAL_NAME.to_owned(), str::to_owned)
}

fn config_error(path: &Utf8Path, reason: &str) -> AssemblyError {
    AssemblyError::Config {
        path: PathBuf::from(path.as_std_path()),
        reason: reason.to_owned(),
    }
}
