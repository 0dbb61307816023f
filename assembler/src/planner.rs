//! Translation of descriptor sets into archive-writer calls.
//!
//! Dependency sets are planned first, then file sets, each in descriptor
//! order. Modes, line-ending tokens and source directories are validated as
//! each set is reached, so a bad descriptor fails before the archive is
//! finalised.

use crate::archiver::Archiver;
use crate::artifact::ResolvedArtifact;
use crate::descriptor::{Assembly, DependencySet, FileMode, FileSet, LineEnding};
use crate::error::{AssemblyError, Result};
use crate::filter::ArtifactFilter;
use crate::mapping::evaluate_file_name_mapping;
use crate::paths::{join_entry, output_directory};
use crate::patterns::{PatternSet, default_excludes};
use crate::staging::LineEndingStager;
use crate::unpack::{UnpackCache, Unpacker};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Inputs shared by every set planned into one archive.
#[derive(Clone, Copy)]
pub struct PlanContext<'a> {
    /// Project base directory; relative file-set directories resolve here.
    pub base_dir: &'a Path,
    /// Name of the base directory inside the archive.
    pub final_name: &'a str,
    /// Scratch root for unpacked dependencies and staged file sets.
    pub work_root: &'a Path,
    /// The resolved dependencies available to dependency sets.
    pub artifacts: &'a [ResolvedArtifact],
    /// Extracts dependency archives for `unpack = true` sets.
    pub unpacker: &'a dyn Unpacker,
}

/// Plans the sets of one assembly into one archiver.
///
/// Line-ending staging directories are owned by the planner and removed
/// when it is dropped, so it must outlive the call that finalises the
/// archive.
pub struct ArchivePlanner<'a> {
    context: PlanContext<'a>,
    staged: Vec<TempDir>,
}

impl<'a> ArchivePlanner<'a> {
    /// Create a planner for `context`.
    #[must_use]
    pub const fn new(context: PlanContext<'a>) -> Self {
        Self {
            context,
            staged: Vec::new(),
        }
    }

    /// Staging directories created so far.
    pub fn staged_directories(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(TempDir::path)
    }

    /// Plan every dependency set and file set of `assembly`.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by any set.
    pub fn plan(&mut self, assembly: &Assembly, archiver: &mut dyn Archiver) -> Result<()> {
        for set in &assembly.dependency_sets {
            self.add_dependency_set(assembly, set, archiver)?;
        }
        for set in &assembly.file_sets {
            self.add_file_set(assembly, set, archiver)?;
        }
        Ok(())
    }

    /// Add the artifacts selected by a dependency set.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidMode`] for malformed modes,
    /// [`AssemblyError::TemplateEvaluation`] for a malformed filename
    /// mapping, and unpacking or archive errors as they occur.
    pub fn add_dependency_set(
        &mut self,
        assembly: &Assembly,
        set: &DependencySet,
        archiver: &mut dyn Archiver,
    ) -> Result<()> {
        let (directory_mode, file_mode) = parse_modes(&set.directory_mode, &set.file_mode)?;
        debug!(
            "dependency set: scope={}, directory mode={directory_mode}, file mode={file_mode}",
            set.scope
        );
        archiver.set_default_directory_mode(directory_mode);
        archiver.set_default_file_mode(file_mode);

        let filter = ArtifactFilter::for_dependency_set(set);
        let output = output_directory(
            set.output_directory.as_deref(),
            self.context.final_name,
            assembly.include_base_directory,
        );

        for artifact in self.context.artifacts.iter().filter(|a| filter.include(a)) {
            if set.unpack {
                let cache = UnpackCache::new(self.context.work_root);
                let unpacked = cache.ensure_unpacked(artifact, self.context.unpacker)?;
                archiver.add_directory(&unpacked, &output, &[], &default_excludes())?;
            } else {
                let name = evaluate_file_name_mapping(&set.output_file_name_mapping, artifact)?;
                archiver.add_file(artifact.path(), &join_entry(&output, &name))?;
            }
        }
        Ok(())
    }

    /// Add the directory tree described by a file set, staging it first
    /// when line endings are rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidMode`],
    /// [`AssemblyError::InvalidLineEnding`] or
    /// [`AssemblyError::SourceDirectoryMissing`] for configuration problems,
    /// and staging or archive errors as they occur.
    pub fn add_file_set(
        &mut self,
        assembly: &Assembly,
        set: &FileSet,
        archiver: &mut dyn Archiver,
    ) -> Result<()> {
        let (directory_mode, file_mode) = parse_modes(&set.directory_mode, &set.file_mode)?;
        let line_ending = LineEnding::parse(set.line_ending.as_deref())?;
        debug!(
            "file set: directory mode={directory_mode}, file mode={file_mode}, line ending={line_ending:?}"
        );
        archiver.set_default_directory_mode(directory_mode);
        archiver.set_default_file_mode(file_mode);

        let (source, output) = self.resolve_file_set_paths(set);
        let output = output_directory(
            output.as_deref(),
            self.context.final_name,
            assembly.include_base_directory,
        );
        if !source.is_dir() {
            return Err(AssemblyError::SourceDirectoryMissing { path: source });
        }

        let includes = set.includes.clone();
        let mut excludes = set.excludes.clone();
        excludes.extend(default_excludes());

        let archive_source = match line_ending.terminator() {
            Some(terminator) => self.stage(&source, terminator, &includes, &excludes)?,
            None => source,
        };
        archiver.add_directory(&archive_source, &output, &includes, &excludes)
    }

    /// Source directory on disk and the raw output directory for a file set.
    ///
    /// Without a directory the base directory is used and the output goes
    /// to the archive root; otherwise the output defaults to the directory
    /// string itself.
    fn resolve_file_set_paths(&self, set: &FileSet) -> (PathBuf, Option<String>) {
        match &set.directory {
            None => (
                self.context.base_dir.to_path_buf(),
                Some(set.output_directory.clone().unwrap_or_default()),
            ),
            Some(directory) => (
                self.context.base_dir.join(directory),
                Some(
                    set.output_directory
                        .clone()
                        .unwrap_or_else(|| directory.clone()),
                ),
            ),
        }
    }

    /// Copy the selected files into a fresh directory under the work root
    /// with rewritten line endings, returning that directory.
    fn stage(
        &mut self,
        source: &Path,
        terminator: &'static str,
        includes: &[String],
        excludes: &[String],
    ) -> Result<PathBuf> {
        let work_root = self.context.work_root;
        let staging_error = |e: std::io::Error| AssemblyError::Staging {
            source_path: source.to_path_buf(),
            target_path: work_root.to_path_buf(),
            source: e,
        };
        fs::create_dir_all(work_root).map_err(staging_error)?;
        let staged = tempfile::Builder::new()
            .prefix("line-endings-")
            .tempdir_in(work_root)
            .map_err(staging_error)?;
        debug!(
            "staging {} into {} with normalised line endings",
            source.display(),
            staged.path().display()
        );
        let patterns = PatternSet::new(includes, excludes)?;
        LineEndingStager::new(terminator).stage_tree(source, staged.path(), &patterns)?;
        let path = staged.path().to_path_buf();
        self.staged.push(staged);
        Ok(path)
    }
}

fn parse_modes(directory_mode: &str, file_mode: &str) -> Result<(FileMode, FileMode)> {
    Ok((
        FileMode::parse_octal("directory", directory_mode)?,
        FileMode::parse_octal("file", file_mode)?,
    ))
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
