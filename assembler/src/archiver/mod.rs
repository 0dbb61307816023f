//! Archive writers.
//!
//! The planner talks to a writer only through the [`Archiver`] trait. Every
//! concrete writer shares the same entry bookkeeping ([`EntryArchiver`]) and
//! differs only in how the collected entries are serialised on finalisation:
//! a tar stream, a zip container, or an exploded directory.
//!
//! Entries are keyed by their path inside the archive. Adding a second entry
//! at the same path replaces the first, and entries are written in sorted
//! order so the same inputs always produce the same archive.

mod directory;
mod tar_writer;
mod zip_writer;

pub use directory::DirectoryFormat;
pub use tar_writer::{TarCompression, TarFormat};
pub use zip_writer::ZipFormat;

use crate::descriptor::FileMode;
use crate::error::{AssemblyError, Result};
use crate::patterns::{PatternSet, scan_directory, slash_path};
use log::trace;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default permission bits for directories added without an explicit mode.
pub const DEFAULT_DIRECTORY_BITS: u32 = 0o755;

/// Default permission bits for files added without an explicit mode.
pub const DEFAULT_FILE_BITS: u32 = 0o644;

/// The operations the planner issues against an archive writer.
#[cfg_attr(test, mockall::automock)]
pub trait Archiver {
    /// Set the mode applied to directories added from now on.
    fn set_default_directory_mode(&mut self, mode: FileMode);

    /// Set the mode applied to files added from now on.
    fn set_default_file_mode(&mut self, mode: FileMode);

    /// The mode currently applied to new directories.
    fn default_directory_mode(&self) -> FileMode;

    /// The mode currently applied to new files.
    fn default_file_mode(&self) -> FileMode;

    /// Add a single file at `dest` inside the archive.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::ArchiveWrite`] if `source` is not a readable
    /// file.
    fn add_file(&mut self, source: &Path, dest: &str) -> Result<()>;

    /// Add the tree under `source` at `prefix`, keeping the entries selected
    /// by `includes` and `excludes`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidPattern`] for malformed patterns and
    /// [`AssemblyError::SourceDirectoryMissing`] if `source` is not a
    /// directory.
    fn add_directory(
        &mut self,
        source: &Path,
        prefix: &str,
        includes: &[String],
        excludes: &[String],
    ) -> Result<()>;

    /// Set the file (or directory, for exploded output) to write.
    fn set_dest_file(&mut self, dest: PathBuf);

    /// Write every collected entry to the destination and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingDestination`] if no destination was
    /// set and [`AssemblyError::ArchiveWrite`] if writing fails.
    fn create_archive(&mut self) -> Result<PathBuf>;
}

/// What an archive entry is made from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntrySource {
    /// A directory entry with no content.
    Directory,
    /// A regular file copied from disk.
    File(PathBuf),
}

/// One entry queued for writing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchiveEntry {
    /// Where the content comes from.
    pub source: EntrySource,
    /// Permission bits recorded when the entry was added.
    pub mode: FileMode,
}

impl ArchiveEntry {
    /// Whether this entry is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.source, EntrySource::Directory)
    }
}

/// Collected entries, keyed by `/`-separated archive path without a
/// trailing separator.
pub type Entries = BTreeMap<String, ArchiveEntry>;

/// Serialises collected entries into one concrete output format.
pub trait EntryWriter {
    /// Write `entries` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing.
    fn write_entries(&self, dest: &Path, entries: &Entries) -> io::Result<()>;
}

/// An [`Archiver`] that collects entries in memory and hands them to a
/// format-specific [`EntryWriter`] on finalisation.
#[derive(Debug)]
pub struct EntryArchiver<W> {
    format: W,
    directory_mode: FileMode,
    file_mode: FileMode,
    entries: Entries,
    dest_file: Option<PathBuf>,
}

/// Archiver producing tar streams.
pub type TarArchiver = EntryArchiver<TarFormat>;

/// Archiver producing zip and jar containers.
pub type ZipArchiver = EntryArchiver<ZipFormat>;

/// Archiver producing exploded directories.
pub type DirectoryArchiver = EntryArchiver<DirectoryFormat>;

impl<W: EntryWriter> EntryArchiver<W> {
    /// Create an empty archiver for `format`.
    #[must_use]
    pub fn new(format: W) -> Self {
        Self {
            format,
            directory_mode: FileMode::new(DEFAULT_DIRECTORY_BITS),
            file_mode: FileMode::new(DEFAULT_FILE_BITS),
            entries: Entries::new(),
            dest_file: None,
        }
    }

    /// The output format.
    #[must_use]
    pub const fn format(&self) -> &W {
        &self.format
    }

    /// The entries collected so far.
    #[must_use]
    pub const fn entries(&self) -> &Entries {
        &self.entries
    }

    fn insert(&mut self, path: &str, source: EntrySource) -> Result<()> {
        let key = normalise_entry_path(path);
        if key.split('/').any(|segment| segment == "..") {
            return Err(AssemblyError::ArchiveWrite {
                path: PathBuf::from(path),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "entry path climbs out of the archive root",
                ),
            });
        }
        if key.is_empty() {
            return Ok(());
        }
        self.add_parent_directories(&key);
        let mode = match source {
            EntrySource::Directory => self.directory_mode,
            EntrySource::File(_) => self.file_mode,
        };
        trace!("planned entry {key} ({mode})");
        self.entries.insert(key, ArchiveEntry { source, mode });
        Ok(())
    }

    /// Register every ancestor of `key` as a directory unless already present.
    fn add_parent_directories(&mut self, key: &str) {
        let mut end = 0;
        while let Some(offset) = key.get(end..).and_then(|rest| rest.find('/')) {
            end += offset;
            if let Some(parent) = key.get(..end) {
                self.entries
                    .entry(parent.to_owned())
                    .or_insert(ArchiveEntry {
                        source: EntrySource::Directory,
                        mode: self.directory_mode,
                    });
            }
            end += 1;
        }
    }
}

impl<W: EntryWriter> Archiver for EntryArchiver<W> {
    fn set_default_directory_mode(&mut self, mode: FileMode) {
        self.directory_mode = mode;
    }

    fn set_default_file_mode(&mut self, mode: FileMode) {
        self.file_mode = mode;
    }

    fn default_directory_mode(&self) -> FileMode {
        self.directory_mode
    }

    fn default_file_mode(&self) -> FileMode {
        self.file_mode
    }

    fn add_file(&mut self, source: &Path, dest: &str) -> Result<()> {
        if !source.is_file() {
            return Err(AssemblyError::ArchiveWrite {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not a readable file"),
            });
        }
        self.insert(dest, EntrySource::File(source.to_path_buf()))
    }

    fn add_directory(
        &mut self,
        source: &Path,
        prefix: &str,
        includes: &[String],
        excludes: &[String],
    ) -> Result<()> {
        let patterns = PatternSet::new(includes, excludes)?;
        let selection = scan_directory(source, &patterns)?;

        self.insert(prefix, EntrySource::Directory)?;
        for directory in &selection.directories {
            self.insert(
                &crate::paths::join_entry(prefix, &slash_path(directory)),
                EntrySource::Directory,
            )?;
        }
        for file in &selection.files {
            self.insert(
                &crate::paths::join_entry(prefix, &slash_path(file)),
                EntrySource::File(source.join(file)),
            )?;
        }
        Ok(())
    }

    fn set_dest_file(&mut self, dest: PathBuf) {
        self.dest_file = Some(dest);
    }

    fn create_archive(&mut self) -> Result<PathBuf> {
        let dest = self
            .dest_file
            .clone()
            .ok_or(AssemblyError::MissingDestination)?;
        let write_error = |source: io::Error| AssemblyError::ArchiveWrite {
            path: dest.clone(),
            source,
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        self.format
            .write_entries(&dest, &self.entries)
            .map_err(write_error)?;
        Ok(dest)
    }
}

/// Strip leading and trailing separators and unify them to `/`.
fn normalise_entry_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "archiver_tests.rs"]
mod tests;
