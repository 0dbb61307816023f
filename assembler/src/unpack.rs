//! Unpacking of dependency archives for `unpack = true` dependency sets.
//!
//! Each artifact is extracted into `<work root>/<file name minus archive
//! extension>`. The directory acts as a cache: it is reused while it is newer
//! than the artifact and rebuilt from scratch otherwise.

use crate::artifact::ResolvedArtifact;
use crate::error::{AssemblyError, Result};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Archive containers a dependency can be unpacked from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveKind {
    /// Zip container, including jar, war and ear files.
    Zip,
    /// Uncompressed tar.
    Tar,
    /// Gzip-compressed tar.
    TarGz,
    /// Bzip2-compressed tar.
    TarBz2,
}

/// Extensions recognised as unpackable, longest first so compound tar
/// suffixes win over their last component.
const ARCHIVE_EXTENSIONS: &[(&str, ArchiveKind)] = &[
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar.gz", ArchiveKind::TarGz),
    (".tbz2", ArchiveKind::TarBz2),
    (".tgz", ArchiveKind::TarGz),
    (".tar", ArchiveKind::Tar),
    (".zip", ArchiveKind::Zip),
    (".jar", ArchiveKind::Zip),
    (".war", ArchiveKind::Zip),
    (".ear", ArchiveKind::Zip),
    (".sar", ArchiveKind::Zip),
    (".par", ArchiveKind::Zip),
];

impl ArchiveKind {
    /// Detect the archive kind from a file name, returning the kind and the
    /// name without its archive extension.
    #[must_use]
    pub fn detect(file_name: &str) -> Option<(Self, &str)> {
        let lower = file_name.to_ascii_lowercase();
        ARCHIVE_EXTENSIONS.iter().find_map(|(extension, kind)| {
            lower.ends_with(extension).then(|| {
                let stem = file_name.get(..file_name.len() - extension.len()).unwrap_or(file_name);
                (*kind, stem)
            })
        })
    }
}

/// Extracts an archive into a directory, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait Unpacker {
    /// Extract `archive` of the given kind into `dest_dir`, returning the
    /// number of files written.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Unpack`] if the archive is unreadable or an
    /// entry escapes `dest_dir`.
    fn unpack(&self, archive: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<usize>;
}

/// Default unpacker backed by the `zip`, `tar`, `flate2` and `bzip2` crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveUnpacker;

impl Unpacker for ArchiveUnpacker {
    fn unpack(&self, archive: &Path, kind: ArchiveKind, dest_dir: &Path) -> Result<usize> {
        let unpack_error = |reason: String| AssemblyError::Unpack {
            artifact: archive.to_path_buf(),
            reason,
        };
        let file = File::open(archive).map_err(|e| unpack_error(e.to_string()))?;
        let reader = BufReader::new(file);
        let result = match kind {
            ArchiveKind::Zip => unpack_zip(reader, dest_dir),
            ArchiveKind::Tar => unpack_tar(reader, dest_dir),
            ArchiveKind::TarGz => unpack_tar(flate2::read::GzDecoder::new(reader), dest_dir),
            ArchiveKind::TarBz2 => unpack_tar(bzip2::read::BzDecoder::new(reader), dest_dir),
        };
        result.map_err(unpack_error)
    }
}

fn unpack_zip<R: Read + io::Seek>(reader: R, dest_dir: &Path) -> std::result::Result<usize, String> {
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| e.to_string())?;
    let mut files = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| e.to_string())?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| format!("path traversal detected: {}", entry.name()))?;
        let dest_path = dest_dir.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&dest_path).map_err(|e| e.to_string())?;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut output = File::create(&dest_path).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut output).map_err(|e| e.to_string())?;
        files += 1;
    }
    Ok(files)
}

fn unpack_tar<R: Read>(reader: R, dest_dir: &Path) -> std::result::Result<usize, String> {
    let mut archive = tar::Archive::new(reader);
    let mut files = 0;
    for entry_result in archive.entries().map_err(|e| e.to_string())? {
        let mut entry = entry_result.map_err(|e| e.to_string())?;
        let entry_path = entry.path().map_err(|e| e.to_string())?.into_owned();
        validate_entry_path(&entry_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            return Err(format!("link entries are not supported: {}", entry_path.display()));
        }
        // `unpack_in` refuses anything that resolves outside `dest_dir`.
        if !entry.unpack_in(dest_dir).map_err(|e| e.to_string())? {
            return Err(format!("path traversal detected: {}", entry_path.display()));
        }
        if entry_type.is_file() {
            files += 1;
        }
    }
    Ok(files)
}

/// Reject entry paths that are absolute or climb out via `..`.
fn validate_entry_path(path: &Path) -> std::result::Result<(), String> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(format!("path traversal detected: {}", path.display()));
    }
    Ok(())
}

/// Per-artifact unpack directories under a work root.
#[derive(Clone, Debug)]
pub struct UnpackCache {
    work_root: PathBuf,
}

impl UnpackCache {
    /// Create a cache rooted at `work_root`.
    #[must_use]
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
        }
    }

    /// The directory an artifact is unpacked into, with the archive kind.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Unpack`] if the artifact has no file name or
    /// is not a recognised archive.
    pub fn location(&self, artifact: &ResolvedArtifact) -> Result<(PathBuf, ArchiveKind)> {
        let unsupported = |reason: &str| AssemblyError::Unpack {
            artifact: artifact.path().to_path_buf(),
            reason: reason.to_owned(),
        };
        let name = artifact
            .file_name()
            .ok_or_else(|| unsupported("artifact path has no file name"))?;
        let (kind, stem) =
            ArchiveKind::detect(name).ok_or_else(|| unsupported("not a recognised archive type"))?;
        Ok((self.work_root.join(stem), kind))
    }

    /// Return the unpacked directory for `artifact`, extracting it first if
    /// the cached copy is missing or stale.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Unpack`] if extraction fails or the cache
    /// directory cannot be managed.
    pub fn ensure_unpacked(
        &self,
        artifact: &ResolvedArtifact,
        unpacker: &dyn Unpacker,
    ) -> Result<PathBuf> {
        let (location, kind) = self.location(artifact)?;
        let cache_error = |e: io::Error| AssemblyError::Unpack {
            artifact: artifact.path().to_path_buf(),
            reason: format!("cannot prepare {}: {e}", location.display()),
        };

        if location.is_dir() {
            if !is_stale(artifact.path(), &location)? {
                debug!("reusing unpacked {}", location.display());
                return Ok(location);
            }
            warn!(
                "{} is newer than its unpacked copy; rebuilding {}",
                artifact.path().display(),
                location.display()
            );
            fs::remove_dir_all(&location).map_err(cache_error)?;
        }

        fs::create_dir_all(&location).map_err(cache_error)?;
        let files = unpacker.unpack(artifact.path(), kind, &location)?;
        debug!("unpacked {files} file(s) into {}", location.display());
        Ok(location)
    }
}

/// Whether `artifact` was modified after `location`.
fn is_stale(artifact: &Path, location: &Path) -> Result<bool> {
    let artifact_time = fs::metadata(artifact)
        .and_then(|m| m.modified())
        .map_err(|e| AssemblyError::Unpack {
            artifact: artifact.to_path_buf(),
            reason: e.to_string(),
        })?;
    let cache_time = fs::metadata(location)
        .and_then(|m| m.modified())
        .map_err(|e| AssemblyError::Unpack {
            artifact: artifact.to_path_buf(),
            reason: format!("cannot inspect {}: {e}", location.display()),
        })?;
    Ok(artifact_time > cache_time)
}

#[cfg(test)]
#[path = "unpack_tests.rs"]
mod tests;
