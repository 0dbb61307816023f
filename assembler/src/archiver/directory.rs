//! Exploded directory output for the `dir` format.

use super::{Entries, EntrySource, EntryWriter};
use std::fs;
use std::io;
use std::path::Path;

/// Writes entries as plain files under a destination directory.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirectoryFormat;

impl EntryWriter for DirectoryFormat {
    fn write_entries(&self, dest: &Path, entries: &Entries) -> io::Result<()> {
        clear_destination(dest)?;
        fs::create_dir_all(dest)?;
        let mut directories = Vec::new();
        for (path, entry) in entries {
            let target = dest.join(path);
            match &entry.source {
                EntrySource::Directory => {
                    fs::create_dir_all(&target)?;
                    directories.push((target, entry.mode.bits()));
                }
                EntrySource::File(source) => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::copy(source, &target)?;
                    set_mode(&target, entry.mode.bits())?;
                }
            }
        }
        // Deepest first, so a read-only parent never blocks its children.
        for (directory, bits) in directories.iter().rev() {
            set_mode(directory, *bits)?;
        }
        Ok(())
    }
}

/// Remove the output of an earlier run, making its directories writable
/// first.
fn clear_destination(dest: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(dest) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if metadata.is_dir() {
        make_tree_writable(dest)?;
        fs::remove_dir_all(dest)
    } else {
        fs::remove_file(dest)
    }
}

fn make_tree_writable(directory: &Path) -> io::Result<()> {
    set_mode(directory, 0o700)?;
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            make_tree_writable(&entry.path())?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, bits: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(bits))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _bits: u32) -> io::Result<()> {
    Ok(())
}
