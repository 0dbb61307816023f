//! Zip output, also used for jar files.

use super::{Entries, EntrySource, EntryWriter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

/// Writes entries as a zip container.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ZipFormat;

impl EntryWriter for ZipFormat {
    fn write_entries(&self, dest: &Path, entries: &Entries) -> io::Result<()> {
        let mut writer = ZipWriter::new(BufWriter::new(File::create(dest)?));
        for (path, entry) in entries {
            let options = SimpleFileOptions::default()
                .last_modified_time(DateTime::default())
                .unix_permissions(entry.mode.bits());
            match &entry.source {
                EntrySource::Directory => {
                    writer
                        .add_directory(format!("{path}/"), options)
                        .map_err(io::Error::other)?;
                }
                EntrySource::File(source) => {
                    writer
                        .start_file(path.as_str(), options)
                        .map_err(io::Error::other)?;
                    let mut input = File::open(source)?;
                    io::copy(&mut input, &mut writer)?;
                }
            }
        }
        writer.finish().map_err(io::Error::other)?.flush()
    }
}
