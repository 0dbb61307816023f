//! Tar output, optionally compressed.

use super::{Entries, EntrySource, EntryWriter};
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tar::{Builder, EntryType, Header};

/// Compression applied to a tar stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TarCompression {
    /// Plain, uncompressed tar.
    #[default]
    None,
    /// Gzip, for `tar.gz`.
    Gzip,
    /// Bzip2, for `tar.bz2`.
    Bzip2,
}

/// Writes entries as a tar stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TarFormat {
    compression: TarCompression,
}

impl TarFormat {
    /// A tar writer using `compression`.
    #[must_use]
    pub const fn new(compression: TarCompression) -> Self {
        Self { compression }
    }

    /// The configured compression.
    #[must_use]
    pub const fn compression(&self) -> TarCompression {
        self.compression
    }
}

impl EntryWriter for TarFormat {
    fn write_entries(&self, dest: &Path, entries: &Entries) -> io::Result<()> {
        let output = BufWriter::new(File::create(dest)?);
        let mut output = match self.compression {
            TarCompression::None => write_tar(output, entries)?,
            TarCompression::Gzip => {
                let encoder = GzBuilder::new()
                    .mtime(0)
                    .write(output, Compression::default());
                write_tar(encoder, entries)?.finish()?
            }
            TarCompression::Bzip2 => {
                let encoder = bzip2::write::BzEncoder::new(output, bzip2::Compression::default());
                write_tar(encoder, entries)?.finish()?
            }
        };
        output.flush()
    }
}

fn write_tar<W: Write>(output: W, entries: &Entries) -> io::Result<W> {
    let mut builder = Builder::new(output);
    for (path, entry) in entries {
        let mut header = Header::new_gnu();
        header.set_mode(entry.mode.bits());
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        match &entry.source {
            EntrySource::Directory => {
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                builder.append_data(&mut header, format!("{path}/"), io::empty())?;
            }
            EntrySource::File(source) => {
                let file = File::open(source)?;
                header.set_entry_type(EntryType::Regular);
                header.set_size(file.metadata()?.len());
                builder.append_data(&mut header, path, file)?;
            }
        }
    }
    builder.into_inner()
}
