//! Mapping from format tokens to archive writers.

use crate::archiver::{
    Archiver, DirectoryArchiver, DirectoryFormat, TarArchiver, TarCompression, TarFormat,
    ZipArchiver, ZipFormat,
};
use crate::error::{AssemblyError, Result};
use std::fmt;

/// Compression qualifiers accepted after `tar.`.
pub const COMPRESSION_SUFFIXES: &[(&str, TarCompression)] = &[
    ("gz", TarCompression::Gzip),
    ("bz2", TarCompression::Bzip2),
];

/// An output format with a registered writer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveFormat {
    /// A tar stream with the given compression.
    Tar(TarCompression),
    /// A zip container; jar, war and ear files are zips too.
    Zip,
    /// An exploded directory.
    Directory,
}

impl ArchiveFormat {
    /// Parse a format token such as `zip` or `tar.gz`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UnknownCompression`] for a `tar.<suffix>`
    /// token with an unrecognised suffix and
    /// [`AssemblyError::UnsupportedFormat`] for any other unknown token.
    ///
    /// ```
    /// use assembler::archiver::TarCompression;
    /// use assembler::selector::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::parse("tar.bz2").ok(),
    ///     Some(ArchiveFormat::Tar(TarCompression::Bzip2))
    /// );
    /// assert!(ArchiveFormat::parse("tar.xyz").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        if token == "tar" {
            return Ok(Self::Tar(TarCompression::None));
        }
        if let Some(suffix) = token.strip_prefix("tar.") {
            return COMPRESSION_SUFFIXES
                .iter()
                .find(|(name, _)| *name == suffix)
                .map(|(_, compression)| Self::Tar(*compression))
                .ok_or_else(|| AssemblyError::UnknownCompression {
                    suffix: suffix.to_owned(),
                });
        }
        match token {
            "zip" | "jar" | "war" | "ear" => Ok(Self::Zip),
            "dir" => Ok(Self::Directory),
            other => Err(AssemblyError::UnsupportedFormat {
                format: other.to_owned(),
            }),
        }
    }

    /// A fresh, empty writer for this format.
    #[must_use]
    pub fn archiver(self) -> Box<dyn Archiver> {
        match self {
            Self::Tar(compression) => Box::new(TarArchiver::new(TarFormat::new(compression))),
            Self::Zip => Box::new(ZipArchiver::new(ZipFormat)),
            Self::Directory => Box::new(DirectoryArchiver::new(DirectoryFormat)),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tar(TarCompression::None) => f.write_str("tar"),
            Self::Tar(TarCompression::Gzip) => f.write_str("tar.gz"),
            Self::Tar(TarCompression::Bzip2) => f.write_str("tar.bz2"),
            Self::Zip => f.write_str("zip"),
            Self::Directory => f.write_str("dir"),
        }
    }
}

/// Return a fresh writer for the format token.
///
/// # Errors
///
/// See [`ArchiveFormat::parse`].
pub fn select(format: &str) -> Result<Box<dyn Archiver>> {
    ArchiveFormat::parse(format).map(ArchiveFormat::archiver)
}
