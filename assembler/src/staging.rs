//! Line-ending normalisation of file sets.
//!
//! A file set that asks for `dos` or `unix` line endings is first copied into
//! a scratch directory with every line terminator rewritten, and the archive
//! is then populated from that copy.

use crate::error::{AssemblyError, Result};
use crate::patterns::{PatternSet, scan_directory};
use log::debug;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Copies selected files while rewriting their line terminators.
#[derive(Clone, Copy, Debug)]
pub struct LineEndingStager {
    terminator: &'static str,
}

impl LineEndingStager {
    /// Create a stager writing `terminator` after every line.
    #[must_use]
    pub const fn new(terminator: &'static str) -> Self {
        Self { terminator }
    }

    /// The terminator written after each line.
    #[must_use]
    pub const fn terminator(&self) -> &'static str {
        self.terminator
    }

    /// Stage the files of `source` selected by `patterns` into `target`.
    ///
    /// Relative paths are preserved. Every selected directory is created
    /// before any file is copied; unselected entries are not copied.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::SourceDirectoryMissing`] if `source` is not a
    /// directory and [`AssemblyError::Staging`] if a file cannot be read or
    /// written.
    pub fn stage_tree(&self, source: &Path, target: &Path, patterns: &PatternSet) -> Result<()> {
        let selection = scan_directory(source, patterns)?;

        for directory in &selection.directories {
            let path = target.join(directory);
            fs::create_dir_all(&path).map_err(|e| AssemblyError::Staging {
                source_path: source.join(directory),
                target_path: path.clone(),
                source: e,
            })?;
        }

        for file in &selection.files {
            self.copy_file(&source.join(file), &target.join(file))?;
        }
        Ok(())
    }

    /// Copy one file, rewriting its line terminators.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Staging`] if either file cannot be accessed.
    pub fn copy_file(&self, source: &Path, target: &Path) -> Result<()> {
        debug!(
            "copying while replacing line endings: {} to {}",
            source.display(),
            target.display()
        );
        let staging_error = |e: std::io::Error| AssemblyError::Staging {
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
            source: e,
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(staging_error)?;
        }
        let input = File::open(source).map_err(staging_error)?;
        let output = File::create(target).map_err(staging_error)?;
        let mut writer = BufWriter::new(output);
        normalise_line_endings(BufReader::new(input), &mut writer, self.terminator)
            .map_err(staging_error)?;
        writer.flush().map_err(staging_error)
    }
}

/// Rewrite every line of `input` to end with `terminator`.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A final line without a
/// terminator gains one.
///
/// # Errors
///
/// Returns any I/O error from reading or writing.
pub fn normalise_line_endings<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    terminator: &str,
) -> std::io::Result<()> {
    let mut line = Vec::new();
    let mut pending_cr = false;

    loop {
        let buffer = input.fill_buf()?;
        if buffer.is_empty() {
            break;
        }
        let consumed = buffer.len();
        for &byte in buffer {
            if pending_cr {
                pending_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' | b'\r' => {
                    output.write_all(&line)?;
                    output.write_all(terminator.as_bytes())?;
                    line.clear();
                    pending_cr = byte == b'\r';
                }
                other => line.push(other),
            }
        }
        input.consume(consumed);
    }

    if !line.is_empty() {
        output.write_all(&line)?;
        output.write_all(terminator.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::default_excludes;
    use rstest::rstest;

    fn normalise(input: &[u8], terminator: &str) -> Vec<u8> {
        let mut output = Vec::new();
        normalise_line_endings(input, &mut output, terminator)
            .expect("in-memory normalisation");
        output
    }

    #[rstest]
    #[case(b"a\r\nb\r\n", "\n", b"a\nb\n")]
    #[case(b"a\nb\n", "\r\n", b"a\r\nb\r\n")]
    #[case(b"a\rb\r", "\n", b"a\nb\n")]
    #[case(b"a\r\n\r\nb", "\n", b"a\n\nb\n")]
    #[case(b"no newline", "\n", b"no newline\n")]
    #[case(b"", "\n", b"")]
    #[case(b"mixed\r\nline\nend\r", "\r\n", b"mixed\r\nline\r\nend\r\n")]
    fn rewrites_terminators(#[case] input: &[u8], #[case] terminator: &str, #[case] expected: &[u8]) {
        assert_eq!(normalise(input, terminator), expected);
    }

    #[rstest]
    #[case("\n")]
    #[case("\r\n")]
    fn normalisation_is_idempotent(#[case] terminator: &str) {
        let once = normalise(b"one\r\ntwo\rthree\nfour", terminator);
        assert_eq!(normalise(&once, terminator), once);
    }

    #[test]
    fn crlf_split_across_buffer_boundary() {
        let reader = BufReader::with_capacity(2, &b"a\r\nb"[..]);
        let mut output = Vec::new();
        normalise_line_endings(reader, &mut output, "\n").expect("normalise");
        assert_eq!(output, b"a\nb\n");
    }

    #[test]
    fn stages_selected_tree() {
        let source = tempfile::tempdir().expect("source dir");
        let target = tempfile::tempdir().expect("target dir");
        fs::create_dir_all(source.path().join("conf/empty")).expect("mkdir");
        fs::create_dir_all(source.path().join(".svn")).expect("mkdir");
        fs::write(source.path().join("conf/app.properties"), "a=1\r\nb=2").expect("write");
        fs::write(source.path().join(".svn/entries"), "x\r\n").expect("write");
        fs::write(source.path().join("notes.txt~"), "backup\r\n").expect("write");

        let patterns = PatternSet::new(&[], &default_excludes()).expect("patterns");
        LineEndingStager::new("\n")
            .stage_tree(source.path(), target.path(), &patterns)
            .expect("staging succeeds");

        let staged = fs::read(target.path().join("conf/app.properties")).expect("staged file");
        assert_eq!(staged, b"a=1\nb=2\n");
        assert!(target.path().join("conf/empty").is_dir());
        assert!(!target.path().join(".svn").exists());
        assert!(!target.path().join("notes.txt~").exists());
    }

    #[test]
    fn staging_missing_source_fails() {
        let target = tempfile::tempdir().expect("target dir");
        let patterns = PatternSet::new(&[], &[]).expect("patterns");
        let err = LineEndingStager::new("\n")
            .stage_tree(Path::new("/nonexistent/input"), target.path(), &patterns)
            .expect_err("missing source");
        assert!(matches!(err, AssemblyError::SourceDirectoryMissing { .. }));
    }
}
