//! Include/exclude selection of files within a directory tree.
//!
//! Patterns are Ant-style globs evaluated against `/`-separated paths
//! relative to the scanned directory: `*` stays within one path segment,
//! `**` spans any number of segments, and a trailing `/` is shorthand for
//! `/**`.

use crate::error::{AssemblyError, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Patterns excluded from every file set: editor backups, VCS metadata and
/// OS metadata files.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Miscellaneous typical temporary files
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // SCCS
    "**/SCCS",
    "**/SCCS/**",
    // Visual SourceSafe
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Git
    "**/.git",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitattributes",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    // Mac
    "**/.DS_Store",
];

/// The default excludes as owned strings.
#[must_use]
pub fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|p| (*p).to_owned()).collect()
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled pattern.
///
/// Patterns ending in `/**` are held as their stem and match any path at or
/// below a directory the stem matches, so `CVS/**` also covers `CVS`.
#[derive(Clone, Debug)]
enum Matcher {
    Everything,
    Exact(Pattern),
    Under(Pattern),
}

impl Matcher {
    fn compile(pattern: &str) -> Result<Self> {
        let mut normalised = pattern.trim().replace('\\', "/");
        if normalised.ends_with('/') {
            normalised.push_str("**");
        }
        if normalised == "**" {
            return Ok(Self::Everything);
        }
        let invalid = |e: glob::PatternError| AssemblyError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        };
        match normalised.strip_suffix("/**") {
            Some(stem) => Ok(Self::Under(Pattern::new(stem).map_err(invalid)?)),
            None => Ok(Self::Exact(Pattern::new(&normalised).map_err(invalid)?)),
        }
    }

    fn matches(&self, relative: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Exact(pattern) => pattern.matches_with(relative, MATCH_OPTIONS),
            Self::Under(stem) => {
                let mut prefix_end = relative.len();
                loop {
                    let prefix = relative.get(..prefix_end).unwrap_or_default();
                    if stem.matches_with(prefix, MATCH_OPTIONS) {
                        return true;
                    }
                    match prefix.rfind('/') {
                        Some(index) => prefix_end = index,
                        None => return false,
                    }
                }
            }
        }
    }
}

/// Compiled include and exclude patterns.
///
/// An empty include list selects everything.
#[derive(Clone, Debug)]
pub struct PatternSet {
    includes: Vec<Matcher>,
    excludes: Vec<Matcher>,
}

impl PatternSet {
    /// Compile the given include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidPattern`] for patterns `glob` rejects,
    /// such as an unclosed `[` class.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        Ok(Self {
            includes: includes
                .iter()
                .map(|p| Matcher::compile(p))
                .collect::<Result<_>>()?,
            excludes: excludes
                .iter()
                .map(|p| Matcher::compile(p))
                .collect::<Result<_>>()?,
        })
    }

    /// Whether a relative `/`-separated path is selected.
    #[must_use]
    pub fn is_selected(&self, relative: &str) -> bool {
        let included =
            self.includes.is_empty() || self.includes.iter().any(|m| m.matches(relative));
        included && !self.excludes.iter().any(|m| m.matches(relative))
    }
}

/// Files and directories selected from a tree, as paths relative to its
/// root, in sorted order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanResult {
    /// Selected directories, excluding the root itself.
    pub directories: Vec<PathBuf>,
    /// Selected regular files.
    pub files: Vec<PathBuf>,
}

/// Walk `base` and collect the entries selected by `patterns`.
///
/// Symbolic links are followed.
///
/// # Errors
///
/// Returns [`AssemblyError::SourceDirectoryMissing`] if `base` is not a
/// directory and [`AssemblyError::Io`] if the walk fails part-way.
pub fn scan_directory(base: &Path, patterns: &PatternSet) -> Result<ScanResult> {
    if !base.is_dir() {
        return Err(AssemblyError::SourceDirectoryMissing {
            path: base.to_path_buf(),
        });
    }

    let mut result = ScanResult::default();
    for entry in WalkDir::new(base).follow_links(true).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| AssemblyError::Io(e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if !patterns.is_selected(&slash_path(relative)) {
            continue;
        }
        if entry.file_type().is_dir() {
            result.directories.push(relative.to_path_buf());
        } else if entry.file_type().is_file() {
            result.files.push(relative.to_path_buf());
        }
    }
    Ok(result)
}

/// Render a relative path with `/` separators regardless of platform.
#[must_use]
pub fn slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    fn set(includes: &[&str], excludes: &[&str]) -> PatternSet {
        let owned = |v: &[&str]| v.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();
        PatternSet::new(&owned(includes), &owned(excludes)).expect("valid patterns")
    }

    fn with_defaults() -> PatternSet {
        PatternSet::new(&[], &default_excludes()).expect("valid defaults")
    }

    #[rstest]
    #[case("CVS")]
    #[case("src/CVS")]
    #[case("src/CVS/Entries")]
    #[case(".svn/entries")]
    #[case("notes.txt~")]
    #[case("docs/#draft#")]
    #[case("docs/.#lock")]
    #[case("a/b/.DS_Store")]
    #[case("._resource")]
    #[case(".git/HEAD")]
    fn default_excludes_reject_metadata(#[case] path: &str) {
        assert!(!with_defaults().is_selected(path), "{path} should be excluded");
    }

    #[rstest]
    #[case("README.txt")]
    #[case("src/main/App.java")]
    #[case("CVSROOT.txt")]
    fn default_excludes_keep_regular_files(#[case] path: &str) {
        assert!(with_defaults().is_selected(path), "{path} should be kept");
    }

    #[rstest]
    #[case(&["*.txt"], "a.txt", true)]
    #[case(&["*.txt"], "dir/a.txt", false)]
    #[case(&["**/*.txt"], "dir/a.txt", true)]
    #[case(&["**/*.txt"], "a.txt", true)]
    #[case(&["conf/"], "conf/app.properties", true)]
    #[case(&["README*", "LICENSE*"], "LICENSE.md", true)]
    fn includes_follow_ant_rules(#[case] includes: &[&str], #[case] path: &str, #[case] expected: bool) {
        assert_eq!(set(includes, &[]).is_selected(path), expected);
    }

    #[test]
    fn rejects_invalid_patterns() {
        let err = PatternSet::new(&["src/[abc".to_owned()], &[]).expect_err("invalid glob");
        assert!(matches!(err, AssemblyError::InvalidPattern { .. }));
    }

    #[test]
    fn scans_selected_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("conf/CVS")).expect("mkdir");
        fs::write(root.join("conf/app.properties"), "a=b\n").expect("write");
        fs::write(root.join("conf/CVS/Entries"), "x").expect("write");
        fs::write(root.join("notes.txt~"), "backup").expect("write");
        fs::write(root.join("README"), "readme").expect("write");

        let result = scan_directory(root, &with_defaults()).expect("scan");

        assert_eq!(result.directories, vec![PathBuf::from("conf")]);
        assert_eq!(
            result.files,
            vec![PathBuf::from("README"), PathBuf::from("conf/app.properties")]
        );
    }

    #[test]
    fn scanning_missing_directory_fails() {
        let err = scan_directory(Path::new("/nonexistent/source"), &with_defaults())
            .expect_err("missing directory");
        assert!(matches!(err, AssemblyError::SourceDirectoryMissing { .. }));
    }
}
