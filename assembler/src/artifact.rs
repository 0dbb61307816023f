//! Resolved dependency artifacts.
//!
//! Artifacts arrive already resolved; the assembler only reads their
//! coordinates and file location.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Dependency scope, ordered from narrowest visibility to widest.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to compile and run.
    Compile,
    /// Supplied by the runtime environment.
    Provided,
    /// Needed only at run time.
    Runtime,
    /// Needed only by tests.
    Test,
    /// Supplied from an explicit system path.
    System,
}

impl Scope {
    /// Whether a dependency set selecting `self` admits an artifact in
    /// `scope`.
    ///
    /// `test` admits everything, `runtime` admits compile and runtime, and
    /// `compile` admits compile, provided and system.
    #[must_use]
    pub const fn admits(self, scope: Self) -> bool {
        match self {
            Self::Test => true,
            Self::Runtime => matches!(scope, Self::Compile | Self::Runtime),
            Self::Compile => matches!(scope, Self::Compile | Self::Provided | Self::System),
            Self::Provided => matches!(scope, Self::Provided),
            Self::System => matches!(scope, Self::System),
        }
    }

    /// The lowercase scope name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a scope name is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown scope '{0}'")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            other => Err(UnknownScope(other.to_owned())),
        }
    }
}

/// Coordinates identifying an artifact.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Coordinate {
    /// Group, e.g. `org.apache.commons`.
    pub group_id: String,
    /// Artifact name, e.g. `commons-io`.
    pub artifact_id: String,
    /// Version string.
    pub version: String,
    /// Optional classifier, e.g. `sources`.
    #[serde(default)]
    pub classifier: Option<String>,
    /// Packaging type, e.g. `jar`.
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    /// Scope the artifact was resolved in.
    #[serde(default)]
    pub scope: Option<Scope>,
}

fn default_type() -> String {
    "jar".to_owned()
}

impl Coordinate {
    /// Version with a `-<timestamp>-<build>` snapshot suffix folded back into
    /// `-SNAPSHOT`.
    #[must_use]
    pub fn base_version(&self) -> String {
        let parts: Vec<&str> = self.version.rsplitn(3, '-').collect();
        if let [build, timestamp, base] = parts.as_slice() {
            let is_timestamp = timestamp.len() == 15
                && timestamp.as_bytes().get(8) == Some(&b'.')
                && timestamp.chars().filter(char::is_ascii_digit).count() == 14;
            if is_timestamp && build.chars().all(|c| c.is_ascii_digit()) && !build.is_empty() {
                return format!("{base}-SNAPSHOT");
            }
        }
        self.version.clone()
    }

    /// Conflict id `group:artifact:type[:classifier]`.
    #[must_use]
    pub fn dependency_conflict_id(&self) -> String {
        let mut id = format!("{}:{}:{}", self.group_id, self.artifact_id, self.kind);
        if let Some(classifier) = &self.classifier {
            id.push(':');
            id.push_str(classifier);
        }
        id
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.kind)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

/// A dependency artifact resolved by the build, ready to be assembled.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ResolvedArtifact {
    /// Location of the artifact file.
    pub file: PathBuf,
    /// Artifact coordinates.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Explicit file extension, overriding the one implied by the type.
    #[serde(default)]
    pub extension: Option<String>,
}

impl ResolvedArtifact {
    /// Create an artifact from its file and coordinates.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, coordinate: Coordinate) -> Self {
        Self {
            file: file.into(),
            coordinate,
            extension: None,
        }
    }

    /// File extension for this artifact's type.
    ///
    /// An explicit extension wins; otherwise known packaging types map to
    /// their archive extension and unknown types are used as-is.
    #[must_use]
    pub fn extension(&self) -> &str {
        if let Some(extension) = &self.extension {
            return extension;
        }
        match self.coordinate.kind.as_str() {
            "test-jar" | "ejb" | "ejb-client" | "maven-plugin" | "java-source" | "javadoc" => "jar",
            other => other,
        }
    }

    /// File name of the artifact on disk.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file.file_name().and_then(|name| name.to_str())
    }

    /// Path to the artifact file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file
    }
}
