//! Dependency artifact selection.
//!
//! A dependency set admits an artifact when its scope fits the set's scope
//! selector, it matches at least one include pattern (if any are given), and
//! it matches no exclude pattern. An artifact that fails any check is simply
//! left out of the archive.

use crate::artifact::{ResolvedArtifact, Scope};
use crate::descriptor::DependencySet;
use log::trace;

/// A `group:artifact[:type[:version[:classifier]]]` pattern.
///
/// `*` matches any single segment, and a pattern with fewer segments than the
/// coordinate matches on the leading segments only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoordinatePattern {
    segments: Vec<String>,
}

impl CoordinatePattern {
    /// Parse a pattern string.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: pattern.trim().split(':').map(str::to_owned).collect(),
        }
    }

    /// Whether the artifact's coordinates match this pattern.
    #[must_use]
    pub fn matches(&self, artifact: &ResolvedArtifact) -> bool {
        let coordinate = &artifact.coordinate;
        let fields = [
            coordinate.group_id.as_str(),
            coordinate.artifact_id.as_str(),
            coordinate.kind.as_str(),
            coordinate.version.as_str(),
            coordinate.classifier.as_deref().unwrap_or(""),
        ];
        if self.segments.len() > fields.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(fields)
            .all(|(segment, field)| segment == "*" || segment == field)
    }
}

/// Conjunction of scope, include and exclude checks for one dependency set.
#[derive(Clone, Debug)]
pub struct ArtifactFilter {
    scope: Option<Scope>,
    includes: Vec<CoordinatePattern>,
    excludes: Vec<CoordinatePattern>,
}

impl ArtifactFilter {
    /// Build a filter from raw selector parts.
    ///
    /// An unrecognised scope selector admits only artifacts without a scope.
    #[must_use]
    pub fn new(scope: &str, includes: &[String], excludes: &[String]) -> Self {
        Self {
            scope: scope.parse().ok(),
            includes: includes.iter().map(|p| CoordinatePattern::new(p)).collect(),
            excludes: excludes.iter().map(|p| CoordinatePattern::new(p)).collect(),
        }
    }

    /// Build the filter for a dependency set.
    #[must_use]
    pub fn for_dependency_set(set: &DependencySet) -> Self {
        Self::new(&set.scope, &set.includes, &set.excludes)
    }

    /// Whether the artifact participates in the dependency set.
    #[must_use]
    pub fn include(&self, artifact: &ResolvedArtifact) -> bool {
        let included = self.scope_admits(artifact)
            && (self.includes.is_empty() || self.includes.iter().any(|p| p.matches(artifact)))
            && !self.excludes.iter().any(|p| p.matches(artifact));
        if !included {
            trace!("skipping {}", artifact.coordinate);
        }
        included
    }

    fn scope_admits(&self, artifact: &ResolvedArtifact) -> bool {
        match (self.scope, artifact.coordinate.scope) {
            (_, None) => true,
            (Some(selector), Some(scope)) => selector.admits(scope),
            (None, Some(_)) => false,
        }
    }
}
