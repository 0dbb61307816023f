//! Filename mapping for dependency entries.
//!
//! A mapping such as `${artifactId}-${version}.${extension}` is resolved
//! against an artifact's coordinates. The rightmost `${...}` placeholder is
//! split off first and everything to its left is resolved recursively, so a
//! substituted value is never re-scanned for placeholders. Placeholders with
//! no value are left in the output verbatim.

use crate::artifact::ResolvedArtifact;
use crate::error::{AssemblyError, Result};

/// The keyword resolved to the artifact's type-specific extension when the
/// coordinate lookup yields nothing.
const EXTENSION_KEYWORD: &str = "extension";

/// A template split around its rightmost placeholder.
#[derive(Debug, Eq, PartialEq)]
struct Split<'a> {
    left: &'a str,
    token: &'a str,
    right: &'a str,
}

/// Locate the rightmost `${token}` with a non-empty token.
fn split_last_placeholder(expression: &str) -> Option<Split<'_>> {
    let mut search_end = expression.len();
    while let Some(start) = expression.get(..search_end)?.rfind("${") {
        let token_start = start + 2;
        if let Some(rest) = expression.get(token_start..) {
            if let Some(len) = rest.find('}') {
                if len > 0 {
                    let close = token_start + len;
                    return Some(Split {
                        left: expression.get(..start)?,
                        token: expression.get(token_start..close)?,
                        right: expression.get(close + 1..)?,
                    });
                }
            }
        }
        search_end = start;
    }
    None
}

/// Evaluate a filename mapping for an artifact.
///
/// # Errors
///
/// Returns [`AssemblyError::TemplateEvaluation`] if a placeholder names a
/// malformed field path (for example `a..b`). Unknown but well-formed
/// fields are not an error.
///
/// ```
/// use assembler::artifact::{Coordinate, ResolvedArtifact};
/// use assembler::mapping::evaluate_file_name_mapping;
///
/// let artifact = ResolvedArtifact::new(
///     "repo/foo-1.0.jar",
///     Coordinate {
///         group_id: "org.example".to_owned(),
///         artifact_id: "foo".to_owned(),
///         version: "1.0".to_owned(),
///         classifier: None,
///         kind: "jar".to_owned(),
///         scope: None,
///     },
/// );
/// let name = evaluate_file_name_mapping("${artifactId}-${unknownToken}.${extension}", &artifact)
///     .unwrap();
/// assert_eq!(name, "foo-${unknownToken}.jar");
/// ```
pub fn evaluate_file_name_mapping(expression: &str, artifact: &ResolvedArtifact) -> Result<String> {
    let Some(split) = split_last_placeholder(expression) else {
        return Ok(expression.to_owned());
    };

    let left = evaluate_file_name_mapping(split.left, artifact)?;
    let middle = match lookup_field(split.token, artifact)? {
        Some(value) => value,
        None if split.token.trim() == EXTENSION_KEYWORD => artifact.extension().to_owned(),
        None => format!("${{{}}}", split.token),
    };

    Ok(format!("{left}{middle}{}", split.right))
}

/// Resolve a dotted field path against the artifact.
///
/// Returns `Ok(None)` for fields the artifact does not carry.
fn lookup_field(path: &str, artifact: &ResolvedArtifact) -> Result<Option<String>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(AssemblyError::TemplateEvaluation {
            expression: format!("${{{path}}}"),
            reason: "empty segment in field path".to_owned(),
        });
    }

    let coordinate = &artifact.coordinate;
    let value = match segments.as_slice() {
        ["groupId"] => Some(coordinate.group_id.clone()),
        ["artifactId"] => Some(coordinate.artifact_id.clone()),
        ["version"] => Some(coordinate.version.clone()),
        ["baseVersion"] => Some(coordinate.base_version()),
        ["classifier"] => coordinate.classifier.clone(),
        ["type"] => Some(coordinate.kind.clone()),
        ["scope"] => coordinate.scope.map(|scope| scope.as_str().to_owned()),
        ["id"] => Some(coordinate.to_string()),
        ["dependencyConflictId"] => Some(coordinate.dependency_conflict_id()),
        ["file", "name"] => artifact.file_name().map(str::to_owned),
        ["artifactHandler", "extension"] => Some(artifact.extension().to_owned()),
        _ => None,
    };
    Ok(value)
}
