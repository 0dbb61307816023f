//! Output directory computation for archive entries.

/// Compute the in-archive directory prefix for a dependency or file set.
///
/// The result always ends with a separator. With `include_base_directory`
/// it is nested under `final_name`; without it, one leading `/` is dropped so
/// entries stay relative.
///
/// ```
/// use assembler::paths::output_directory;
///
/// assert_eq!(output_directory(Some("lib"), "app-1.0", true), "app-1.0/lib/");
/// assert_eq!(output_directory(Some("/lib"), "app-1.0", false), "lib/");
/// assert_eq!(output_directory(None, "app-1.0", false), "");
/// ```
#[must_use]
pub fn output_directory(output: Option<&str>, final_name: &str, include_base_directory: bool) -> String {
    let mut output = output.unwrap_or_default().to_owned();
    if !output.ends_with('/') && !output.ends_with('\\') {
        output.push('/');
    }

    if include_base_directory {
        format!("{final_name}/{}", output.trim_start_matches('/'))
    } else if let Some(stripped) = output.strip_prefix('/') {
        stripped.to_owned()
    } else {
        output
    }
}

/// Join an output directory prefix and a relative entry name with `/`.
#[must_use]
pub fn join_entry(prefix: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        return name.to_owned();
    }
    if prefix.ends_with('/') || prefix.ends_with('\\') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}
