//! Tests for assembler CLI parsing and overrides.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["assembler"]);
    assert!(cli.config.is_none());
    assert!(cli.descriptor.is_none());
    assert!(cli.descriptor_id.is_none());
    assert!(cli.base_dir.is_none());
    assert!(cli.artifacts.is_none());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_descriptor_and_paths() {
    let cli = Cli::parse_from([
        "assembler",
        "--descriptor",
        "src/assembly/dist.toml",
        "--base-dir",
        "/work/app",
        "--final-name",
        "app-1.0",
        "-o",
        "/tmp/out",
    ]);
    assert_eq!(
        cli.descriptor,
        Some(Utf8PathBuf::from("src/assembly/dist.toml"))
    );
    assert_eq!(cli.base_dir, Some(Utf8PathBuf::from("/work/app")));
    assert_eq!(cli.final_name.as_deref(), Some("app-1.0"));
    assert_eq!(cli.output_dir, Some(Utf8PathBuf::from("/tmp/out")));
}

#[test]
fn descriptor_sources_conflict() {
    let result = Cli::try_parse_from([
        "assembler",
        "--descriptor",
        "dist.toml",
        "--descriptor-id",
        "bin",
    ]);
    assert!(result.is_err());
}

#[test]
fn quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["assembler", "-q", "-v"]).is_err());
}

#[rstest]
#[case::default(&["assembler"], LevelFilter::Info)]
#[case::verbose(&["assembler", "-v"], LevelFilter::Debug)]
#[case::very_verbose(&["assembler", "-vv"], LevelFilter::Trace)]
#[case::quiet(&["assembler", "--quiet"], LevelFilter::Error)]
fn log_level_follows_flags(#[case] args: &[&str], #[case] expected: LevelFilter) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.log_level(), expected);
}

#[test]
fn overrides_carry_command_line_fields() {
    let cli = Cli {
        descriptor_id: Some("src".to_owned()),
        work_root: Some(Utf8PathBuf::from("/tmp/work")),
        ..Cli::default()
    };
    let overrides = cli.overrides();
    assert_eq!(overrides.descriptor_id.as_deref(), Some("src"));
    assert_eq!(overrides.work_root, Some(Utf8PathBuf::from("/tmp/work")));
    assert!(overrides.descriptor.is_none());
    assert!(overrides.artifacts.is_empty());
}

#[test]
fn overrides_leave_the_artifact_file_unread() {
    let cli = Cli {
        descriptor_id: Some("bin".to_owned()),
        artifacts: Some(Utf8PathBuf::from("/nonexistent/artifacts.toml")),
        ..Cli::default()
    };
    assert!(cli.overrides().artifacts.is_empty());
}
