//! Behaviour-driven tests for building assemblies.
//!
//! These scenarios cover line-ending normalisation, dependency renaming,
//! format selection failures and descriptor source validation.

use assembler::artifact::{Coordinate, ResolvedArtifact, Scope};
use assembler::config::AssemblyConfig;
use assembler::descriptor::reader::DescriptorSource;
use assembler::driver::{AssemblyRequest, AttachedArtifact, assemble};
use assembler::error::AssemblyError;
use assembler::unpack::ArchiveUnpacker;
use camino::Utf8PathBuf;
use flate2::read::GzDecoder;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Assembly world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AssemblyWorld {
    // Keep temp_dir alive for the lifetime of the test.
    temp_dir: RefCell<Option<TempDir>>,
    artifacts: RefCell<Vec<ResolvedArtifact>>,
    request: RefCell<Option<AssemblyRequest>>,
    result: RefCell<Option<Result<Vec<AttachedArtifact>, AssemblyError>>>,
    config: RefCell<Option<AssemblyConfig>>,
    resolution: RefCell<Option<Result<AssemblyRequest, AssemblyError>>>,
}

impl AssemblyWorld {
    fn base_dir(&self) -> PathBuf {
        self.temp_dir
            .borrow_mut()
            .get_or_insert_with(|| TempDir::new().expect("failed to create temp dir"))
            .path()
            .join("project")
    }

    fn write(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.base_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent");
        }
        fs::write(&path, content).expect("failed to write file");
        path
    }

    fn use_descriptor(&self, descriptor: &str) {
        let base_dir = self.base_dir();
        let descriptor_path = self.write("assembly.toml", descriptor.as_bytes());
        self.request.replace(Some(AssemblyRequest {
            source: DescriptorSource::File(descriptor_path),
            output_dir: base_dir.join("target"),
            work_root: base_dir.join("target/archive-tmp"),
            base_dir,
            final_name: "app-1.0".to_owned(),
            artifacts: self.artifacts.borrow().clone(),
        }));
    }

    fn attached(&self) -> Vec<AttachedArtifact> {
        let result = self.result.borrow();
        match result.as_ref().expect("assembly not built") {
            Ok(attached) => attached.clone(),
            Err(err) => panic!("assembly failed: {err}"),
        }
    }
}

#[fixture]
fn world() -> AssemblyWorld {
    AssemblyWorld::default()
}

#[given("a project with resources using dos line endings")]
fn given_dos_resources(world: &AssemblyWorld) {
    world.write("src/main/resources/app.properties", b"name=app\r\nmode=prod\r\n");
    world.write("src/main/resources/nested/log.xml", b"<log>\r\n</log>");
    world.write("src/main/resources/.svn/entries", b"svn\r\n");
}

#[given("a descriptor packing the resources as tar.gz with unix line endings")]
fn given_unix_descriptor(world: &AssemblyWorld) {
    world.use_descriptor(
        r#"
id = "resources"
formats = ["tar.gz"]
include_base_directory = false

[[file_sets]]
directory = "src/main/resources"
line_ending = "unix"
"#,
    );
}

#[given("a project depending on commons-io at runtime")]
fn given_commons_io(world: &AssemblyWorld) {
    let jar = world.write("repo/commons-io-2.4.jar", b"jar bytes");
    world.artifacts.borrow_mut().push(ResolvedArtifact::new(
        jar,
        Coordinate {
            group_id: "commons-io".to_owned(),
            artifact_id: "commons-io".to_owned(),
            version: "2.4".to_owned(),
            classifier: None,
            kind: "jar".to_owned(),
            scope: Some(Scope::Runtime),
        },
    ));
}

#[given("a descriptor mapping dependencies to artifact id and extension")]
fn given_mapping_descriptor(world: &AssemblyWorld) {
    world.use_descriptor(
        r#"
id = "deps"
formats = ["zip"]
include_base_directory = false

[[dependency_sets]]
output_directory = "lib"
scope = "runtime"
output_file_name_mapping = "${artifactId}.${extension}"
"#,
    );
}

#[given("a descriptor requesting the tar.xyz format")]
fn given_unknown_compression(world: &AssemblyWorld) {
    world.use_descriptor(
        r#"
id = "broken"
formats = ["tar.xyz"]
"#,
    );
}

#[given("a configuration without a descriptor source")]
fn given_no_descriptor_source(world: &AssemblyWorld) {
    let base_dir = world.base_dir();
    world.config.replace(Some(AssemblyConfig {
        base_dir: Some(Utf8PathBuf::try_from(base_dir).expect("temp dir path not UTF-8")),
        final_name: Some("app-1.0".to_owned()),
        ..AssemblyConfig::default()
    }));
}

#[when("the assembly is built")]
fn when_assembly_built(world: &AssemblyWorld) {
    let request = world.request.borrow();
    let request = request.as_ref().expect("request not set");
    let result = assemble(request, &ArchiveUnpacker);
    world.result.replace(Some(result));
}

#[when("the configuration is resolved")]
fn when_configuration_resolved(world: &AssemblyWorld) {
    let config = world.config.borrow_mut().take().expect("config not set");
    world.resolution.replace(Some(config.resolve()));
}

#[then("the tar.gz archive holds the resources with unix line endings")]
fn then_tar_gz_has_unix_endings(world: &AssemblyWorld) {
    let attached = world.attached();
    let [artifact] = attached.as_slice() else {
        panic!("expected one archive, got {attached:?}");
    };
    assert_eq!(artifact.classifier, "tar.gz-assembly");
    assert!(artifact.path.ends_with("app-1.0-resources.tar.gz"));

    let file = File::open(&artifact.path).expect("failed to open archive");
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut files = Vec::new();
    for entry in archive.entries().expect("failed to read entries") {
        let mut entry = entry.expect("failed to read entry");
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .expect("entry path")
            .to_string_lossy()
            .into_owned();
        let mut contents = String::new();
        entry
            .read_to_string(&mut contents)
            .expect("failed to read entry");
        files.push((path, contents));
    }

    assert_eq!(
        files,
        vec![
            (
                "src/main/resources/app.properties".to_owned(),
                "name=app\nmode=prod\n".to_owned()
            ),
            (
                "src/main/resources/nested/log.xml".to_owned(),
                "<log>\n</log>\n".to_owned()
            ),
        ]
    );
}

#[then("the zip archive holds lib/commons-io.jar")]
fn then_zip_has_renamed_dependency(world: &AssemblyWorld) {
    let attached = world.attached();
    let [artifact] = attached.as_slice() else {
        panic!("expected one archive, got {attached:?}");
    };
    let file = File::open(&artifact.path).expect("failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("failed to read zip");
    let mut entry = archive
        .by_name("lib/commons-io.jar")
        .expect("renamed dependency missing");
    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .expect("failed to read entry");
    assert_eq!(contents, "jar bytes");
}

#[then("the assembly fails naming the xyz compression")]
fn then_unknown_compression(world: &AssemblyWorld) {
    let result = world.result.borrow();
    let result = result.as_ref().expect("assembly not built");
    assert!(
        matches!(result, Err(AssemblyError::UnknownCompression { suffix }) if suffix == "xyz"),
        "expected UnknownCompression error, got {:?}",
        result.as_ref().map(Vec::len)
    );
}

#[then("resolution fails with a usage error")]
fn then_usage_error(world: &AssemblyWorld) {
    let resolution = world.resolution.borrow();
    let resolution = resolution.as_ref().expect("configuration not resolved");
    match resolution {
        Err(err) => {
            assert!(matches!(err, AssemblyError::MissingDescriptorSource));
            assert!(err.is_usage_error());
        }
        Ok(request) => panic!("expected a usage error, got {request:?}"),
    }
}

#[then("no output directory is created")]
fn then_no_output_directory(world: &AssemblyWorld) {
    assert!(!world.base_dir().join("target").exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/assembly.feature", index = 0)]
fn scenario_unix_line_endings_in_tar_gz(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/assembly.feature", index = 1)]
fn scenario_dependency_file_name_mapping(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/assembly.feature", index = 2)]
fn scenario_unknown_tar_compression(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/assembly.feature", index = 3)]
fn scenario_descriptor_source_required(world: AssemblyWorld) {
    let _ = world;
}
