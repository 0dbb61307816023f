//! Assembly orchestration: one archive per requested format.
//!
//! The descriptor is read once and shared by every format. Formats are
//! built in order, each with its own archiver and planner, and the first
//! failure stops the run. Archives already written by earlier formats are
//! left in place.

use crate::artifact::ResolvedArtifact;
use crate::descriptor::Assembly;
use crate::descriptor::reader::DescriptorSource;
use crate::error::Result;
use crate::planner::{ArchivePlanner, PlanContext};
use crate::selector::select;
use crate::unpack::Unpacker;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Everything needed to produce the archives of one assembly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssemblyRequest {
    /// Where the descriptor comes from.
    pub source: DescriptorSource,
    /// Project base directory.
    pub base_dir: PathBuf,
    /// Prefix of every archive name and name of the in-archive base
    /// directory.
    pub final_name: String,
    /// Directory receiving the archives.
    pub output_dir: PathBuf,
    /// Scratch root for unpacking and staging.
    pub work_root: PathBuf,
    /// Resolved dependencies offered to dependency sets.
    pub artifacts: Vec<ResolvedArtifact>,
}

/// An archive produced for one format, as reported to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttachedArtifact {
    /// Location of the archive.
    pub path: PathBuf,
    /// The format token it was built for.
    pub format: String,
    /// Classifier, `<format>-assembly`.
    pub classifier: String,
}

impl AttachedArtifact {
    fn new(path: PathBuf, format: &str) -> Self {
        Self {
            path,
            format: format.to_owned(),
            classifier: classifier(format),
        }
    }
}

/// The classifier an archive of `format` is attached under.
#[must_use]
pub fn classifier(format: &str) -> String {
    format!("{format}-assembly")
}

/// Archive path `<output_dir>/<final_name>-<id>.<format>`.
#[must_use]
pub fn archive_path(output_dir: &Path, final_name: &str, assembly_id: &str, format: &str) -> PathBuf {
    output_dir.join(format!("{final_name}-{assembly_id}.{format}"))
}

/// Read the descriptor and build one archive per requested format.
///
/// # Errors
///
/// Returns the first error raised while reading the descriptor or building
/// any format; later formats are not attempted.
pub fn assemble(request: &AssemblyRequest, unpacker: &dyn Unpacker) -> Result<Vec<AttachedArtifact>> {
    let assembly = request.source.read()?;
    if assembly.formats.is_empty() {
        warn!("assembly '{}' requests no formats; nothing to build", assembly.id);
    }

    let mut attached = Vec::with_capacity(assembly.formats.len());
    for format in &assembly.formats {
        let artifact = build_format(request, &assembly, format, unpacker)?;
        info!("built {} ({})", artifact.path.display(), artifact.classifier);
        attached.push(artifact);
    }
    Ok(attached)
}

/// Build the archive for a single format.
///
/// # Errors
///
/// Returns selector, planner and archive-writer errors unchanged.
pub fn build_format(
    request: &AssemblyRequest,
    assembly: &Assembly,
    format: &str,
    unpacker: &dyn Unpacker,
) -> Result<AttachedArtifact> {
    debug!("building format {format} for assembly '{}'", assembly.id);
    let mut archiver = select(format)?;
    let mut planner = ArchivePlanner::new(PlanContext {
        base_dir: &request.base_dir,
        final_name: &request.final_name,
        work_root: &request.work_root,
        artifacts: &request.artifacts,
        unpacker,
    });
    planner.plan(assembly, archiver.as_mut())?;

    archiver.set_dest_file(archive_path(
        &request.output_dir,
        &request.final_name,
        &assembly.id,
        format,
    ));
    let path = archiver.create_archive()?;
    Ok(AttachedArtifact::new(path, format))
}
