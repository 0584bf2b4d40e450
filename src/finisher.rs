//! Post-build finishing: placeholder markers and the release archive

use crate::error::{PackagerError, Result};
use crate::layout::{MARKERS, PackageLayout};
use crate::runner::{OutputMode, ProcessRunner};
use crate::tool_args::ToolArgs;
use std::fs;
use std::path::PathBuf;

/// Create the empty marker files inside the package.
///
/// Parent directories are created as needed, but each marker directory itself
/// must not exist yet: a leftover `MyROMs`/`MyCores` from an earlier run is a
/// filesystem error and aborts the run.
pub fn place_markers(layout: &PackageLayout) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&layout.package_dir)?;

    let mut created = Vec::with_capacity(MARKERS.len());
    for (dir, file) in MARKERS {
        let marker_dir = layout.package_dir.join(dir);
        fs::create_dir(&marker_dir)?;
        let marker = marker_dir.join(file);
        fs::File::create(&marker)?;
        tracing::debug!(path = %marker.display(), "marker created");
        created.push(marker);
    }
    Ok(created)
}

/// `<archiver> -r -q <name>.zip <name>`, run from the output root so the
/// archive holds the versioned package directory at its top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArgs {
    pub archiver: String,
    pub output_root: PathBuf,
    pub versioned_name: String,
}

impl ArchiveArgs {
    pub fn new(archiver: impl Into<String>, layout: &PackageLayout) -> Self {
        Self {
            archiver: archiver.into(),
            output_root: layout.output_root.clone(),
            versioned_name: layout.versioned_name.clone(),
        }
    }
}

impl ToolArgs for ArchiveArgs {
    fn program(&self) -> String {
        self.archiver.clone()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-r".to_string(),
            "-q".to_string(),
            format!("{}.zip", self.versioned_name),
            self.versioned_name.clone(),
        ]
    }

    fn working_dir(&self) -> Option<PathBuf> {
        Some(self.output_root.clone())
    }
}

/// Delete an archive left behind by an earlier run. `zip` adds to an existing
/// archive, so files the new build no longer ships would otherwise survive.
///
/// Returns whether a file was removed.
pub fn remove_stale_archive(layout: &PackageLayout) -> Result<bool> {
    match fs::remove_file(&layout.archive) {
        Ok(()) => {
            tracing::info!(archive = %layout.archive.display(), "replacing existing archive");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Compress the package root into `layout.archive`.
pub fn archive_package(
    runner: &dyn ProcessRunner,
    archiver: &str,
    layout: &PackageLayout,
) -> Result<PathBuf> {
    let args = ArchiveArgs::new(archiver, layout);
    let output = runner.run(&args.invocation(), OutputMode::Capture)?;
    if !output.success() {
        tracing::error!(code = output.code(), stderr = %output.stderr.trim(), "archiver failed");
        return Err(PackagerError::ArchiveFailed {
            code: output.code(),
        });
    }
    tracing::info!(archive = %layout.archive.display(), "archive created");
    Ok(layout.archive.clone())
}
