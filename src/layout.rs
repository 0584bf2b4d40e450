//! Output paths for one packaging run

use crate::engine::EngineVersion;
use std::path::{Path, PathBuf};

/// Placeholder files created inside the packaged plugin. The file names are
/// instructions for whoever unpacks the archive.
pub const MARKERS: [(&str, &str); 2] = [
    ("MyROMs", "Place Your ROMs in this Directory"),
    ("MyCores", "Place Your Libretro Cores in this Directory"),
];

/// Every path a run writes to, computed up front.
///
/// ```text
/// <output_root>/
/// ├── <product>-<major>.<minor>.zip        archive
/// └── <product>-<major>.<minor>/           package root (archived)
///     └── <product>/                       package dir (build tool output)
///         ├── MyROMs/Place Your ROMs in this Directory
///         └── MyCores/Place Your Libretro Cores in this Directory
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub output_root: PathBuf,
    /// `<product>-<major>.<minor>`
    pub versioned_name: String,
    pub package_root: PathBuf,
    pub package_dir: PathBuf,
    pub archive: PathBuf,
}

impl PackageLayout {
    pub fn new(output_root: &Path, product: &str, version: EngineVersion) -> Self {
        let versioned_name = format!("{}-{}", product, version);
        let package_root = output_root.join(&versioned_name);
        let package_dir = package_root.join(product);
        let archive = output_root.join(format!("{}.zip", versioned_name));
        Self {
            output_root: output_root.to_path_buf(),
            versioned_name,
            package_root,
            package_dir,
            archive,
        }
    }

    /// Absolute marker file paths
    pub fn marker_paths(&self) -> Vec<PathBuf> {
        MARKERS
            .iter()
            .map(|(dir, file)| self.package_dir.join(dir).join(file))
            .collect()
    }
}
