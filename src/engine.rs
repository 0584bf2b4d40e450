//! Engine installation inspection
//!
//! An engine install is identified only by its root directory. The version
//! comes from `Engine/Build/Build.version`, a JSON descriptor the engine ships
//! with, and the automation tool lives under `Engine/Build/BatchFiles`.

use crate::error::{PackagerError, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path of the version descriptor relative to the install root
pub const BUILD_VERSION_RELATIVE: &str = "Engine/Build/Build.version";

const BATCH_FILES_RELATIVE: &str = "Engine/Build/BatchFiles";

/// Engine major/minor version pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Read `(major, minor)` from an engine installation.
///
/// Fails with [`PackagerError::MissingFile`] if the descriptor is absent and
/// with [`PackagerError::MissingVersionField`] if either field is absent,
/// null, or not a non-negative integer. No default version is ever assumed.
pub fn read_engine_version(install: &Path) -> Result<EngineVersion> {
    let path = install.join(BUILD_VERSION_RELATIVE);
    if !path.is_file() {
        return Err(PackagerError::MissingFile { path });
    }

    let content = std::fs::read_to_string(&path)?;
    let descriptor: Value = serde_json::from_str(&content)?;

    let field = |name: &'static str| -> Result<u32> {
        descriptor
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| PackagerError::MissingVersionField {
                field: name,
                path: path.clone(),
            })
    };

    let version = EngineVersion::new(field("MajorVersion")?, field("MinorVersion")?);
    tracing::debug!(%version, descriptor = %path.display(), "engine version detected");
    Ok(version)
}

/// Location of the engine's automation tool script for the host OS.
pub fn build_tool_path(install: &Path) -> PathBuf {
    let script = if cfg!(windows) { "RunUAT.bat" } else { "RunUAT.sh" };
    install.join(BATCH_FILES_RELATIVE).join(script)
}
