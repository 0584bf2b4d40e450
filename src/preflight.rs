//! Pre-flight checks before any packaging work
//!
//! Verifies that everything the run depends on is present on disk:
//! - the engine installation and its automation tool script
//! - the plugin's third-party redistributable binaries
//!
//! Missing items are collected and reported together; the CLI then exits with
//! status 1 without touching the manifest or the output directory.

use crate::config::PackagerConfig;
use crate::engine::build_tool_path;
use crate::error::PackagerError;
use std::path::{Path, PathBuf};

/// One missing prerequisite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingItem {
    pub what: &'static str,
    pub path: PathBuf,
    pub hint: &'static str,
}

/// Result of environment verification
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub missing: Vec<MissingItem>,
}

impl PreflightReport {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    /// Multi-line diagnostic for stderr
    pub fn render(&self) -> String {
        let mut out = String::from("Pre-flight check failed:\n");
        for item in &self.missing {
            out.push_str(&format!(
                "  - {} not found: {}\n    {}\n",
                item.what,
                item.path.display(),
                item.hint
            ));
        }
        out
    }

    /// Convert into an error if anything is missing
    pub fn into_result(self) -> Result<(), PackagerError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(PackagerError::prerequisite(self.render()))
        }
    }
}

/// Check every prerequisite and collect what is missing
pub fn verify_environment(
    engine: &Path,
    plugin_dir: &Path,
    config: &PackagerConfig,
) -> PreflightReport {
    let mut report = PreflightReport::default();

    if !engine.is_dir() {
        report.missing.push(MissingItem {
            what: "Engine installation",
            path: engine.to_path_buf(),
            hint: "Pass the engine root, e.g. \"C:/Program Files/Epic Games/UE_5.1\"",
        });
    } else {
        let tool = build_tool_path(engine);
        if !tool.is_file() {
            report.missing.push(MissingItem {
                what: "Engine automation tool",
                path: tool,
                hint: "The engine install looks incomplete",
            });
        }
    }

    let third_party = plugin_dir.join(config.third_party_path());
    if !third_party.is_dir() {
        report.missing.push(MissingItem {
            what: "Third-party redistributables",
            path: third_party,
            hint: "Build or download the libretro third-party binaries before packaging",
        });
    }

    if report.is_ok() {
        tracing::info!("pre-flight checks passed");
    } else {
        tracing::debug!(missing = report.missing.len(), "pre-flight checks failed");
    }
    report
}
