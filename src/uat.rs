//! Engine automation tool (`RunUAT BuildPlugin`) invocation

use crate::engine::build_tool_path;
use crate::error::{PackagerError, Result};
use crate::runner::{OutputMode, ProcessRunner};
use crate::tool_args::ToolArgs;
use std::path::PathBuf;

/// Arguments for `RunUAT BuildPlugin`.
///
/// On unix the `.sh` wrapper is run through `bash`. On Windows the `.bat` is
/// spawned directly so std applies batch-file argument escaping; going
/// through `cmd /C` strips quotes from paths with spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPluginArgs {
    /// Engine installation root
    pub engine: PathBuf,
    /// Stamped `.uplugin` manifest
    pub manifest: PathBuf,
    /// Single target platform, e.g. `Win64`
    pub target_platform: String,
    /// Directory the packaged plugin is written to
    pub package_dir: PathBuf,
    /// Extra flags appended verbatim
    pub extra_args: Vec<String>,
}

impl BuildPluginArgs {
    fn tool_args(&self) -> Vec<String> {
        let mut args = vec![
            "BuildPlugin".to_string(),
            "-Rocket".to_string(),
            format!("-Plugin={}", self.manifest.display()),
            format!("-TargetPlatforms={}", self.target_platform),
            format!("-Package={}", self.package_dir.display()),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl ToolArgs for BuildPluginArgs {
    fn program(&self) -> String {
        if cfg!(windows) {
            build_tool_path(&self.engine).display().to_string()
        } else {
            "bash".to_string()
        }
    }

    fn to_cli_args(&self) -> Vec<String> {
        if cfg!(windows) {
            return self.tool_args();
        }
        let mut args = vec![build_tool_path(&self.engine).display().to_string()];
        args.extend(self.tool_args());
        args
    }
}

/// Run the build tool to completion. No timeout: engine builds are slow.
///
/// A non-zero status becomes [`PackagerError::BuildFailed`] carrying the same
/// code, which `main` hands straight back to the shell.
pub fn build_plugin(runner: &dyn ProcessRunner, args: &BuildPluginArgs) -> Result<()> {
    tracing::info!(
        platform = %args.target_platform,
        package = %args.package_dir.display(),
        "building plugin"
    );
    let output = runner.run(&args.invocation(), OutputMode::Inherit)?;
    if output.success() {
        tracing::info!("build tool finished");
        Ok(())
    } else {
        let code = output.code();
        tracing::error!(code, "build tool failed");
        Err(PackagerError::BuildFailed { code })
    }
}
