//! The packaging pipeline
//!
//! ```text
//! preflight → engine version → version label → manifest
//!           → BuildPlugin → markers → archive
//! ```
//!
//! Every step is a hard precondition for the next. The first failure ends the
//! run; nothing is retried and partial output is left as-is.

use crate::config::PackagerConfig;
use crate::engine::{EngineVersion, read_engine_version};
use crate::error::Result;
use crate::finisher::{archive_package, place_markers, remove_stale_archive};
use crate::label::{GitCli, LabelStrategy, VersionControl, resolve_version_label};
use crate::layout::PackageLayout;
use crate::manifest::{ManifestTemplate, reconcile_manifest};
use crate::preflight::verify_environment;
use crate::runner::{DryRunRunner, ProcessRunner, SystemRunner};
use crate::uat::{BuildPluginArgs, build_plugin};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// External capabilities the pipeline needs.
///
/// Production wiring comes from [`Environment::system`]; tests build one from
/// fakes so no engine, git history, or archiver is required.
pub struct Environment {
    pub runner: Arc<dyn ProcessRunner>,
    pub vcs: Box<dyn VersionControl>,
}

impl Environment {
    /// Real subprocesses and `git` in `repo`. In a dry run, mutating commands
    /// are logged and skipped.
    pub fn system(repo: &Path, dry_run: bool) -> Self {
        let runner: Arc<dyn ProcessRunner> = if dry_run {
            Arc::new(DryRunRunner::new(SystemRunner))
        } else {
            Arc::new(SystemRunner)
        };
        let vcs = Box::new(GitCli::new(repo, runner.clone()));
        Self { runner, vcs }
    }
}

/// Inputs of a single run
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Engine installation root
    pub engine: PathBuf,
    /// Plugin source directory holding the templates
    pub plugin_dir: PathBuf,
    /// Where the package tree and archive go
    pub output_root: PathBuf,
    /// Revision to label
    pub revision: String,
    pub dry_run: bool,
}

impl PackageRequest {
    /// The same request with every path made absolute against the current
    /// directory. The build tool changes into the engine tree before it reads
    /// `-Plugin=` and `-Package=`.
    pub fn absolute(&self) -> Result<Self> {
        Ok(Self {
            engine: std::path::absolute(&self.engine)?,
            plugin_dir: std::path::absolute(&self.plugin_dir)?,
            output_root: std::path::absolute(&self.output_root)?,
            ..self.clone()
        })
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PackageReport {
    pub version: EngineVersion,
    pub label: String,
    pub template: ManifestTemplate,
    pub manifest: PathBuf,
    pub layout: PackageLayout,
    pub markers: Vec<PathBuf>,
    pub archive: PathBuf,
}

pub struct Packager {
    config: PackagerConfig,
    env: Environment,
}

impl Packager {
    pub fn new(config: PackagerConfig, env: Environment) -> Self {
        Self { config, env }
    }

    /// Run the whole pipeline.
    pub fn run(&self, request: &PackageRequest) -> Result<PackageReport> {
        let request = &request.absolute()?;
        verify_environment(&request.engine, &request.plugin_dir, &self.config).into_result()?;

        let version = read_engine_version(&request.engine)?;
        tracing::info!(%version, engine = %request.engine.display(), "engine detected");

        let label = resolve_version_label(
            self.env.vcs.as_ref(),
            &request.revision,
            &LabelStrategy::fallback_chain(),
        )?;

        let manifest = reconcile_manifest(
            &request.plugin_dir,
            &self.config,
            version,
            &label,
            request.dry_run,
        )?;

        let layout = PackageLayout::new(&request.output_root, &self.config.product, version);

        build_plugin(
            self.env.runner.as_ref(),
            &BuildPluginArgs {
                engine: request.engine.clone(),
                manifest: manifest.output_path.clone(),
                target_platform: self.config.target_platform.clone(),
                package_dir: layout.package_dir.clone(),
                extra_args: self.config.extra_build_args.clone(),
            },
        )?;

        let markers = if request.dry_run {
            tracing::info!("[dry run] markers not created");
            layout.marker_paths()
        } else {
            place_markers(&layout)?
        };

        if !request.dry_run {
            remove_stale_archive(&layout)?;
        }
        let archive = archive_package(self.env.runner.as_ref(), &self.config.archiver, &layout)?;

        Ok(PackageReport {
            version,
            label,
            template: manifest.template,
            manifest: manifest.output_path,
            layout,
            markers,
            archive,
        })
    }
}
