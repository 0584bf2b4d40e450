//! UnrealLibretro plugin packager
//!
//! Detects the engine version, stamps the plugin manifest with a git-derived
//! version label, runs the engine's `BuildPlugin` automation, and archives the
//! result. External tools are reached only through the [`runner::ProcessRunner`]
//! and [`label::VersionControl`] capabilities so the whole flow runs against
//! fakes in tests.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod finisher;
pub mod label;
pub mod layout;
pub mod manifest;
pub mod packager;
pub mod preflight;
pub mod process_guard;
pub mod runner;
pub mod tool_args;
pub mod uat;

// Re-export main types for convenience
pub use config::PackagerConfig;
pub use engine::{EngineVersion, read_engine_version};
pub use error::{PackagerError, Result};
pub use label::{GitCli, LabelStrategy, VersionControl, resolve_version_label};
pub use layout::PackageLayout;
pub use manifest::{ManifestTemplate, reconcile_manifest};
pub use packager::{Environment, PackageReport, PackageRequest, Packager};
pub use runner::{DryRunRunner, OutputMode, ProcessOutput, ProcessRunner, SystemRunner};
pub use tool_args::{Invocation, ToolArgs};
