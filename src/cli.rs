use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::label::DEFAULT_REVISION;

/// Package the UnrealLibretro plugin for distribution
#[derive(Parser, Debug)]
#[command(name = "plugin-packager")]
#[command(about = "Builds the plugin with the engine's automation tool and zips the result")]
#[command(version)]
pub struct Cli {
    /// Engine installation root (the directory containing `Engine/`)
    pub engine_path: PathBuf,

    /// Directory for the package tree and archive (default: the plugin directory)
    pub output_root: Option<PathBuf>,

    /// Plugin source directory holding the manifest templates
    #[arg(long, default_value = ".")]
    pub plugin_dir: PathBuf,

    /// Configuration file (default: <plugin-dir>/packager.json if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Revision whose name is stamped into the manifest
    #[arg(long, default_value = DEFAULT_REVISION)]
    pub revision: String,

    /// Override the configured target platform
    #[arg(long)]
    pub target_platform: Option<String>,

    /// Dry-run mode: resolve versions and log commands without writing anything.
    ///
    /// Git queries still run so the reported label is real.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Output root, falling back to the plugin directory
    pub fn resolved_output_root(&self) -> PathBuf {
        self.output_root
            .clone()
            .unwrap_or_else(|| self.plugin_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_engine_path_only() {
        let cli = Cli::try_parse_from(["plugin-packager", "/opt/UE_5.1"]).unwrap();
        assert_eq!(cli.engine_path, PathBuf::from("/opt/UE_5.1"));
        assert_eq!(cli.output_root, None);
        assert_eq!(cli.resolved_output_root(), PathBuf::from("."));
        assert_eq!(cli.revision, "HEAD");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_output_root_and_flags() {
        let cli = Cli::try_parse_from([
            "plugin-packager",
            "/opt/UE_4.27",
            "/tmp/out",
            "--plugin-dir",
            "/src/UnrealLibretro",
            "--revision",
            "v1.2.3",
            "--target-platform",
            "Linux",
            "--dry-run",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.resolved_output_root(), PathBuf::from("/tmp/out"));
        assert_eq!(cli.plugin_dir, PathBuf::from("/src/UnrealLibretro"));
        assert_eq!(cli.revision, "v1.2.3");
        assert_eq!(cli.target_platform.as_deref(), Some("Linux"));
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_engine_path_required() {
        assert!(Cli::try_parse_from(["plugin-packager"]).is_err());
    }
}
