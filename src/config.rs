//! Packager configuration
//!
//! Every field has a default matching the UnrealLibretro plugin layout, so a
//! configuration file is optional. When present it is JSON and may set any
//! subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File picked up from the plugin directory when `--config` is not given
pub const DEFAULT_CONFIG_NAME: &str = "packager.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Product name; prefixes the package directory and the archive
    pub product: String,
    /// Platform passed to `-TargetPlatforms=`
    pub target_platform: String,
    /// Template used for engines on the old side of the version boundary
    pub legacy_template: String,
    /// Template used for every other engine
    pub current_template: String,
    /// Manifest filename the build tool is pointed at
    pub manifest_name: String,
    /// Extra flags appended to the `BuildPlugin` command line
    pub extra_build_args: Vec<String>,
    /// Archiver executable (invoked as `<archiver> -r -q <zip> <dir>`)
    pub archiver: String,
    /// Redistributable binaries that must exist before packaging, relative to
    /// the plugin directory. `{platform}` expands to the target platform.
    pub third_party_dir: String,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            product: "UnrealLibretro".to_string(),
            target_platform: "Win64".to_string(),
            legacy_template: "UnrealLibretro.uplugin.5.2".to_string(),
            current_template: "UnrealLibretro.uplugin.5.3".to_string(),
            manifest_name: "UnrealLibretro.uplugin".to_string(),
            extra_build_args: Vec::new(),
            archiver: "zip".to_string(),
            third_party_dir: "Binaries/{platform}/ThirdParty".to_string(),
        }
    }
}

impl PackagerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `packager.json` in the plugin
    /// directory is used if present, and defaults if not.
    pub fn discover(explicit: Option<&Path>, plugin_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let implicit = plugin_dir.join(DEFAULT_CONFIG_NAME);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "using plugin directory configuration");
            Self::load_from_file(implicit)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("product", &self.product),
            ("target_platform", &self.target_platform),
            ("archiver", &self.archiver),
            ("third_party_dir", &self.third_party_dir),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", name);
            }
        }

        for (name, value) in [
            ("product", &self.product),
            ("legacy_template", &self.legacy_template),
            ("current_template", &self.current_template),
            ("manifest_name", &self.manifest_name),
        ] {
            if !is_plain_file_name(value) {
                anyhow::bail!("{} must be a plain file name, got {:?}", name, value);
            }
        }

        if self.legacy_template == self.manifest_name || self.current_template == self.manifest_name
        {
            anyhow::bail!("manifest_name must differ from both template names");
        }

        Ok(())
    }

    /// Third-party directory for the configured platform, relative to the plugin
    pub fn third_party_path(&self) -> PathBuf {
        PathBuf::from(self.third_party_dir.replace("{platform}", &self.target_platform))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
}
