//! Plugin manifest reconciliation
//!
//! Two manifest templates ship next to the plugin, one per side of an engine
//! version boundary. The chosen template gets its `VersionName` replaced by the
//! version label and is written out under the fixed name the build tool reads.

use crate::config::PackagerConfig;
use crate::engine::EngineVersion;
use crate::error::{PackagerError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use strum::Display;

/// Manifest field overwritten with the version label
pub const VERSION_NAME_KEY: &str = "VersionName";

/// Which of the two shipped templates applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ManifestTemplate {
    Legacy,
    Current,
}

impl ManifestTemplate {
    /// Select the template for an engine version.
    ///
    /// `Legacy` iff `major == 4 || minor <= 2`. Major and minor are tested
    /// independently, so e.g. 6.1 also selects `Legacy`.
    pub fn for_engine(version: EngineVersion) -> Self {
        if version.major == 4 || version.minor <= 2 {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    /// Template filename from configuration
    pub fn file_name(self, config: &PackagerConfig) -> &str {
        match self {
            Self::Legacy => &config.legacy_template,
            Self::Current => &config.current_template,
        }
    }
}

/// Render a manifest document the way the engine writes `.uplugin` files:
/// tab indentation, keys in document order, trailing newline.
pub fn render_manifest(document: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Load `template`, stamp `label` into it, and return the resulting document.
pub fn stamp_template(template: &Path, label: &str) -> Result<Value> {
    if !template.is_file() {
        return Err(PackagerError::ManifestNotFound {
            path: template.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(template)?;
    let mut document: Value = serde_json::from_str(&content)?;
    let fields: &mut Map<String, Value> =
        document
            .as_object_mut()
            .ok_or_else(|| PackagerError::InvalidManifest {
                path: template.to_path_buf(),
            })?;

    fields.insert(VERSION_NAME_KEY.to_string(), Value::String(label.to_string()));
    Ok(document)
}

/// Outcome of reconciling the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledManifest {
    pub template: ManifestTemplate,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub document: Value,
}

/// Select, stamp, and (unless `dry_run`) write the plugin manifest.
///
/// The document is fully built in memory before a single write, so a failed
/// run never leaves a half-stamped manifest behind.
pub fn reconcile_manifest(
    plugin_dir: &Path,
    config: &PackagerConfig,
    version: EngineVersion,
    label: &str,
    dry_run: bool,
) -> Result<ReconciledManifest> {
    let template = ManifestTemplate::for_engine(version);
    let template_path = plugin_dir.join(template.file_name(config));
    let output_path = plugin_dir.join(&config.manifest_name);

    tracing::info!(
        %template,
        template_path = %template_path.display(),
        engine = %version,
        "selected manifest template"
    );

    let document = stamp_template(&template_path, label)?;
    let rendered = render_manifest(&document)?;

    if dry_run {
        tracing::info!(path = %output_path.display(), "[dry run] manifest not written");
    } else {
        std::fs::write(&output_path, rendered)?;
        tracing::info!(path = %output_path.display(), version_name = label, "manifest written");
    }

    Ok(ReconciledManifest {
        template,
        template_path,
        output_path,
        document,
    })
}
