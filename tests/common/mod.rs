//! Shared fixtures: a fake engine install, a plugin directory with templates,
//! and scripted stand-ins for subprocesses and git.

#![allow(dead_code)]

use plugin_packager::engine::build_tool_path;
use plugin_packager::error::{PackagerError, Result};
use plugin_packager::{
    Invocation, OutputMode, PackagerConfig, ProcessOutput, ProcessRunner, VersionControl,
};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const LEGACY_TEMPLATE: &str = r#"{
	"FileVersion": 3,
	"Version": 1,
	"VersionName": "dev",
	"FriendlyName": "UnrealLibretro",
	"EngineVersion": "4.27.0",
	"CanContainContent": true
}"#;

pub const CURRENT_TEMPLATE: &str = r#"{
	"FileVersion": 3,
	"Version": 1,
	"VersionName": "dev",
	"FriendlyName": "UnrealLibretro",
	"EngineVersion": "5.3.0",
	"CanContainContent": true
}"#;

/// Temporary engine + plugin + output directories
pub struct Fixture {
    pub root: TempDir,
    pub engine: PathBuf,
    pub plugin_dir: PathBuf,
    pub output_root: PathBuf,
}

impl Fixture {
    /// Engine reporting `major.minor`, plugin with both templates and
    /// third-party binaries, empty output root.
    pub fn new(major: u32, minor: u32) -> Self {
        let root = TempDir::new().unwrap();
        let engine = root.path().join(format!("UE_{}.{}", major, minor));
        let plugin_dir = root.path().join("UnrealLibretro");
        let output_root = root.path().join("out");

        fs::create_dir_all(engine.join("Engine/Build")).unwrap();
        let build_version = format!(
            r#"{{ "MajorVersion": {}, "MinorVersion": {}, "PatchVersion": 0 }}"#,
            major, minor
        );
        fs::write(engine.join("Engine/Build/Build.version"), build_version).unwrap();
        let tool = build_tool_path(&engine);
        fs::create_dir_all(tool.parent().unwrap()).unwrap();
        fs::write(&tool, "#!/bin/bash\nexit 0\n").unwrap();

        let config = PackagerConfig::default();
        fs::create_dir_all(plugin_dir.join(config.third_party_path())).unwrap();
        fs::write(plugin_dir.join(&config.legacy_template), LEGACY_TEMPLATE).unwrap();
        fs::write(plugin_dir.join(&config.current_template), CURRENT_TEMPLATE).unwrap();

        fs::create_dir_all(&output_root).unwrap();

        Self {
            root,
            engine,
            plugin_dir,
            output_root,
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

/// `path` spelled relative to the current directory, e.g.
/// `../../tmp/.tmpXYZ/UnrealLibretro`.
pub fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut relative = PathBuf::new();
    for component in cwd.components() {
        if let Component::Normal(_) = component {
            relative.push("..");
        }
    }
    for component in path.components() {
        if let Component::Normal(part) = component {
            relative.push(part);
        }
    }
    relative
}

type Handler = dyn Fn(&Invocation) -> ProcessOutput + Send + Sync;

/// Records every invocation and answers with a scripted handler
pub struct FakeRunner {
    pub calls: Mutex<Vec<Invocation>>,
    handler: Box<Handler>,
}

impl FakeRunner {
    pub fn new(
        handler: impl Fn(&Invocation) -> ProcessOutput + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        })
    }

    /// Behaves like a working build tool and archiver: `BuildPlugin` creates
    /// the package directory, the archiver creates the zip.
    pub fn working() -> Arc<Self> {
        Self::with_build_status(0)
    }

    /// Build tool exits with `code`; on success it creates the package dir.
    pub fn with_build_status(code: i32) -> Arc<Self> {
        Self::new(move |inv| {
            if is_build(inv) {
                if code == 0 {
                    let package = inv
                        .args
                        .iter()
                        .find_map(|a| a.strip_prefix("-Package="))
                        .expect("BuildPlugin without -Package");
                    fs::create_dir_all(package).unwrap();
                    ProcessOutput::ok("")
                } else {
                    ProcessOutput::failed(code, "")
                }
            } else if is_archive(inv) {
                let dir = inv.working_dir.as_ref().expect("archiver without working dir");
                fs::write(dir.join(&inv.args[2]), b"PK\x05\x06").unwrap();
                ProcessOutput::ok("")
            } else {
                ProcessOutput::failed(127, format!("unexpected command {}", inv.display()))
            }
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(|inv| {
                if is_build(inv) {
                    "build"
                } else if is_archive(inv) {
                    "archive"
                } else {
                    "other"
                }
            })
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, invocation: &Invocation, _mode: OutputMode) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok((self.handler)(invocation))
    }
}

pub fn is_build(inv: &Invocation) -> bool {
    inv.args.iter().any(|a| a == "BuildPlugin")
}

pub fn is_archive(inv: &Invocation) -> bool {
    inv.program == "zip"
}

/// Git stand-in with fixed answers
pub struct FakeVcs {
    pub describe: std::result::Result<String, String>,
    pub short_hash: std::result::Result<String, String>,
}

impl FakeVcs {
    pub fn tagged(tag: &str) -> Box<Self> {
        Box::new(Self {
            describe: Ok(format!("{}\n", tag)),
            short_hash: Ok("abcdef1\n".to_string()),
        })
    }

    pub fn broken() -> Box<Self> {
        Box::new(Self {
            describe: Err("fatal: not a git repository".to_string()),
            short_hash: Err("fatal: not a git repository".to_string()),
        })
    }
}

impl VersionControl for FakeVcs {
    fn describe(&self, _revision: &str) -> Result<String> {
        self.describe.clone().map_err(PackagerError::git)
    }

    fn short_hash(&self, _revision: &str) -> Result<String> {
        self.short_hash.clone().map_err(PackagerError::git)
    }
}
