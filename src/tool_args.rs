//! Type-safe external tool argument contracts.
//!
//! Every external program the packager runs (the engine automation tool, git,
//! the archiver) is described by a struct implementing [`ToolArgs`]. The struct
//! definition is the contract: flag spelling lives in exactly one place and the
//! runner never sees raw, hand-assembled argument vectors.

use std::path::PathBuf;

/// Trait for typed tool invocations.
///
/// # Contract
///
/// - `program()`: the executable to start, resolved through `PATH` if relative.
/// - `to_cli_args()`: arguments exactly as the tool expects them.
/// - `working_dir()`: directory to run in, `None` inherits the caller's.
/// - `mutates()`: whether the tool writes anything. Dry runs skip these.
///
/// # Example
///
/// ```
/// use plugin_packager::finisher::ArchiveArgs;
/// use plugin_packager::tool_args::ToolArgs;
/// use plugin_packager::{EngineVersion, PackageLayout};
/// use std::path::Path;
///
/// let layout = PackageLayout::new(Path::new("/out"), "UnrealLibretro", EngineVersion::new(5, 1));
/// let args = ArchiveArgs::new("zip", &layout);
/// assert_eq!(args.program(), "zip");
/// assert_eq!(
///     args.to_cli_args(),
///     ["-r", "-q", "UnrealLibretro-5.1.zip", "UnrealLibretro-5.1"]
/// );
/// assert_eq!(args.working_dir().as_deref(), Some(Path::new("/out")));
/// ```
pub trait ToolArgs {
    /// Executable name or path.
    fn program(&self) -> String;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Working directory for the process.
    fn working_dir(&self) -> Option<PathBuf> {
        None
    }

    /// True if running the tool changes anything on disk.
    fn mutates(&self) -> bool {
        true
    }

    /// Freeze the contract into a runnable [`Invocation`].
    fn invocation(&self) -> Invocation {
        Invocation {
            program: self.program(),
            args: self.to_cli_args(),
            working_dir: self.working_dir(),
            mutates: self.mutates(),
        }
    }
}

/// A fully resolved command line, as handed to a [`crate::runner::ProcessRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub mutates: bool,
}

impl Invocation {
    /// Shell-like rendering for logs and dry-run output.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote(&self.program));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}
