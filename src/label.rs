//! Version label resolution from source control
//!
//! The label stamped into the manifest is the most descriptive name git can
//! give the revision. Strategies are tried in order; the first one that yields
//! a usable label wins:
//!
//! 1. [`LabelStrategy::Describe`]: `git describe --tags --always`, giving an
//!    exact tag (`v1.2.3`), a tag plus distance (`v1.2.3-3-gabcdef1`), or a
//!    bare abbreviated hash when the history has no tags.
//! 2. [`LabelStrategy::ShortHash`]: `git rev-parse --short`, for when describe
//!    itself fails.
//!
//! If every strategy fails the run aborts. There is no retry.

use crate::error::{PackagerError, Result};
use crate::runner::{OutputMode, ProcessRunner};
use crate::tool_args::ToolArgs;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Revision labelled when none is given
pub const DEFAULT_REVISION: &str = "HEAD";

/// Fixed abbreviation length for hashes
pub const HASH_ABBREV: usize = 7;

/// Capability to query version control for a revision's name.
pub trait VersionControl: Send + Sync {
    /// Describe-style label (tag, tag-distance-hash, or hash)
    fn describe(&self, revision: &str) -> Result<String>;

    /// Abbreviated commit hash
    fn short_hash(&self, revision: &str) -> Result<String>;
}

/// One way of naming a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum LabelStrategy {
    #[strum(serialize = "describe")]
    Describe,
    #[strum(serialize = "rev-parse")]
    ShortHash,
}

impl LabelStrategy {
    /// Strategies in fallback order
    pub fn fallback_chain() -> Vec<LabelStrategy> {
        LabelStrategy::iter().collect()
    }

    fn attempt(
        self,
        vcs: &dyn VersionControl,
        revision: &str,
    ) -> std::result::Result<String, LabelAttemptError> {
        let raw = match self {
            Self::Describe => vcs.describe(revision),
            Self::ShortHash => vcs.short_hash(revision),
        }
        .map_err(|e| LabelAttemptError::new(self, e.to_string()))?;

        let label = raw.trim();
        if label.is_empty() {
            return Err(LabelAttemptError::new(self, "empty output"));
        }
        if label.chars().any(char::is_whitespace) {
            return Err(LabelAttemptError::new(
                self,
                format!("unexpected whitespace in '{}'", label),
            ));
        }
        Ok(label.to_string())
    }
}

/// Why a single strategy produced no label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAttemptError {
    pub strategy: LabelStrategy,
    pub reason: String,
}

impl LabelAttemptError {
    pub fn new(strategy: LabelStrategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LabelAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

impl std::error::Error for LabelAttemptError {}

/// Try `strategies` in order and return the first usable label.
pub fn resolve_version_label(
    vcs: &dyn VersionControl,
    revision: &str,
    strategies: &[LabelStrategy],
) -> Result<String> {
    let mut attempts = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        match strategy.attempt(vcs, revision) {
            Ok(label) => {
                tracing::info!(%label, %strategy, revision, "version label resolved");
                return Ok(label);
            }
            Err(e) => {
                tracing::warn!(error = %e, "version label strategy failed");
                attempts.push(e);
            }
        }
    }
    Err(PackagerError::VersionLabel {
        revision: revision.to_string(),
        attempts,
    })
}

/// `git describe --tags --always --abbrev=7 <rev>`
#[derive(Debug, Clone)]
pub struct GitDescribeArgs {
    pub repo: PathBuf,
    pub revision: String,
}

impl ToolArgs for GitDescribeArgs {
    fn program(&self) -> String {
        "git".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "describe".to_string(),
            "--tags".to_string(),
            "--always".to_string(),
            format!("--abbrev={}", HASH_ABBREV),
            self.revision.clone(),
        ]
    }

    fn working_dir(&self) -> Option<PathBuf> {
        Some(self.repo.clone())
    }

    fn mutates(&self) -> bool {
        false
    }
}

/// `git rev-parse --short=7 <rev>`
#[derive(Debug, Clone)]
pub struct GitRevParseArgs {
    pub repo: PathBuf,
    pub revision: String,
}

impl ToolArgs for GitRevParseArgs {
    fn program(&self) -> String {
        "git".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "rev-parse".to_string(),
            format!("--short={}", HASH_ABBREV),
            self.revision.clone(),
        ]
    }

    fn working_dir(&self) -> Option<PathBuf> {
        Some(self.repo.clone())
    }

    fn mutates(&self) -> bool {
        false
    }
}

/// [`VersionControl`] backed by the `git` command line.
pub struct GitCli {
    repo: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            repo: repo.into(),
            runner,
        }
    }

    fn query(&self, args: &dyn ToolArgs) -> Result<String> {
        let output = self.runner.run(&args.invocation(), OutputMode::Capture)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(PackagerError::git(format!(
                "exit code {}: {}",
                output.code(),
                output.stderr.trim()
            )))
        }
    }
}

impl VersionControl for GitCli {
    fn describe(&self, revision: &str) -> Result<String> {
        self.query(&GitDescribeArgs {
            repo: self.repo.clone(),
            revision: revision.to_string(),
        })
    }

    fn short_hash(&self, revision: &str) -> Result<String> {
        self.query(&GitRevParseArgs {
            repo: self.repo.clone(),
            revision: revision.to_string(),
        })
    }
}
