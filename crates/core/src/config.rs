use std::path::PathBuf;

use crate::error::CoreError;
use crate::resource::{DirectoryBundle, DEFAULT_NAMESPACE};

/// Runner configuration loaded from environment variables.
///
/// Defaults suit the bundled `BAR` script collection with errors reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Namespace under `/scripts/` that bundle paths are composed from.
    pub namespace: String,
    /// When `true`, errors are not forwarded to the logging collaborator.
    pub silent: bool,
    /// Directory backing a [`DirectoryBundle`], if scripts live on disk.
    pub resource_root: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            silent: false,
            resource_root: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `SCRIPTRUN_NAMESPACE`     | `BAR`   |
    /// | `SCRIPTRUN_SILENT`        | `false` |
    /// | `SCRIPTRUN_RESOURCE_ROOT` | unset   |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`, so callers can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("SCRIPTRUN_NAMESPACE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        if namespace.contains('/') {
            return Err(CoreError::Config(format!(
                "SCRIPTRUN_NAMESPACE must be a single path segment, got '{namespace}'"
            )));
        }

        let silent = match lookup("SCRIPTRUN_SILENT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                CoreError::Config(format!("SCRIPTRUN_SILENT must be a boolean, got '{raw}'"))
            })?,
            None => false,
        };

        let resource_root = lookup("SCRIPTRUN_RESOURCE_ROOT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            namespace,
            silent,
            resource_root,
        })
    }

    /// Filesystem bundle rooted at [`resource_root`](Self::resource_root).
    pub fn directory_bundle(&self) -> Option<DirectoryBundle> {
        self.resource_root.as_ref().map(|root| DirectoryBundle::new(root.clone()))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
