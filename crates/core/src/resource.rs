//! Resource locator and bundled script collections.
//!
//! Scripts are addressed by absolute bundle paths of the form
//! `/scripts/<namespace>/<directory>/<file>`. Composing a path never checks
//! existence; that only happens when a [`ResourceBundle`] is asked to open
//! it, and a missing resource is a normal `None`, not an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Root every bundle path starts with.
pub const SCRIPTS_ROOT: &str = "/scripts";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "BAR";

/// An open byte stream over a bundled script.
pub type ScriptStream = Box<dyn Read + Send>;

/// Symbolic address of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLocator {
    /// A `(directory, filename)` pair relative to the namespace root.
    Parts { directory: String, filename: String },
    /// A raw absolute bundle path, used as-is.
    Path(String),
}

impl ScriptLocator {
    pub fn parts(directory: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::Parts {
            directory: directory.into(),
            filename: filename.into(),
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Canonical bundle path for this locator under `namespace`.
    pub fn canonical_path(&self, namespace: &str) -> String {
        match self {
            Self::Parts {
                directory,
                filename,
            } => script_path(namespace, directory, filename),
            Self::Path(path) => path.clone(),
        }
    }
}

/// `/scripts/<namespace>/<directory>/<filename>`.
pub fn script_path(namespace: &str, directory: &str, filename: &str) -> String {
    format!("{SCRIPTS_ROOT}/{namespace}/{directory}/{filename}")
}

/// `/scripts/<namespace>/<relative>`.
pub fn namespaced_path(namespace: &str, relative: &str) -> String {
    format!("{SCRIPTS_ROOT}/{namespace}/{relative}")
}

/// A read-only collection of bundled scripts addressed by path.
pub trait ResourceBundle: Send + Sync {
    /// Open the resource at `path`, or `None` if there is no such resource.
    fn open(&self, path: &str) -> Option<ScriptStream>;
}

impl<B: ResourceBundle + ?Sized> ResourceBundle for Arc<B> {
    fn open(&self, path: &str) -> Option<ScriptStream> {
        (**self).open(path)
    }
}

/// Bundle backed by an in-memory `path -> bytes` map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    entries: HashMap<String, Arc<[u8]>>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, path: impl Into<String>, body: impl AsRef<[u8]>) -> Self {
        self.insert(path, body);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, body: impl AsRef<[u8]>) {
        self.entries.insert(path.into(), Arc::from(body.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceBundle for MemoryBundle {
    fn open(&self, path: &str) -> Option<ScriptStream> {
        let body = self.entries.get(path)?.clone();
        Some(Box::new(Cursor::new(body)))
    }
}

/// Bundle backed by a directory on disk.
///
/// The bundle path `/scripts/BAR/x.ijm` maps to `<root>/scripts/BAR/x.ijm`.
/// Paths that try to leave the root (`..`, prefixes) resolve to nothing.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

impl ResourceBundle for DirectoryBundle {
    fn open(&self, path: &str) -> Option<ScriptStream> {
        let resolved = self.resolve(path)?;
        if !resolved.is_file() {
            return None;
        }
        let file = File::open(resolved).ok()?;
        Some(Box::new(file))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
