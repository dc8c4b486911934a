//! Execution collaborator interfaces and shared types.
//!
//! Defines [`ScriptService`], the modern backend that accepts a reader and
//! hands back a [`ScriptHandle`], and [`MacroInterpreter`], the legacy
//! backend that runs a fully loaded macro synchronously.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::loader::ScriptReader;

/// Named inputs bound to script parameters.
pub type Parameters = Map<String, Value>;

/// Errors an execution service may raise while accepting a script.
#[derive(Debug)]
pub enum ScriptError {
    /// Reading the script content failed.
    Io(std::io::Error),
    /// The script itself raised an error.
    Execution(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Execution(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Execution(_) => None,
        }
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// A submitted unit of work, queryable without blocking.
pub trait ScriptHandle: Send + Sync {
    /// `true` once the work has been cancelled.
    fn is_cancelled(&self) -> bool;
    /// `true` once the work has finished, for whatever reason.
    fn is_done(&self) -> bool;

    /// Error raised by the work after submission, once it has finished.
    fn failure(&self) -> Option<String> {
        None
    }
}

/// Modern execution backend.
///
/// Receives the script name (at least its extension selects the language),
/// a reader over its content, whether to run asynchronously, and optional
/// parameter bindings.
pub trait ScriptService: Send + Sync {
    fn run(
        &self,
        name: &str,
        reader: ScriptReader,
        run_async: bool,
        parameters: Option<Parameters>,
    ) -> Result<Arc<dyn ScriptHandle>, ScriptError>;
}

/// Legacy macro backend.
///
/// Runs `macro_text` synchronously with a single opaque `argument` and
/// returns whatever the macro returned. `None` is the only failure signal.
pub trait MacroInterpreter: Send + Sync {
    fn run_macro(&self, macro_text: &str, argument: &str) -> Option<String>;
}

impl<F> MacroInterpreter for F
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync,
{
    fn run_macro(&self, macro_text: &str, argument: &str) -> Option<String> {
        self(macro_text, argument)
    }
}

impl<S: ScriptService + ?Sized> ScriptService for Arc<S> {
    fn run(
        &self,
        name: &str,
        reader: ScriptReader,
        run_async: bool,
        parameters: Option<Parameters>,
    ) -> Result<Arc<dyn ScriptHandle>, ScriptError> {
        (**self).run(name, reader, run_async, parameters)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
