//! Structured result of a single run call.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use scriptrun_core::scripting::executor::ScriptHandle;
use scriptrun_core::scripting::status::ExitStatus;

/// What a run call observed. Produced once per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The execution service reported the work as cancelled.
    Cancelled,
    /// The work had already finished when inspected.
    Completed,
    /// Submitted but neither finished nor cancelled when inspected.
    /// The handle in the [`RunReport`] is the only way to learn more.
    Pending,
    /// The script could not be located or read.
    LoadFailed(String),
    /// The script raised an error.
    RuntimeFailed(String),
    /// Verbatim result of a legacy macro; `None` if it returned nothing.
    LegacyResult(Option<String>),
}

/// Loaded flag, exit status and outcome of one run, plus the execution
/// handle when the modern backend accepted the script.
#[derive(Clone, Serialize)]
pub struct RunReport {
    pub loaded: bool,
    pub status: Option<ExitStatus>,
    pub outcome: ExecutionOutcome,
    #[serde(skip)]
    pub handle: Option<Arc<dyn ScriptHandle>>,
}

impl RunReport {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(ExitStatus::as_str)
    }

    /// `true` when the run ended with `io error` or `exception`.
    pub fn is_error(&self) -> bool {
        self.status.as_ref().is_some_and(ExitStatus::is_error)
    }
}

impl fmt::Debug for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunReport")
            .field("loaded", &self.loaded)
            .field("status", &self.status)
            .field("outcome", &self.outcome)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
