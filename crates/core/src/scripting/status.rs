//! Exit status vocabulary reported after a run.
//!
//! The modern backend only ever produces the fixed tokens below. The legacy
//! backend may also produce an arbitrary macro result, carried verbatim in
//! [`ExitStatus::Macro`].

use std::fmt;

use serde::Serialize;

/// The execution service reported the work as cancelled.
pub const WAS_CANCELED: &str = "canceled";

/// The work had already finished when inspected.
pub const WAS_DONE: &str = "done";

/// The script content was obtained; no terminal status yet.
pub const WAS_LOADED: &str = "loaded";

/// The script could not be found or read.
pub const IO_ERROR: &str = "io error";

/// The script raised an error, or a legacy macro could not be loaded.
pub const EXCEPTION: &str = "exception";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ExitStatus {
    Canceled,
    Done,
    Loaded,
    IoError,
    Exception,
    /// Pass-through result string returned by a legacy macro.
    Macro(String),
}

impl ExitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canceled => WAS_CANCELED,
            Self::Done => WAS_DONE,
            Self::Loaded => WAS_LOADED,
            Self::IoError => IO_ERROR,
            Self::Exception => EXCEPTION,
            Self::Macro(result) => result,
        }
    }

    /// `true` for statuses that end a run with an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::IoError | Self::Exception)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExitStatus> for String {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Macro(result) => result,
            other => other.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
