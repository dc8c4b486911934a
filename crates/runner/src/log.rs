//! Logging collaborator.
//!
//! The runner forwards every translated error here unless it is silent.

use std::sync::{Arc, Mutex};

pub trait ErrorLog: Send + Sync {
    fn error(&self, message: &str);
}

impl<L: ErrorLog + ?Sized> ErrorLog for Arc<L> {
    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Emits errors as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn error(&self, message: &str) {
        tracing::error!(target: "scriptrun", "{message}");
    }
}

/// Keeps errors in memory, for embedders that surface them later.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorLog for MemoryLog {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
