//! Tokio-backed reference [`ScriptService`].
//!
//! [`TaskScriptService`] decodes the script text up front, then hands it to
//! an evaluator function. Asynchronous submissions run the evaluator on the
//! blocking pool of a tokio runtime and return a [`TaskHandle`] at once;
//! synchronous ones evaluate inline and return an already-finished handle.
//! Every handle's token is a child of the service's shutdown token, so
//! [`TaskScriptService::shutdown`] cancels all outstanding work.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::executor::{Parameters, ScriptError, ScriptHandle, ScriptService};
use super::loader::ScriptReader;

/// Evaluates `(name, source, parameters)`, returning an error message on failure.
pub type Evaluator = dyn Fn(&str, &str, &Parameters) -> Result<(), String> + Send + Sync;

/// Handle to work submitted through [`TaskScriptService`].
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
    finished: Arc<AtomicBool>,
    failure: Arc<OnceLock<String>>,
}

impl TaskHandle {
    fn settled(cancel: CancellationToken) -> Self {
        let finished = !cancel.is_cancelled();
        Self {
            cancel,
            join: None,
            finished: Arc::new(AtomicBool::new(finished)),
            failure: Arc::new(OnceLock::new()),
        }
    }

    /// Request cancellation. Has no effect once the work has finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl ScriptHandle for TaskHandle {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() && !self.finished.load(Ordering::Acquire)
    }

    fn is_done(&self) -> bool {
        self.is_cancelled() || self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn failure(&self) -> Option<String> {
        self.failure.get().cloned()
    }
}

/// [`ScriptService`] that evaluates scripts on a tokio runtime.
pub struct TaskScriptService {
    runtime: Handle,
    evaluator: Arc<Evaluator>,
    shutdown: CancellationToken,
}

impl TaskScriptService {
    pub fn new<F>(runtime: Handle, evaluator: F) -> Self
    where
        F: Fn(&str, &str, &Parameters) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            runtime,
            evaluator: Arc::new(evaluator),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel all outstanding work and every later submission.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Submit a script, returning the concrete handle.
    pub fn submit(
        &self,
        name: &str,
        mut reader: ScriptReader,
        run_async: bool,
        parameters: Option<Parameters>,
    ) -> Result<Arc<TaskHandle>, ScriptError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        drop(reader);

        if self.shutdown.is_cancelled() {
            return Ok(Arc::new(TaskHandle::settled(self.shutdown.child_token())));
        }

        let parameters = parameters.unwrap_or_default();

        if !run_async {
            (self.evaluator)(name, &source, &parameters).map_err(ScriptError::Execution)?;
            return Ok(Arc::new(TaskHandle::settled(CancellationToken::new())));
        }

        let cancel = self.shutdown.child_token();
        let finished = Arc::new(AtomicBool::new(false));
        let failure = Arc::new(OnceLock::new());

        let token = cancel.clone();
        let evaluator = Arc::clone(&self.evaluator);
        let done = Arc::clone(&finished);
        let recorded = Arc::clone(&failure);
        let name = name.to_string();

        let join = self.runtime.spawn(async move {
            let work =
                tokio::task::spawn_blocking(move || evaluator(&name, &source, &parameters));
            tokio::select! {
                _ = token.cancelled() => {}
                result = work => {
                    done.store(true, Ordering::Release);
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(msg)) => {
                            let _ = recorded.set(msg);
                        }
                        Err(err) => {
                            let _ = recorded.set(format!("evaluation aborted: {err}"));
                        }
                    }
                }
            }
        });

        Ok(Arc::new(TaskHandle {
            cancel,
            join: Some(join),
            finished,
            failure,
        }))
    }
}

impl ScriptService for TaskScriptService {
    fn run(
        &self,
        name: &str,
        reader: ScriptReader,
        run_async: bool,
        parameters: Option<Parameters>,
    ) -> Result<Arc<dyn ScriptHandle>, ScriptError> {
        let handle: Arc<dyn ScriptHandle> = self.submit(name, reader, run_async, parameters)?;
        Ok(handle)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
