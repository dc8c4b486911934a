//! Script execution façade.
//!
//! Coordinates locating, loading, backend dispatch and status translation:
//! 1. Reset the loaded flag and exit status.
//! 2. Resolve the locator against the resource bundle.
//! 3. Load the content (reader for the modern backend, full text for the
//!    legacy one) and mark the script loaded.
//! 4. Dispatch to the backend.
//! 5. Translate the outcome into the final exit status.
//!
//! No error crosses this boundary. Every path ends by recording a status
//! and a loaded flag, optionally forwarding the error to the [`ErrorLog`].

use std::sync::Arc;

use scriptrun_core::config::RunnerConfig;
use scriptrun_core::resource::{
    self, ResourceBundle, ScriptLocator, ScriptStream, DEFAULT_NAMESPACE,
};
use scriptrun_core::scripting::executor::{
    MacroInterpreter, Parameters, ScriptError, ScriptHandle, ScriptService,
};
use scriptrun_core::scripting::loader::{self, LoadError};
use scriptrun_core::scripting::status::ExitStatus;

use crate::log::{ErrorLog, TracingLog};
use crate::report::{ExecutionOutcome, RunReport};

/// The modern-backend submission made by the latest run.
struct Submission {
    name: String,
    handle: Arc<dyn ScriptHandle>,
}

/// Runs bundled scripts and records how the last run went.
///
/// One instance serves one logical session. The run methods take
/// `&mut self`; concurrent runs need one instance each.
pub struct Runner {
    bundle: Box<dyn ResourceBundle>,
    service: Box<dyn ScriptService>,
    interpreter: Box<dyn MacroInterpreter>,
    log: Box<dyn ErrorLog>,
    namespace: String,
    silent: bool,
    loaded: bool,
    exit_status: Option<ExitStatus>,
    submission: Option<Submission>,
}

impl Runner {
    /// Create a non-silent runner over the `BAR` namespace that logs
    /// through `tracing`.
    pub fn new(
        bundle: impl ResourceBundle + 'static,
        service: impl ScriptService + 'static,
        interpreter: impl MacroInterpreter + 'static,
    ) -> Self {
        Self {
            bundle: Box::new(bundle),
            service: Box::new(service),
            interpreter: Box::new(interpreter),
            log: Box::new(TracingLog),
            namespace: DEFAULT_NAMESPACE.to_string(),
            silent: false,
            loaded: false,
            exit_status: None,
            submission: None,
        }
    }

    /// Create a runner with the namespace and silent policy from `config`.
    pub fn from_config(
        config: &RunnerConfig,
        bundle: impl ResourceBundle + 'static,
        service: impl ScriptService + 'static,
        interpreter: impl MacroInterpreter + 'static,
    ) -> Self {
        let mut runner = Self::new(bundle, service, interpreter)
            .with_namespace(config.namespace.clone());
        runner.set_silent(config.silent);
        runner
    }

    pub fn with_log(mut self, log: impl ErrorLog + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // -- modern backend -----------------------------------------------------

    /// Run a script from an already opened stream. `name` is the script
    /// filename, or at least its extension.
    pub fn run_stream(&mut self, stream: Option<ScriptStream>, name: &str) -> RunReport {
        self.run_stream_with(stream, name, None)
    }

    /// [`run_stream`](Self::run_stream) with parameter bindings.
    pub fn run_stream_with(
        &mut self,
        stream: Option<ScriptStream>,
        name: &str,
        parameters: Option<Parameters>,
    ) -> RunReport {
        self.begin();

        let reader = match loader::open(stream, name) {
            Ok(reader) => reader,
            Err(err) => {
                let message = err.to_string();
                self.error(&message, ExitStatus::IoError);
                return self.report(ExecutionOutcome::LoadFailed(message), None);
            }
        };
        self.mark_loaded();

        tracing::debug!(script = name, "Submitting script");
        match self.service.run(name, reader, true, parameters) {
            Ok(handle) => {
                self.submission = Some(Submission {
                    name: name.to_string(),
                    handle: Arc::clone(&handle),
                });
                let outcome = self.inspect(name, handle.as_ref());
                self.report(outcome, Some(handle))
            }
            Err(ScriptError::Io(source)) => {
                let message = LoadError::Io {
                    name: name.to_string(),
                    source,
                }
                .to_string();
                self.error(&message, ExitStatus::IoError);
                self.report(ExecutionOutcome::LoadFailed(message), None)
            }
            Err(ScriptError::Execution(detail)) => {
                self.error(
                    &format!("There was an error running {name}: {detail}"),
                    ExitStatus::Exception,
                );
                self.report(ExecutionOutcome::RuntimeFailed(detail), None)
            }
        }
    }

    /// Run the bundled script at an absolute bundle path, e.g.
    /// `/scripts/BAR/Data_Analysis/Distribution_Plotter.ijm`.
    pub fn run_path(&mut self, path: &str) -> RunReport {
        self.run_path_with(path, None)
    }

    /// [`run_path`](Self::run_path) with parameter bindings.
    pub fn run_path_with(&mut self, path: &str, parameters: Option<Parameters>) -> RunReport {
        let stream = self.bundle.open(path);
        self.run_stream_with(stream, path, parameters)
    }

    /// Run `file` from `directory` under `/scripts/<namespace>/`.
    pub fn run_script(&mut self, directory: &str, file: &str) -> RunReport {
        self.run_script_with(directory, file, None)
    }

    /// [`run_script`](Self::run_script) with parameter bindings.
    pub fn run_script_with(
        &mut self,
        directory: &str,
        file: &str,
        parameters: Option<Parameters>,
    ) -> RunReport {
        let path = ScriptLocator::parts(directory, file).canonical_path(&self.namespace);
        self.run_path_with(&path, parameters)
    }

    /// Re-inspect the handle returned by the latest run while it is pending.
    ///
    /// Records `canceled`, `done`, or `exception` (if the work failed) once
    /// the handle reaches a terminal state. Handles from any other run, and
    /// runs already past `loaded`, are left untouched.
    pub fn refresh(&mut self, handle: &dyn ScriptHandle) -> Option<&ExitStatus> {
        let current = self
            .submission
            .as_ref()
            .filter(|submission| {
                std::ptr::addr_eq(
                    Arc::as_ptr(&submission.handle),
                    handle as *const dyn ScriptHandle,
                )
            })
            .map(|submission| submission.name.clone());

        if let Some(name) = current {
            if self.exit_status == Some(ExitStatus::Loaded) {
                self.inspect(&name, handle);
            }
        }
        self.exit_status.as_ref()
    }

    // -- legacy backend -----------------------------------------------------

    /// Run a legacy macro that takes no script parameters.
    ///
    /// `path` is relative to `/scripts/<namespace>/`. `argument` is handed to
    /// the macro as its single argument string. The final status is exactly
    /// what the interpreter returned; a `None` result leaves no status.
    pub fn run_legacy_macro(&mut self, path: &str, argument: &str) -> RunReport {
        self.begin();

        let full_path = resource::namespaced_path(&self.namespace, path);
        let Some(stream) = self.bundle.open(&full_path) else {
            let message = LoadError::NotFound(path.to_string()).to_string();
            self.error(&message, ExitStatus::IoError);
            return self.report(ExecutionOutcome::LoadFailed(message), None);
        };

        let text = match loader::read_to_string(stream, path) {
            Ok(text) => text,
            Err(err) => {
                let message = err.to_string();
                self.error(&message, ExitStatus::IoError);
                // The macro text never materialised, so the run itself failed.
                self.set_status(ExitStatus::Exception);
                return self.report(ExecutionOutcome::LoadFailed(message), None);
            }
        };
        self.mark_loaded();

        tracing::debug!(script = path, "Running legacy macro");
        let result = self.interpreter.run_macro(&text, argument);
        match &result {
            Some(value) => self.set_status(ExitStatus::Macro(value.clone())),
            None => {
                tracing::debug!(script = path, "Legacy macro returned no result");
                self.exit_status = None;
            }
        }
        self.report(ExecutionOutcome::LegacyResult(result), None)
    }

    // -- state --------------------------------------------------------------

    /// `true` if errors are not forwarded to the [`ErrorLog`]. Statuses are
    /// recorded either way.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Whether the last run obtained its script content.
    pub fn script_loaded(&self) -> bool {
        self.loaded
    }

    /// Exit status of the last run as text: `canceled`, `done`, `loaded`,
    /// `io error`, `exception`, or a legacy macro's own result.
    pub fn status(&self) -> Option<&str> {
        self.exit_status.as_ref().map(ExitStatus::as_str)
    }

    pub fn exit_status(&self) -> Option<&ExitStatus> {
        self.exit_status.as_ref()
    }

    fn begin(&mut self) {
        self.loaded = false;
        self.exit_status = None;
        self.submission = None;
    }

    fn mark_loaded(&mut self) {
        self.loaded = true;
        self.set_status(ExitStatus::Loaded);
    }

    fn set_status(&mut self, status: ExitStatus) {
        tracing::debug!(status = %status, "Exit status updated");
        self.exit_status = Some(status);
    }

    fn inspect(&mut self, name: &str, handle: &dyn ScriptHandle) -> ExecutionOutcome {
        if handle.is_cancelled() {
            self.set_status(ExitStatus::Canceled);
            ExecutionOutcome::Cancelled
        } else if handle.is_done() {
            match handle.failure() {
                Some(detail) => {
                    self.error(
                        &format!("There was an error running {name}: {detail}"),
                        ExitStatus::Exception,
                    );
                    ExecutionOutcome::RuntimeFailed(detail)
                }
                None => {
                    self.set_status(ExitStatus::Done);
                    ExecutionOutcome::Completed
                }
            }
        } else {
            ExecutionOutcome::Pending
        }
    }

    fn error(&mut self, message: &str, status: ExitStatus) {
        if !self.silent {
            self.log.error(message);
        }
        self.set_status(status);
        self.loaded = false;
    }

    fn report(
        &self,
        outcome: ExecutionOutcome,
        handle: Option<Arc<dyn ScriptHandle>>,
    ) -> RunReport {
        RunReport {
            loaded: self.loaded,
            status: self.exit_status.clone(),
            outcome,
            handle,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
