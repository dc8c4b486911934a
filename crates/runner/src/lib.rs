//! `scriptrun-runner` -- the script execution façade.
//!
//! [`Runner`] resolves a script locator to content, dispatches it to the
//! modern [`ScriptService`] or the legacy [`MacroInterpreter`], and folds
//! whatever comes back into one [`ExitStatus`] plus a loaded flag.
//!
//! [`ScriptService`]: scriptrun_core::scripting::executor::ScriptService
//! [`MacroInterpreter`]: scriptrun_core::scripting::executor::MacroInterpreter
//! [`ExitStatus`]: scriptrun_core::scripting::status::ExitStatus

pub mod log;
pub mod report;
pub mod runner;

pub use log::{ErrorLog, MemoryLog, TracingLog};
pub use report::{ExecutionOutcome, RunReport};
pub use runner::Runner;
