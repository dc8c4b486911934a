//! Script execution domain logic.
//!
//! Provides the loader that turns a bundle stream into readable script
//! content, the exit status vocabulary, the collaborator traits for the two
//! execution backends, and a tokio-backed reference [`ScriptService`].
//!
//! [`ScriptService`]: executor::ScriptService

pub mod executor;
pub mod loader;
pub mod status;
pub mod task;
