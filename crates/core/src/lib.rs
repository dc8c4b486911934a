//! `scriptrun-core` -- pure domain logic for running bundled scripts.
//!
//! Holds the resource locator, the script loader, the exit status
//! vocabulary and the execution collaborator traits. Nothing in this crate
//! logs; reporting is the façade's job (`scriptrun-runner`).

pub mod config;
pub mod error;
pub mod resource;
pub mod scripting;
