//! CLI command implementations.
//!
//! Each subcommand has its own module:
//!
//! - [`run`] - Main command (daemon: receiver + orchestrator)
//! - [`sync`] - One-shot manual sync of a given position
//! - [`shell`] - Interactive session with a single controller

pub mod run;
pub mod shell;
pub mod sync;
