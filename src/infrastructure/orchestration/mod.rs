//! Application orchestration.
//!
//! Runtime lifecycle for the foreground `run` command.

pub mod runtime;
