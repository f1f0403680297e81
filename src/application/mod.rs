//! Application services (use cases).
//!
//! These services drive the domain rules against the outbound ports:
//! the grab supervisor and its workers, the shared runtime settings, and
//! the marketplace session.

pub mod grab;
pub mod session;
pub mod settings;
