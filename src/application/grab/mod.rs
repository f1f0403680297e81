//! Price watching and purchasing.
//!
//! [`WorkerSupervisor`] owns the tracked tasks and runs one worker per
//! monitored task. Workers report purchases and automatic pauses as
//! [`Event`](crate::port::outbound::notifier::Event)s on the channel
//! returned by [`WorkerSupervisor::new`].

mod context;
mod supervisor;
mod worker;

pub use context::{GrabContext, GrabTimings};
pub use supervisor::{PolicyUpdate, WorkerSupervisor};
pub use worker::WorkerSignal;
