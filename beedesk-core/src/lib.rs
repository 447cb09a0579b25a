//! Board-agnostic core logic for the desk clock firmware
//!
//! This crate contains everything that coordinates the device without
//! touching a specific peripheral:
//!
//! - Shared key/value context used for inter-task communication
//! - Task contract (setup / run / finish)
//! - Periodic (timer-driven) and suspend (round-robin) schedulers
//! - Device configuration types and the text config parser
//! - Traits for the external collaborators (clock, sensor, network,
//!   beeper, asset storage, heap statistics)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod context;
pub mod scheduler;
pub mod task;
pub mod traits;

pub use context::{Context, ContextError, SharedContext, Value, TICKS_MS};
pub use scheduler::{ExecError, PeriodicScheduler, RunFlag, SuspendScheduler, TaskId};
pub use task::{Task, TaskError, TaskStatus};
