//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: deletes cached documents whose TTL has elapsed

mod sweep;

pub use sweep::spawn_sweep_task;
