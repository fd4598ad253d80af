#![forbid(unsafe_code)]

//! Bridge runtime: main-thread scheduling.
//!
//! # Key Components
//!
//! - [`MainThreadQueue`] - immediate and delayed tasks, drained by the host
//! - [`Generation`] / [`Tagged`] - invalidation of deferred work
//!
//! # How it fits in the system
//! Views in `nrb-widgets` post follow-up work here instead of holding weak
//! references to themselves. The host pumps the queue from its UI loop.

pub mod generation;
pub mod main_thread;

pub use generation::{Generation, Tagged};
pub use main_thread::{MainThreadQueue, QueueStats};
