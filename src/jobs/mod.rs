// src/jobs/mod.rs
//! Interactive-side job plumbing: per-key debouncing, the worker job
//! coordinator and pooled marker entities.

pub mod coordinator;
pub mod debounce;
pub mod pool;

pub use coordinator::JobCoordinator;
pub use debounce::{DebounceDelays, Debouncer};
pub use pool::{drain_marker_queue, Marker, MarkerPool, MarkerPurpose, MarkerQueue, MarkerQueueConfig, MarkerRequest};
