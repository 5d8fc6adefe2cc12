//! Bounded-concurrency task pool.
//!
//! Runs a batch of independent async tasks with a worker cap, per-task panic
//! isolation, an optional per-task timeout, and positionally stable results.

pub mod pool;

pub use pool::{run, PoolOptions, ProgressFn, TaskFailure, TaskOutcome};
