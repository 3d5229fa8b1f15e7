// src/exec/mod.rs

//! Step dispatch seam.
//!
//! - [`backend`] provides the `StepExecutor` trait the runner dispatches to.
//! - [`recording`] provides `RecordingExecutor`, which records dispatches and
//!   materializes placeholder output handles without running anything.

pub mod backend;
pub mod recording;

pub use backend::{StepExecutor, StepFuture};
pub use recording::{Dispatch, RecordingExecutor};
