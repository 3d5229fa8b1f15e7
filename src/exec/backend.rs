// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The runner talks to a `StepExecutor` instead of the compute platform
//! directly. The platform integration lives outside this crate; tests and
//! the CLI use [`super::RecordingExecutor`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::graph::{ResolvedInputs, StepOutputs, StepSpec};

/// Boxed future returned by [`StepExecutor::run_step`].
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<StepOutputs>> + Send + 'a>>;

/// Runs one step and returns the outputs it materialized.
///
/// The command and metadata on `step` are opaque to the runner and passed
/// through as-is. An `Err` marks the step as failed.
pub trait StepExecutor: Send {
    fn run_step(&mut self, step: &StepSpec, inputs: ResolvedInputs) -> StepFuture<'_>;
}
