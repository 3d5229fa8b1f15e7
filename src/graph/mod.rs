// src/graph/mod.rs

//! Step graph construction and validation.
//!
//! - [`step`] holds the step descriptor and the input/output reference types.
//! - [`builder`] contains the [`Graph`] that accepts steps and freezes into a
//!   plan.
//! - [`sort`] implements the insertion-stable topological sort.
//! - [`plan`] holds the frozen [`ExecutionPlan`].
//! - [`resolve`] maps declared inputs to published output handles.

pub mod builder;
pub mod plan;
pub mod resolve;
mod sort;
pub mod step;

pub use builder::{Graph, GraphState};
pub use plan::ExecutionPlan;
pub use resolve::{
    resolve_inputs, OutputHandle, PublishedOutputs, ResolvedInput, ResolvedInputs, StepOutputs,
};
pub use step::{InputValue, OutputRef, StepId, StepSpec};
