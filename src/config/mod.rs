// src/config/mod.rs

//! Workflow files.
//!
//! - [`model`] mirrors the TOML layout.
//! - [`loader`] reads files and runs validation.
//! - [`validate`] turns a raw file into a [`crate::workflow::Workflow`] and
//!   its plan.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_workflow_path, load_and_validate, load_from_path, parse_str};
pub use model::{
    DefaultsSection, InputConfig, OutputRefConfig, RawWorkflowFile, StepConfig, WorkflowFile,
    WorkflowSection,
};
