// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The graph validation variants are raised while a workflow is being
//! authored or frozen into a plan, never while it is being dispatched.

use thiserror::Error;

use crate::graph::StepId;

#[derive(Error, Debug)]
pub enum TrialflowError {
    #[error("duplicate step identifier: '{step}'")]
    DuplicateStep { step: StepId },

    #[error("step '{step}' references unknown step '{referenced}'")]
    UnresolvedReference { step: StepId, referenced: StepId },

    #[error("step '{step}' references output '{output}' which step '{referenced}' does not declare")]
    MissingOutput {
        step: StepId,
        referenced: StepId,
        output: String,
    },

    #[error("cycle detected in step graph involving: {}", steps.join(", "))]
    CycleDetected { steps: Vec<StepId> },

    #[error("graph is frozen; cannot add step '{step}'")]
    GraphFrozen { step: StepId },

    #[error("step '{step}' failed: {reason}")]
    StepFailed { step: StepId, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TrialflowError>;
