// src/engine/mod.rs

//! Plan execution.
//!
//! The [`runner`] walks an [`crate::graph::ExecutionPlan`] in order, hands
//! each step to a [`crate::exec::StepExecutor`] and applies the workflow's
//! [`crate::types::FailurePolicy`]. Per-step state lives in [`state`].

use std::collections::BTreeMap;

use crate::errors::{Result, TrialflowError};
use crate::graph::{OutputHandle, PublishedOutputs, StepId};

/// Final (or current) state of a step within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    /// Not dispatched yet.
    Pending,
    /// Dispatched and published every declared output.
    Succeeded,
    /// Dispatched and failed, or its inputs could not be resolved.
    Failed(String),
    /// Never dispatched because of an upstream failure or the failure policy.
    Skipped,
}

/// Outcome of running a plan.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Step states in plan order.
    pub steps: Vec<(StepId, StepState)>,
    /// Outputs published by succeeded steps.
    pub outputs: PublishedOutputs,
    /// Workflow outputs whose producing step succeeded.
    pub workflow_outputs: BTreeMap<String, OutputHandle>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .all(|(_, s)| matches!(s, StepState::Succeeded))
    }

    pub fn state_of(&self, step: &str) -> Option<&StepState> {
        self.steps.iter().find(|(id, _)| id == step).map(|(_, s)| s)
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.filter(|s| matches!(s, StepState::Succeeded))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.filter(|s| matches!(s, StepState::Failed(_)))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.filter(|s| matches!(s, StepState::Skipped))
    }

    /// Turn the first failure into an error.
    pub fn into_result(self) -> Result<Self> {
        let first_failure = self.steps.iter().find_map(|(id, s)| match s {
            StepState::Failed(reason) => Some((id.clone(), reason.clone())),
            _ => None,
        });

        match first_failure {
            Some((step, reason)) => Err(TrialflowError::StepFailed { step, reason }),
            None => Ok(self),
        }
    }

    fn filter(&self, pred: impl Fn(&StepState) -> bool) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(_, s)| pred(s))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

pub mod runner;
pub mod state;

pub use runner::Runner;
pub use state::StateTracker;
