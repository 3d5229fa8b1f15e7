// src/engine/state.rs

//! Per-run step state transitions.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::StepState;
use crate::graph::{ExecutionPlan, StepId};

/// Tracks the state of every step of one plan during one run.
#[derive(Debug)]
pub struct StateTracker {
    plan: ExecutionPlan,
    states: HashMap<StepId, StepState>,
}

impl StateTracker {
    pub fn new(plan: ExecutionPlan) -> Self {
        let states = plan
            .steps()
            .iter()
            .map(|s| (s.id.clone(), StepState::Pending))
            .collect();
        Self { plan, states }
    }

    pub fn state_of(&self, step: &str) -> Option<&StepState> {
        self.states.get(step)
    }

    pub fn is_pending(&self, step: &str) -> bool {
        matches!(self.states.get(step), Some(StepState::Pending))
    }

    pub fn mark_succeeded(&mut self, step: &str) {
        if let Some(state) = self.states.get_mut(step) {
            *state = StepState::Succeeded;
        }
    }

    /// Mark `step` failed and skip every pending step downstream of it.
    ///
    /// Returns the steps that were newly skipped.
    pub fn mark_failed(&mut self, step: &str, reason: String) -> Vec<StepId> {
        if let Some(state) = self.states.get_mut(step) {
            *state = StepState::Failed(reason);
        }

        let mut stack: Vec<StepId> = self
            .plan
            .downstream_of(step)
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut newly_skipped = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(state) = self.states.get_mut(&name) {
                if matches!(state, StepState::Pending) {
                    *state = StepState::Skipped;
                    debug!(step = %name, "skipping dependent of failed step");
                    stack.extend(
                        self.plan
                            .downstream_of(&name)
                            .into_iter()
                            .map(str::to_string),
                    );
                    newly_skipped.push(name);
                }
            }
        }

        newly_skipped
    }

    /// Skip every step that has not run yet. Returns them in plan order.
    pub fn skip_all_pending(&mut self) -> Vec<StepId> {
        let mut skipped = Vec::new();
        for step in self.plan.steps() {
            if let Some(state) = self.states.get_mut(&step.id) {
                if matches!(state, StepState::Pending) {
                    *state = StepState::Skipped;
                    skipped.push(step.id.clone());
                }
            }
        }
        skipped
    }

    /// Final states in plan order.
    pub fn into_states(mut self) -> Vec<(StepId, StepState)> {
        self.plan
            .steps()
            .iter()
            .map(|s| {
                let state = self.states.remove(&s.id).unwrap_or(StepState::Skipped);
                (s.id.clone(), state)
            })
            .collect()
    }
}
