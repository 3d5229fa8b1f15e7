// src/graph/builder.rs

use std::collections::HashMap;

use tracing::{debug, info};

use crate::errors::{Result, TrialflowError};
use crate::graph::plan::ExecutionPlan;
use crate::graph::sort::insertion_stable_order;
use crate::graph::step::{StepId, StepSpec};

/// Lifecycle state of a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    /// Accepting new steps.
    Open,
    /// A plan has been built; no further mutation is allowed.
    Frozen,
}

/// Step graph under construction.
///
/// Steps are kept in insertion order. The graph moves from
/// [`GraphState::Open`] to [`GraphState::Frozen`] on the first successful
/// [`Graph::build`] and never moves back.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    steps: Vec<StepSpec>,
    index: HashMap<StepId, usize>,
    plan: Option<ExecutionPlan>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GraphState {
        if self.plan.is_some() {
            GraphState::Frozen
        } else {
            GraphState::Open
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in insertion order.
    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn get(&self, id: &str) -> Option<&StepSpec> {
        self.index.get(id).map(|&i| &self.steps[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Register a step, requiring every step it references to be present
    /// already (dependencies before dependents).
    pub fn add_step(&mut self, spec: StepSpec) -> Result<()> {
        self.ensure_insertable(&spec)?;

        if let Some(missing) = spec
            .upstream_steps()
            .into_iter()
            .find(|upstream| !self.index.contains_key(*upstream))
        {
            return Err(TrialflowError::UnresolvedReference {
                step: spec.id.clone(),
                referenced: missing.to_string(),
            });
        }

        self.insert(spec);
        Ok(())
    }

    /// Register a step whose references may point at steps declared later.
    ///
    /// Reference checks are deferred to [`Graph::build`].
    pub fn declare_step(&mut self, spec: StepSpec) -> Result<()> {
        self.ensure_insertable(&spec)?;
        self.insert(spec);
        Ok(())
    }

    /// Validate the graph and freeze it into an [`ExecutionPlan`].
    ///
    /// On a frozen graph this returns the plan built the first time. On
    /// failure the graph stays open and no plan is produced.
    pub fn build(&mut self) -> Result<ExecutionPlan> {
        if let Some(plan) = &self.plan {
            return Ok(plan.clone());
        }

        self.check_references()?;

        let order = insertion_stable_order(&self.steps, &self.index)?;
        let ordered: Vec<StepSpec> = order.into_iter().map(|i| self.steps[i].clone()).collect();
        let plan = ExecutionPlan::from_ordered(ordered);

        info!(steps = plan.len(), "graph frozen into execution plan");
        debug!(order = ?plan.step_ids(), "plan order");

        self.plan = Some(plan.clone());
        Ok(plan)
    }

    /// The frozen plan, if [`Graph::build`] has succeeded.
    pub fn plan(&self) -> Option<&ExecutionPlan> {
        self.plan.as_ref()
    }

    fn ensure_insertable(&self, spec: &StepSpec) -> Result<()> {
        if self.plan.is_some() {
            return Err(TrialflowError::GraphFrozen {
                step: spec.id.clone(),
            });
        }
        if self.index.contains_key(&spec.id) {
            return Err(TrialflowError::DuplicateStep {
                step: spec.id.clone(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, spec: StepSpec) {
        debug!(step = %spec.id, command = %spec.command, "step added");
        self.index.insert(spec.id.clone(), self.steps.len());
        self.steps.push(spec);
    }

    fn check_references(&self) -> Result<()> {
        for step in &self.steps {
            for (_, r) in step.references() {
                let upstream = self.get(&r.step).ok_or_else(|| {
                    TrialflowError::UnresolvedReference {
                        step: step.id.clone(),
                        referenced: r.step.clone(),
                    }
                })?;

                if !upstream.outputs.contains(&r.output) {
                    return Err(TrialflowError::MissingOutput {
                        step: step.id.clone(),
                        referenced: r.step.clone(),
                        output: r.output.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
