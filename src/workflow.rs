// src/workflow.rs

//! Named workflows: a step graph plus the values around it.
//!
//! A [`Workflow`] is an explicit value built by a factory function (see
//! [`crate::catalog`]) or loaded from a file (see [`crate::config`]). There
//! is no process-wide registry.

use std::collections::BTreeMap;

use crate::errors::{Result, TrialflowError};
use crate::graph::{ExecutionPlan, Graph, GraphState, OutputRef, StepSpec};
use crate::types::FailurePolicy;

#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    failure_policy: FailurePolicy,
    /// Bound workflow parameters (e.g. `sdtm_data_path`).
    params: BTreeMap<String, String>,
    graph: Graph,
    /// Values the workflow returns, keyed by output name.
    outputs: BTreeMap<String, OutputRef>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_policy: FailurePolicy::default(),
            params: BTreeMap::new(),
            graph: Graph::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn state(&self) -> GraphState {
        self.graph.state()
    }

    pub fn outputs(&self) -> &BTreeMap<String, OutputRef> {
        &self.outputs
    }

    /// Add a step in top-down authoring order. See [`Graph::add_step`].
    pub fn add_step(&mut self, spec: StepSpec) -> Result<OutputRefs> {
        let refs = OutputRefs::of(&spec);
        self.graph.add_step(spec)?;
        Ok(refs)
    }

    /// Add a step whose references are checked at plan time. See
    /// [`Graph::declare_step`].
    pub fn declare_step(&mut self, spec: StepSpec) -> Result<()> {
        self.graph.declare_step(spec)
    }

    /// Declare a workflow output.
    pub fn expose(&mut self, name: impl Into<String>, source: OutputRef) {
        self.outputs.insert(name.into(), source);
    }

    /// Validate exposed outputs and freeze the graph into a plan.
    pub fn plan(&mut self) -> Result<ExecutionPlan> {
        for source in self.outputs.values() {
            let step = self.graph.get(&source.step).ok_or_else(|| {
                TrialflowError::UnresolvedReference {
                    step: self.name.clone(),
                    referenced: source.step.clone(),
                }
            })?;
            if !step.outputs.contains(&source.output) {
                return Err(TrialflowError::MissingOutput {
                    step: self.name.clone(),
                    referenced: source.step.clone(),
                    output: source.output.clone(),
                });
            }
        }

        self.graph.build()
    }
}

/// References to every output a just-added step declared.
///
/// Returned by [`Workflow::add_step`] so authoring code can wire the next
/// step without spelling the step id twice.
#[derive(Debug, Clone)]
pub struct OutputRefs {
    refs: BTreeMap<String, OutputRef>,
}

impl OutputRefs {
    fn of(spec: &StepSpec) -> Self {
        let refs = spec
            .outputs
            .iter()
            .map(|o| (o.clone(), spec.output_ref(o)))
            .collect();
        Self { refs }
    }

    pub fn get(&self, output: &str) -> Option<&OutputRef> {
        self.refs.get(output)
    }

    /// The only declared output, if exactly one exists.
    pub fn single(&self) -> Option<&OutputRef> {
        if self.refs.len() == 1 {
            self.refs.values().next()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputRef)> {
        self.refs.iter().map(|(k, v)| (k.as_str(), v))
    }
}
