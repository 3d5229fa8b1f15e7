// src/graph/resolve.rs

//! Mapping declared step inputs to concrete values at dispatch time.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{Result, TrialflowError};
use crate::graph::step::{InputValue, StepId, StepSpec};

/// Opaque handle to a materialized output (typically a file URI).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputHandle(pub String);

impl OutputHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outputs published by a single step, keyed by output name.
pub type StepOutputs = BTreeMap<String, OutputHandle>;

/// Outputs published so far in a run, keyed by producing step.
pub type PublishedOutputs = BTreeMap<StepId, StepOutputs>;

/// A step input after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    Literal(String),
    Handle(OutputHandle),
}

impl ResolvedInput {
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedInput::Literal(s) => s,
            ResolvedInput::Handle(h) => h.as_str(),
        }
    }
}

pub type ResolvedInputs = BTreeMap<String, ResolvedInput>;

/// Resolve every declared input of `step` against `outputs_so_far`.
///
/// A producing step that has published nothing yields
/// [`TrialflowError::UnresolvedReference`]; one that published but lacks the
/// named output yields [`TrialflowError::MissingOutput`].
pub fn resolve_inputs(step: &StepSpec, outputs_so_far: &PublishedOutputs) -> Result<ResolvedInputs> {
    let mut resolved = ResolvedInputs::new();

    for (name, value) in &step.inputs {
        let value = match value {
            InputValue::Literal(s) => ResolvedInput::Literal(s.clone()),
            InputValue::Output(r) => {
                let published = outputs_so_far.get(&r.step).ok_or_else(|| {
                    TrialflowError::UnresolvedReference {
                        step: step.id.clone(),
                        referenced: r.step.clone(),
                    }
                })?;
                let handle = published.get(&r.output).ok_or_else(|| {
                    TrialflowError::MissingOutput {
                        step: step.id.clone(),
                        referenced: r.step.clone(),
                        output: r.output.clone(),
                    }
                })?;
                ResolvedInput::Handle(handle.clone())
            }
        };
        resolved.insert(name.clone(), value);
    }

    Ok(resolved)
}
