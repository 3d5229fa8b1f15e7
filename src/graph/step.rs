// src/graph/step.rs

//! Step descriptors and the values flowing between steps.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Canonical step identifier type used throughout the crate.
pub type StepId = String;

/// Reference to one named output of one step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputRef {
    pub step: StepId,
    pub output: String,
}

impl OutputRef {
    pub fn new(step: impl Into<StepId>, output: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            output: output.into(),
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.step, self.output)
    }
}

/// Declared value of a step input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    /// A value known at authoring time (e.g. the SDTM data path).
    Literal(String),
    /// An output published by an upstream step.
    Output(OutputRef),
}

impl InputValue {
    /// The upstream reference, if this input is one.
    pub fn as_output(&self) -> Option<&OutputRef> {
        match self {
            InputValue::Output(r) => Some(r),
            InputValue::Literal(_) => None,
        }
    }
}

impl From<OutputRef> for InputValue {
    fn from(r: OutputRef) -> Self {
        InputValue::Output(r)
    }
}

/// Immutable descriptor of one unit of external work.
///
/// The command and metadata are passed through to the executor untouched;
/// the graph only looks at identifiers, input references and output names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSpec {
    pub id: StepId,
    pub command: String,
    pub inputs: BTreeMap<String, InputValue>,
    pub outputs: BTreeSet<String>,
    pub metadata: BTreeMap<String, String>,
}

impl StepSpec {
    pub fn new(id: impl Into<StepId>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            inputs: BTreeMap::new(),
            outputs: BTreeSet::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn literal_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs
            .insert(name.into(), InputValue::Literal(value.into()));
        self
    }

    pub fn output_input(mut self, name: impl Into<String>, source: OutputRef) -> Self {
        self.inputs.insert(name.into(), InputValue::Output(source));
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.insert(name.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reference to one of this step's outputs (declared or not).
    pub fn output_ref(&self, output: &str) -> OutputRef {
        OutputRef::new(self.id.clone(), output)
    }

    /// All upstream output references, in input-name order.
    pub fn references(&self) -> impl Iterator<Item = (&str, &OutputRef)> {
        self.inputs
            .iter()
            .filter_map(|(name, v)| v.as_output().map(|r| (name.as_str(), r)))
    }

    /// Distinct upstream step ids, in first-reference order.
    pub fn upstream_steps(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (_, r) in self.references() {
            if !seen.contains(&r.step.as_str()) {
                seen.push(r.step.as_str());
            }
        }
        seen
    }
}
