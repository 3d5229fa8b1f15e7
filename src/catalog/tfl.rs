// src/catalog/tfl.rs

//! TFL (tables, figures, listings) report steps.

use crate::catalog::adam::AdamDataset;
use crate::catalog::platform_metadata;
use crate::errors::{Result, TrialflowError};
use crate::graph::{OutputRef, StepSpec};
use crate::workflow::Workflow;

/// Output name every report step declares.
pub const REPORT_OUTPUT: &str = "report";

#[derive(Debug, Clone)]
pub struct TflStep {
    pub name: String,
    pub command: String,
    pub environment: Option<String>,
    pub hardware_tier: Option<String>,
    pub dependencies: Vec<AdamDataset>,
}

impl TflStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            environment: None,
            hardware_tier: None,
            dependencies: Vec::new(),
        }
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn hardware_tier(mut self, tier: impl Into<String>) -> Self {
        self.hardware_tier = Some(tier.into());
        self
    }

    pub fn depends_on(mut self, dataset: &AdamDataset) -> Self {
        self.dependencies.push(dataset.clone());
        self
    }
}

pub fn tfl_step_id(name: &str) -> String {
    format!("Create {name} report")
}

/// Add a report step to `workflow` and return a reference to its PDF.
pub fn tfl_report(workflow: &mut Workflow, step: TflStep) -> Result<OutputRef> {
    let mut spec = StepSpec::new(tfl_step_id(&step.name), step.command).output(REPORT_OUTPUT);

    for dep in &step.dependencies {
        spec = spec.output_input(dep.filename.clone(), dep.data.clone());
    }
    spec.metadata = platform_metadata(step.environment, step.hardware_tier);

    let name = step.name;
    workflow
        .add_step(spec)?
        .single()
        .cloned()
        .ok_or_else(|| TrialflowError::Config(format!("report '{name}' declares no output")))
}
