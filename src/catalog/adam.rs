// src/catalog/adam.rs

//! ADaM dataset derivation steps.

use crate::catalog::platform_metadata;
use crate::errors::{Result, TrialflowError};
use crate::graph::{OutputRef, StepSpec};
use crate::workflow::Workflow;

/// Handle to an ADaM dataset produced by an earlier step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdamDataset {
    /// Upper-case dataset name, e.g. `ADSL`.
    pub name: String,
    /// Logical file name used as the input name by consumers, e.g. `adsl`.
    pub filename: String,
    /// The step output holding the dataset file.
    pub data: OutputRef,
}

/// Description of one ADaM derivation step.
#[derive(Debug, Clone)]
pub struct AdamStep {
    pub name: String,
    pub command: String,
    pub environment: Option<String>,
    pub hardware_tier: Option<String>,
    pub sdtm_data_path: String,
    pub dependencies: Vec<AdamDataset>,
}

impl AdamStep {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        sdtm_data_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            environment: None,
            hardware_tier: None,
            sdtm_data_path: sdtm_data_path.into(),
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

/// Step id used for an ADaM derivation.
pub fn adam_step_id(name: &str) -> String {
    format!("Create {name} dataset")
}

/// Add an ADaM derivation step to `workflow` and return its dataset handle.
///
/// The step receives the SDTM root as `sdtm_data_path` plus one input per
/// upstream dataset, named after that dataset's file name.
pub fn adam_dataset(workflow: &mut Workflow, step: AdamStep) -> Result<AdamDataset> {
    let id = adam_step_id(&step.name);
    let filename = step.name.to_lowercase();

    let mut spec = StepSpec::new(id, step.command)
        .literal_input("sdtm_data_path", step.sdtm_data_path)
        .output(filename.clone());

    for dep in &step.dependencies {
        spec = spec.output_input(dep.filename.clone(), dep.data.clone());
    }
    spec.metadata = platform_metadata(step.environment, step.hardware_tier);

    let data = workflow
        .add_step(spec)?
        .get(&filename)
        .cloned()
        .ok_or_else(|| {
            TrialflowError::Config(format!("dataset '{}' declares no output", step.name))
        })?;

    Ok(AdamDataset {
        name: step.name,
        filename,
        data,
    })
}
