// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::graph::ExecutionPlan;
use crate::types::FailurePolicy;
use crate::workflow::Workflow;

/// Top-level workflow definition as read from a TOML file.
///
/// ```toml
/// [workflow]
/// name = "sce_workflow"
/// failure_policy = "fail_after_executable_nodes_complete"
///
/// [params]
/// sdtm_data_path = "/mnt/imported/data/snapshots/sdtm-blind/1"
///
/// [defaults.metadata]
/// environment = "SAS Analytics Pro"
/// hardware_tier = "Small"
///
/// [[step]]
/// name = "ADSL"
/// command = "prod/adam/adsl.sas"
/// outputs = ["adsl"]
/// inputs.sdtm_data_path = { param = "sdtm_data_path" }
///
/// [[step]]
/// name = "T_POP"
/// command = "prod/tfl/t_pop.sas"
/// outputs = ["report"]
/// inputs.adsl = { step = "ADSL", output = "adsl" }
///
/// [outputs]
/// t_pop = { step = "T_POP", output = "report" }
/// ```
///
/// Steps may appear in any order; references are checked once the whole
/// file has been read.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowFile {
    /// `[workflow]` section.
    pub workflow: WorkflowSection,

    /// Workflow parameters and their default values from `[params]`.
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Values applied to every step from `[defaults]`.
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// All steps from `[[step]]`, in file order.
    #[serde(default, rename = "step")]
    pub steps: Vec<StepConfig>,

    /// Workflow outputs from `[outputs]`.
    #[serde(default)]
    pub outputs: BTreeMap<String, OutputRefConfig>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    pub name: String,

    /// `"fail_immediately"` (default) or `"fail_after_executable_nodes_complete"`.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultsSection {
    /// Execution metadata every step starts from; a step's own `metadata`
    /// entries override these key by key.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// One `[[step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Step identifier, unique within the file.
    pub name: String,

    /// External command reference, passed through untouched.
    pub command: String,

    #[serde(default)]
    pub inputs: BTreeMap<String, InputConfig>,

    /// Names of the outputs this step publishes.
    #[serde(default)]
    pub outputs: Vec<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A step input as written in the file.
///
/// Accepted forms:
/// - `name = "literal"`
/// - `name = { value = "literal" }`
/// - `name = { param = "sdtm_data_path" }`
/// - `name = { step = "ADSL", output = "adsl" }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InputConfig {
    Literal(String),
    Value { value: String },
    Param { param: String },
    Output { step: String, output: String },
}

/// `{ step = "..", output = ".." }` inside `[outputs]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputRefConfig {
    pub step: String,
    pub output: String,
}

/// A validated workflow file: the workflow plus its frozen plan.
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    pub workflow: Workflow,
    pub plan: ExecutionPlan,
}
