// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::config::model::{InputConfig, RawWorkflowFile, StepConfig, WorkflowFile};
use crate::errors::{Result, TrialflowError};
use crate::graph::{InputValue, OutputRef, StepSpec};
use crate::workflow::Workflow;

impl TryFrom<RawWorkflowFile> for WorkflowFile {
    type Error = crate::errors::TrialflowError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_file(&raw)?;
        let mut workflow = workflow_from_raw(raw)?;
        let plan = workflow.plan()?;
        Ok(WorkflowFile { workflow, plan })
    }
}

impl RawWorkflowFile {
    /// Override `[params]` values (e.g. from `--param` on the command line).
    ///
    /// An override may name a parameter the file declares in `[params]`, or
    /// one that only appears as a `{ param = ".." }` step input. The latter
    /// is a required parameter without a default, and the override supplies
    /// it.
    pub fn apply_param_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<()> {
        let referenced = self.referenced_params();

        for name in overrides.keys() {
            if !self.params.contains_key(name) && !referenced.contains(name.as_str()) {
                let mut known: Vec<&str> = self.params.keys().map(String::as_str).collect();
                known.extend(referenced.iter().copied());
                known.sort_unstable();
                known.dedup();
                return Err(TrialflowError::Config(format!(
                    "unknown parameter '{}' (known: {})",
                    name,
                    known.join(", ")
                )));
            }
        }

        for (name, value) in overrides {
            self.params.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    /// Names of parameters referenced by any step input.
    fn referenced_params(&self) -> BTreeSet<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.inputs.values())
            .filter_map(|input| match input {
                InputConfig::Param { param } => Some(param.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn validate_raw_file(raw: &RawWorkflowFile) -> Result<()> {
    ensure_has_name(raw)?;
    ensure_has_steps(raw)?;
    validate_step_outputs(raw)?;
    Ok(())
}

fn ensure_has_name(raw: &RawWorkflowFile) -> Result<()> {
    if raw.workflow.name.trim().is_empty() {
        return Err(TrialflowError::Config(
            "[workflow].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_steps(raw: &RawWorkflowFile) -> Result<()> {
    if raw.steps.is_empty() {
        return Err(TrialflowError::Config(
            "workflow must contain at least one [[step]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_step_outputs(raw: &RawWorkflowFile) -> Result<()> {
    for step in &raw.steps {
        let mut seen = BTreeSet::new();
        for output in &step.outputs {
            if !seen.insert(output.as_str()) {
                return Err(TrialflowError::Config(format!(
                    "step '{}' declares output '{}' more than once",
                    step.name, output
                )));
            }
        }
    }
    Ok(())
}

fn workflow_from_raw(raw: RawWorkflowFile) -> Result<Workflow> {
    let mut workflow =
        Workflow::new(raw.workflow.name.clone()).with_failure_policy(raw.workflow.failure_policy);
    for (name, value) in &raw.params {
        workflow = workflow.with_param(name.clone(), value.clone());
    }

    for step in &raw.steps {
        let spec = step_spec(step, &raw.params, &raw.defaults.metadata)?;
        // File order is free, so references are checked at plan time.
        workflow.declare_step(spec)?;
    }

    for (name, source) in raw.outputs {
        workflow.expose(name, OutputRef::new(source.step, source.output));
    }

    Ok(workflow)
}

fn step_spec(
    step: &StepConfig,
    params: &BTreeMap<String, String>,
    default_metadata: &BTreeMap<String, String>,
) -> Result<StepSpec> {
    let mut spec = StepSpec::new(step.name.clone(), step.command.clone());

    for (name, input) in &step.inputs {
        let value = match input {
            InputConfig::Literal(value) | InputConfig::Value { value } => {
                InputValue::Literal(value.clone())
            }
            InputConfig::Param { param } => {
                let value = params.get(param).ok_or_else(|| {
                    TrialflowError::Config(format!(
                        "step '{}' input '{}' references undeclared parameter '{}'",
                        step.name, name, param
                    ))
                })?;
                InputValue::Literal(value.clone())
            }
            InputConfig::Output { step, output } => {
                InputValue::Output(OutputRef::new(step.clone(), output.clone()))
            }
        };
        spec.inputs.insert(name.clone(), value);
    }

    spec.outputs = step.outputs.iter().cloned().collect();

    spec.metadata = default_metadata.clone();
    spec.metadata
        .extend(step.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));

    Ok(spec)
}
