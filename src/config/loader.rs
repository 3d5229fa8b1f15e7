// src/config/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawWorkflowFile, WorkflowFile};
use crate::errors::Result;

/// Load a workflow file from a given path and return the raw `RawWorkflowFile`.
///
/// This only performs TOML deserialization; it does **not** check step
/// references or build a plan. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Parse workflow TOML from a string.
pub fn parse_str(contents: &str) -> Result<RawWorkflowFile> {
    let raw: RawWorkflowFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a workflow file, apply parameter overrides, and freeze it into a
/// plan.
///
/// Every graph error (duplicate steps, unknown references, missing
/// outputs, cycles) surfaces here, before anything is dispatched.
pub fn load_and_validate(
    path: impl AsRef<Path>,
    param_overrides: &BTreeMap<String, String>,
) -> Result<WorkflowFile> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    raw.apply_param_overrides(param_overrides)?;

    let file = WorkflowFile::try_from(raw)?;
    debug!(
        path = %path.display(),
        workflow = %file.workflow.name(),
        steps = file.plan.len(),
        "workflow file loaded"
    );
    Ok(file)
}

/// Default workflow file location: `Trialflow.toml` in the current working
/// directory.
pub fn default_workflow_path() -> PathBuf {
    PathBuf::from("Trialflow.toml")
}
