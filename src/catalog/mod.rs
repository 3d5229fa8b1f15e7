// src/catalog/mod.rs

//! Built-in clinical trial workflows.
//!
//! - [`adam`] adds ADaM dataset derivation steps.
//! - [`tfl`] adds TFL report steps that consume ADaM datasets.
//! - [`workflows`] holds the factory functions for the shipped workflows.
//!
//! Every factory returns a fresh [`Workflow`]; nothing is registered
//! globally. [`builtin`] looks a factory up by name for the CLI.

use std::collections::BTreeMap;

pub mod adam;
pub mod tfl;
pub mod workflows;

pub use adam::{adam_dataset, AdamDataset, AdamStep};
pub use tfl::{tfl_report, TflStep, REPORT_OUTPUT};

use crate::errors::{Result, TrialflowError};
use crate::workflow::Workflow;

/// Metadata key for the compute environment name.
pub const ENVIRONMENT: &str = "environment";
/// Metadata key for the hardware tier name.
pub const HARDWARE_TIER: &str = "hardware_tier";

pub const SAS_ENVIRONMENT: &str = "SAS Analytics Pro";
pub const R_PY_ENVIRONMENT: &str = "GxP Validated R & Py";

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: &[&str] = &["sdtm", "sce", "adam_tfl", "full", "analysis", "r_plot"];

/// Build the metadata map for a step, omitting unset values so the
/// platform's project defaults apply.
pub(crate) fn platform_metadata(
    environment: Option<String>,
    hardware_tier: Option<String>,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    if let Some(env) = environment {
        metadata.insert(ENVIRONMENT.to_string(), env);
    }
    if let Some(tier) = hardware_tier {
        metadata.insert(HARDWARE_TIER.to_string(), tier);
    }
    metadata
}

/// Construct a built-in workflow by name.
pub fn builtin(name: &str, sdtm_data_path: &str) -> Result<Workflow> {
    match name {
        "sdtm" => workflows::sdtm_workflow(sdtm_data_path),
        "sce" => workflows::sce_workflow(sdtm_data_path),
        "adam_tfl" => workflows::adam_tfl_workflow(sdtm_data_path),
        "full" => workflows::full_workflow(sdtm_data_path),
        "analysis" => workflows::analysis_workflow(sdtm_data_path),
        "r_plot" => workflows::r_plot_workflow(sdtm_data_path),
        other => Err(TrialflowError::Config(format!(
            "unknown built-in workflow '{other}' (expected one of: {})",
            BUILTIN_NAMES.join(", ")
        ))),
    }
}
