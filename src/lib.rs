// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod types;
pub mod workflow;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_workflow_path, load_and_validate};
use crate::engine::{RunReport, Runner, StepState};
use crate::errors::TrialflowError;
use crate::exec::RecordingExecutor;
use crate::graph::{ExecutionPlan, InputValue};
use crate::workflow::Workflow;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - workflow loading (file or built-in catalog)
/// - plan construction and validation
/// - either a dry-run plan listing, or a walk through the recording executor
pub async fn run(args: CliArgs) -> Result<()> {
    let (mut workflow, plan) = load_workflow(&args)?;

    if args.dry_run {
        print_plan(&workflow, &plan);
        return Ok(());
    }

    let executor = RecordingExecutor::new(args.staging_dir.clone());
    let runner = Runner::for_workflow(&mut workflow, executor)?;
    let report = runner.run().await?;

    print_report(&report);
    report.into_result()?;
    Ok(())
}

fn load_workflow(args: &CliArgs) -> Result<(Workflow, ExecutionPlan)> {
    let params = args.param_map();

    if let Some(name) = &args.builtin {
        let mut workflow = builtin_with_params(name, &params)?;
        let plan = workflow.plan()?;
        info!(workflow = %workflow.name(), steps = plan.len(), "built-in workflow planned");
        return Ok((workflow, plan));
    }

    let path = args
        .workflow
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_workflow_path);
    let file = load_and_validate(&path, &params)?;
    info!(
        workflow = %file.workflow.name(),
        steps = file.plan.len(),
        path = %path.display(),
        "workflow file planned"
    );
    Ok((file.workflow, file.plan))
}

/// Built-in workflows take exactly one parameter, `sdtm_data_path`.
fn builtin_with_params(name: &str, params: &BTreeMap<String, String>) -> Result<Workflow> {
    if let Some(unknown) = params.keys().find(|k| k.as_str() != "sdtm_data_path") {
        return Err(TrialflowError::Config(format!(
            "unknown parameter '{unknown}' for built-in workflow '{name}'"
        ))
        .into());
    }

    let sdtm = params.get("sdtm_data_path").ok_or_else(|| {
        TrialflowError::Config(format!(
            "built-in workflow '{name}' needs --param sdtm_data_path=<dir>"
        ))
    })?;

    Ok(catalog::builtin(name, sdtm)?)
}

/// Dry-run output: print the plan in dispatch order.
fn print_plan(workflow: &Workflow, plan: &ExecutionPlan) {
    println!("trialflow dry-run");
    println!("  workflow = {}", workflow.name());
    println!("  failure_policy = {:?}", workflow.failure_policy());
    for (name, value) in workflow.params() {
        println!("  param.{name} = {value}");
    }
    println!("  fingerprint = {}", plan.fingerprint());
    println!();

    println!("levels ({}):", plan.levels().len());
    for (i, level) in plan.levels().iter().enumerate() {
        println!("  {i}: {}", level.join(", "));
    }
    println!();

    println!("steps ({}):", plan.len());
    for (i, step) in plan.steps().iter().enumerate() {
        println!("  {i}. {}", step.id);
        println!("      command: {}", step.command);
        for (name, value) in &step.inputs {
            match value {
                InputValue::Literal(s) => println!("      input {name} = {s:?}"),
                InputValue::Output(r) => println!("      input {name} <- {r}"),
            }
        }
        if !step.outputs.is_empty() {
            println!(
                "      outputs: {}",
                step.outputs.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
        for (k, v) in &step.metadata {
            println!("      {k}: {v}");
        }
    }

    if !workflow.outputs().is_empty() {
        println!();
        println!("workflow outputs:");
        for (name, source) in workflow.outputs() {
            println!("  {name} <- {source}");
        }
    }

    debug!("dry-run complete (no dispatch)");
}

fn print_report(report: &RunReport) {
    println!("run summary:");
    for (step, state) in &report.steps {
        match state {
            StepState::Succeeded => println!("  ok      {step}"),
            StepState::Failed(reason) => println!("  FAILED  {step}: {reason}"),
            StepState::Skipped => println!("  skipped {step}"),
            StepState::Pending => println!("  pending {step}"),
        }
    }
    for (name, handle) in &report.workflow_outputs {
        println!("  output {name} = {handle}");
    }
}
