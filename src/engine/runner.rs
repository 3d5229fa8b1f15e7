// src/engine/runner.rs

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::engine::state::StateTracker;
use crate::engine::RunReport;
use crate::errors::{Result, TrialflowError};
use crate::exec::StepExecutor;
use crate::graph::{
    resolve_inputs, ExecutionPlan, OutputRef, PublishedOutputs, StepOutputs, StepSpec,
};
use crate::types::FailurePolicy;
use crate::workflow::Workflow;

/// Drives an [`ExecutionPlan`] through a [`StepExecutor`].
///
/// Steps are dispatched one at a time in plan order, so a step is never
/// dispatched before every step producing its inputs has published.
pub struct Runner<E: StepExecutor> {
    plan: ExecutionPlan,
    policy: FailurePolicy,
    workflow_outputs: BTreeMap<String, OutputRef>,
    executor: E,
}

impl<E: StepExecutor> fmt::Debug for Runner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("steps", &self.plan.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<E: StepExecutor> Runner<E> {
    pub fn new(plan: ExecutionPlan, policy: FailurePolicy, executor: E) -> Self {
        Self {
            plan,
            policy,
            workflow_outputs: BTreeMap::new(),
            executor,
        }
    }

    /// Plan `workflow` (freezing it) and take over its policy and outputs.
    pub fn for_workflow(workflow: &mut Workflow, executor: E) -> Result<Self> {
        let plan = workflow.plan()?;
        Ok(Self {
            plan,
            policy: workflow.failure_policy(),
            workflow_outputs: workflow.outputs().clone(),
            executor,
        })
    }

    /// Run every step and report the outcome.
    ///
    /// Step failures are recorded in the report rather than returned as
    /// errors; use [`RunReport::into_result`] to fail on them.
    pub async fn run(mut self) -> Result<RunReport> {
        info!(steps = self.plan.len(), policy = ?self.policy, "run started");

        let plan = self.plan.clone();
        let mut tracker = StateTracker::new(plan.clone());
        let mut published = PublishedOutputs::new();

        for step in plan.steps() {
            if !tracker.is_pending(&step.id) {
                continue;
            }

            match self.dispatch(step, &published).await {
                Ok(outputs) => {
                    debug!(step = %step.id, outputs = outputs.len(), "step succeeded");
                    published.insert(step.id.clone(), outputs);
                    tracker.mark_succeeded(&step.id);
                }
                Err(err) => {
                    warn!(step = %step.id, error = %err, "step failed");
                    let skipped = tracker.mark_failed(&step.id, err.to_string());
                    if !skipped.is_empty() {
                        debug!(step = %step.id, ?skipped, "dependents skipped");
                    }

                    if self.policy == FailurePolicy::FailImmediately {
                        let rest = tracker.skip_all_pending();
                        info!(skipped = rest.len(), "failing immediately; remaining steps skipped");
                        break;
                    }
                }
            }
        }

        let workflow_outputs = self
            .workflow_outputs
            .iter()
            .filter_map(|(name, source)| {
                published
                    .get(&source.step)
                    .and_then(|o| o.get(&source.output))
                    .map(|h| (name.clone(), h.clone()))
            })
            .collect();

        let report = RunReport {
            steps: tracker.into_states(),
            outputs: published,
            workflow_outputs,
        };

        if report.is_success() {
            info!("run finished successfully");
        } else {
            warn!(failed = ?report.failed(), skipped = ?report.skipped(), "run finished with failures");
        }

        Ok(report)
    }

    async fn dispatch(
        &mut self,
        step: &StepSpec,
        published: &PublishedOutputs,
    ) -> Result<StepOutputs> {
        let inputs = resolve_inputs(step, published)?;
        let outputs = self.executor.run_step(step, inputs).await?;

        if let Some(missing) = step.outputs.iter().find(|o| !outputs.contains_key(*o)) {
            return Err(TrialflowError::MissingOutput {
                step: step.id.clone(),
                referenced: step.id.clone(),
                output: missing.clone(),
            });
        }

        Ok(outputs)
    }
}
