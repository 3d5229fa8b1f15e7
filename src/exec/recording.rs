// src/exec/recording.rs

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::errors::Result;
use crate::graph::{OutputHandle, ResolvedInputs, StepOutputs, StepSpec};

use super::backend::{StepExecutor, StepFuture};

/// One dispatch seen by a [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub step: String,
    pub command: String,
    pub inputs: ResolvedInputs,
}

/// Executor that performs no work.
///
/// Each dispatch is logged and recorded, and every declared output is
/// "materialized" as the handle `<staging>/<step-slug>-<digest>/<output>`.
/// This is what the CLI uses to walk a plan without a compute platform.
#[derive(Debug, Clone)]
pub struct RecordingExecutor {
    staging: String,
    dispatched: Arc<Mutex<Vec<Dispatch>>>,
}

impl RecordingExecutor {
    pub fn new(staging: impl Into<String>) -> Self {
        Self {
            staging: staging.into().trim_end_matches('/').to_string(),
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the dispatch log; stays valid after the executor is
    /// moved into a runner.
    pub fn log(&self) -> Arc<Mutex<Vec<Dispatch>>> {
        Arc::clone(&self.dispatched)
    }

    /// Handle a step output would be materialized at.
    ///
    /// The directory is `<slug>-<digest>`, where the digest is taken over the
    /// raw step id, so two ids that slug alike still get distinct handles.
    pub fn handle_for(&self, step: &str, output: &str) -> OutputHandle {
        OutputHandle::new(format!(
            "{}/{}/{}",
            self.staging,
            step_dir(step),
            output
        ))
    }
}

impl StepExecutor for RecordingExecutor {
    fn run_step(&mut self, step: &StepSpec, inputs: ResolvedInputs) -> StepFuture<'_> {
        let outputs: StepOutputs = step
            .outputs
            .iter()
            .map(|o| (o.clone(), self.handle_for(&step.id, o)))
            .collect();

        info!(
            step = %step.id,
            command = %step.command,
            metadata = ?step.metadata,
            "dispatching step"
        );

        let record = Dispatch {
            step: step.id.clone(),
            command: step.command.clone(),
            inputs,
        };
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            dispatched
                .lock()
                .map_err(|e| anyhow::anyhow!("dispatch log poisoned: {e}"))?
                .push(record);
            Result::Ok(outputs)
        })
    }
}

/// Number of hex digits of the step id digest kept in a directory name.
const DIGEST_LEN: usize = 16;

fn step_dir(step: &str) -> String {
    let digest = blake3::hash(step.as_bytes()).to_hex();
    let short = &digest.as_str()[..DIGEST_LEN];

    match slug(step) {
        s if s.is_empty() => short.to_string(),
        s => format!("{s}-{short}"),
    }
}

/// Lower-case a step id and replace anything outside `[a-z0-9]` with `-`.
fn slug(step: &str) -> String {
    let mut out = String::with_capacity(step.len());
    let mut last_dash = false;

    for c in step.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }

    out.trim_end_matches('-').to_string()
}
