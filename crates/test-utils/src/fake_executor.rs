use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use trialflow::errors::TrialflowError;
use trialflow::exec::{StepExecutor, StepFuture};
use trialflow::graph::{OutputHandle, ResolvedInputs, StepOutputs, StepSpec};

/// A fake executor that:
/// - records which steps were dispatched, and with which inputs
/// - fails the steps listed in `failing`
/// - omits every output of the steps listed in `silent`
/// - otherwise publishes `mem://<step>/<output>` for each declared output.
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<(String, ResolvedInputs)>>>,
    failing: HashSet<String>,
    silent: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<(String, ResolvedInputs)>>>) -> Self {
        Self {
            executed,
            failing: HashSet::new(),
            silent: HashSet::new(),
        }
    }

    pub fn failing(mut self, step: &str) -> Self {
        self.failing.insert(step.to_string());
        self
    }

    pub fn silent(mut self, step: &str) -> Self {
        self.silent.insert(step.to_string());
        self
    }

    pub fn handle(step: &str, output: &str) -> OutputHandle {
        OutputHandle::new(format!("mem://{step}/{output}"))
    }
}

impl StepExecutor for FakeExecutor {
    fn run_step(&mut self, step: &StepSpec, inputs: ResolvedInputs) -> StepFuture<'_> {
        let id = step.id.clone();
        let fail = self.failing.contains(&id);
        let outputs: StepOutputs = if self.silent.contains(&id) {
            StepOutputs::new()
        } else {
            step.outputs
                .iter()
                .map(|o| (o.clone(), Self::handle(&id, o)))
                .collect()
        };
        let executed = Arc::clone(&self.executed);

        Box::pin(async move {
            executed.lock().unwrap().push((id.clone(), inputs));

            if fail {
                return Err(TrialflowError::StepFailed {
                    step: id,
                    reason: "exit status 1".to_string(),
                });
            }
            Ok(outputs)
        })
    }
}
