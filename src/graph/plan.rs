// src/graph/plan.rs

//! Frozen, dependency-ordered execution plans.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::graph::resolve::{resolve_inputs, PublishedOutputs, ResolvedInputs};
use crate::graph::step::{InputValue, StepId, StepSpec};

/// A validated sequence of steps, each placed after every step whose
/// outputs it consumes.
///
/// Cloning is cheap: all clones share the same step storage.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    inner: Arc<PlanInner>,
}

#[derive(Debug)]
struct PlanInner {
    steps: Vec<StepSpec>,
    positions: HashMap<StepId, usize>,
}

impl ExecutionPlan {
    /// Wrap steps that are already in dependency order.
    pub(crate) fn from_ordered(steps: Vec<StepSpec>) -> Self {
        let positions = steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        Self {
            inner: Arc::new(PlanInner { steps, positions }),
        }
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.inner.steps
    }

    pub fn len(&self) -> usize {
        self.inner.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.steps.is_empty()
    }

    /// Step identifiers in plan order.
    pub fn step_ids(&self) -> Vec<&str> {
        self.inner.steps.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn step(&self, id: &str) -> Option<&StepSpec> {
        self.position(id).map(|i| &self.inner.steps[i])
    }

    /// Index of a step within the plan.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.inner.positions.get(id).copied()
    }

    /// Direct upstream step ids of `id` (empty for unknown ids).
    pub fn upstream_of(&self, id: &str) -> Vec<&str> {
        self.step(id)
            .map(|s| s.upstream_steps())
            .unwrap_or_default()
    }

    /// Direct downstream step ids of `id`, in plan order.
    pub fn downstream_of(&self, id: &str) -> Vec<&str> {
        self.inner
            .steps
            .iter()
            .filter(|s| s.upstream_steps().contains(&id))
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Group steps into dispatch levels.
    ///
    /// Every step in level `n` depends only on steps in levels `< n`, so the
    /// steps of one level may be dispatched concurrently. Within a level,
    /// plan order is kept.
    pub fn levels(&self) -> Vec<Vec<&str>> {
        let mut depth: Vec<usize> = Vec::with_capacity(self.len());
        let mut levels: Vec<Vec<&str>> = Vec::new();

        for step in &self.inner.steps {
            let d = step
                .upstream_steps()
                .iter()
                .filter_map(|u| self.position(u))
                .map(|i| depth[i] + 1)
                .max()
                .unwrap_or(0);
            depth.push(d);

            if levels.len() <= d {
                levels.resize_with(d + 1, Vec::new);
            }
            levels[d].push(step.id.as_str());
        }

        levels
    }

    /// Resolve a step's inputs against the outputs published so far.
    pub fn resolve_inputs(
        &self,
        step: &StepSpec,
        outputs_so_far: &PublishedOutputs,
    ) -> Result<ResolvedInputs> {
        resolve_inputs(step, outputs_so_far)
    }

    /// Hex blake3 digest over the ordered steps.
    ///
    /// Equal for two plans with the same steps in the same order, and
    /// different as soon as any command, input, output or metadata value
    /// differs. Every string is length-prefixed and every collection is
    /// count-prefixed, so no two distinct plans share an encoding.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        count(&mut hasher, self.inner.steps.len());

        for step in &self.inner.steps {
            text(&mut hasher, &step.id);
            text(&mut hasher, &step.command);

            count(&mut hasher, step.inputs.len());
            for (name, value) in &step.inputs {
                text(&mut hasher, name);
                match value {
                    InputValue::Literal(s) => {
                        hasher.update(&[0]);
                        text(&mut hasher, s);
                    }
                    InputValue::Output(r) => {
                        hasher.update(&[1]);
                        text(&mut hasher, &r.step);
                        text(&mut hasher, &r.output);
                    }
                }
            }

            count(&mut hasher, step.outputs.len());
            for output in &step.outputs {
                text(&mut hasher, output);
            }

            count(&mut hasher, step.metadata.len());
            for (k, v) in &step.metadata {
                text(&mut hasher, k);
                text(&mut hasher, v);
            }
        }

        hasher.finalize().to_hex().to_string()
    }
}

fn count(hasher: &mut blake3::Hasher, n: usize) {
    hasher.update(&(n as u64).to_le_bytes());
}

fn text(hasher: &mut blake3::Hasher, value: &str) {
    count(hasher, value.len());
    hasher.update(value.as_bytes());
}
