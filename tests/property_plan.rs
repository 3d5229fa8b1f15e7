// tests/property_plan.rs

mod common;
use crate::common::builders::dep_step;

use std::collections::BTreeSet;

use proptest::prelude::*;
use trialflow::errors::TrialflowError;
use trialflow::graph::{Graph, StepSpec};

// Strategy to generate an acyclic step list.
// Acyclicity holds because step N may only depend on steps 0..N-1.
fn dag_strategy(max_steps: usize) -> impl Strategy<Value = Vec<StepSpec>> {
    (1..=max_steps).prop_flat_map(|num_steps| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_steps),
            num_steps,
        );

        deps_strat.prop_map(move |raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let deps: BTreeSet<String> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|d| format!("s{}", d % i)).collect()
                    };
                    let deps: Vec<&str> = deps.iter().map(|s| s.as_str()).collect();
                    dep_step(&format!("s{i}"), &deps)
                })
                .collect()
        })
    })
}

fn build_declared(steps: &[StepSpec]) -> Result<Vec<String>, TrialflowError> {
    let mut graph = Graph::new();
    for spec in steps {
        graph.declare_step(spec.clone())?;
    }
    let plan = graph.build()?;
    Ok(plan.step_ids().into_iter().map(str::to_string).collect())
}

proptest! {
    #[test]
    fn every_step_follows_its_dependencies(steps in dag_strategy(12)) {
        let mut graph = Graph::new();
        for spec in &steps {
            graph.add_step(spec.clone()).unwrap();
        }
        let plan = graph.build().unwrap();
        prop_assert_eq!(plan.len(), steps.len());

        for step in plan.steps() {
            let at = plan.position(&step.id).unwrap();
            for upstream in step.upstream_steps() {
                let up = plan.position(upstream).unwrap();
                prop_assert!(up < at, "{} placed before its dependency {}", step.id, upstream);
            }
        }
    }

    #[test]
    fn reversed_declaration_still_yields_valid_order(steps in dag_strategy(12)) {
        let reversed: Vec<StepSpec> = steps.iter().rev().cloned().collect();
        let order = build_declared(&reversed).unwrap();

        for spec in &steps {
            let at = order.iter().position(|s| *s == spec.id).unwrap();
            for upstream in spec.upstream_steps() {
                let up = order.iter().position(|s| s == upstream).unwrap();
                prop_assert!(up < at);
            }
        }
    }

    #[test]
    fn same_insertion_order_gives_identical_plans(steps in dag_strategy(12)) {
        let reversed: Vec<StepSpec> = steps.iter().rev().cloned().collect();
        prop_assert_eq!(build_declared(&reversed).unwrap(), build_declared(&reversed).unwrap());
        prop_assert_eq!(build_declared(&steps).unwrap(), build_declared(&steps).unwrap());
    }

    #[test]
    fn re_adding_any_identifier_is_a_duplicate(
        steps in dag_strategy(12),
        pick in any::<usize>(),
    ) {
        let mut graph = Graph::new();
        for spec in &steps {
            graph.add_step(spec.clone()).unwrap();
        }
        let victim = steps[pick % steps.len()].id.clone();

        let is_duplicate = matches!(
            graph.add_step(dep_step(&victim, &[])),
            Err(TrialflowError::DuplicateStep { .. })
        );
        prop_assert!(is_duplicate);
        prop_assert_eq!(graph.len(), steps.len());
    }

    #[test]
    fn ring_of_any_length_is_a_cycle(len in 2usize..10) {
        let mut graph = Graph::new();
        for i in 0..len {
            let prev = format!("r{}", (i + len - 1) % len);
            graph.declare_step(dep_step(&format!("r{i}"), &[prev.as_str()])).unwrap();
        }

        match graph.build() {
            Err(TrialflowError::CycleDetected { steps }) => prop_assert_eq!(steps.len(), len),
            other => prop_assert!(false, "expected CycleDetected, got {:?}", other),
        }
        prop_assert!(graph.plan().is_none());
    }
}
