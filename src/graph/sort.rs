// src/graph/sort.rs

//! Insertion-stable topological ordering.
//!
//! Kahn's algorithm over a petgraph `DiGraph` whose node weights are the
//! steps' insertion indices. The ready set is a `BTreeSet` of those indices,
//! so whenever several steps are ready at once the one added first wins.
//! Identifier strings never influence the order.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors::{Result, TrialflowError};
use crate::graph::step::{StepId, StepSpec};

/// Return insertion indices of `steps` in dependency order.
///
/// Assumes every reference has already been checked against `index`;
/// unknown upstream ids are ignored here.
pub(crate) fn insertion_stable_order(
    steps: &[StepSpec],
    index: &HashMap<StepId, usize>,
) -> Result<Vec<usize>> {
    // Edge direction: upstream -> dependent.
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(steps.len(), steps.len());
    let nodes: Vec<NodeIndex> = (0..steps.len()).map(|i| graph.add_node(i)).collect();

    for (i, step) in steps.iter().enumerate() {
        for upstream in step.upstream_steps() {
            if let Some(&u) = index.get(upstream) {
                graph.update_edge(nodes[u], nodes[i], ());
            }
        }
    }

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(steps.len());

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
            let j = graph[next];
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                ready.insert(j);
            }
        }
    }

    if order.len() < steps.len() {
        return Err(TrialflowError::CycleDetected {
            steps: cycle_members(&graph, steps),
        });
    }

    Ok(order)
}

/// Steps of the first strongly connected component that forms a cycle,
/// listed in insertion order.
fn cycle_members(graph: &DiGraph<usize, ()>, steps: &[StepSpec]) -> Vec<StepId> {
    let component = tarjan_scc(graph).into_iter().find(|scc| {
        scc.len() > 1 || (scc.len() == 1 && graph.contains_edge(scc[0], scc[0]))
    });

    let mut members: Vec<usize> = component
        .unwrap_or_default()
        .into_iter()
        .map(|n| graph[n])
        .collect();
    members.sort_unstable();

    members.into_iter().map(|i| steps[i].id.clone()).collect()
}
