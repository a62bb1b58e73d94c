//! Pure DAG algorithms for the workflow graph
//!
//! A valid workflow is a DAG: no cycles, guaranteed termination.
//! `would_create_cycle` guards edge insertion; `execution_order`
//! (Kahn's algorithm) produces a linear ordering where every node runs
//! after all of its dependencies.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::GraphError;
use crate::graph::types::{Edge, Node};

/// Returns true if adding `source -> target` to `edges` would close a
/// directed cycle.
///
/// A self-loop is always a cycle. Otherwise the proposed edge closes a
/// cycle exactly when `source` is already reachable from `target`, so a
/// depth-first traversal from `target` over the existing edges decides
/// the answer. The visited set guarantees termination and O(V+E) cost;
/// the result is a pure function of the edge set and the endpoints.
pub fn would_create_cycle(edges: &[Edge], source: &str, target: &str) -> bool {
    if source == target {
        return true;
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![target];

    while let Some(current) = stack.pop() {
        if current == source {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = adjacency.get(current) {
            stack.extend(next.iter().copied());
        }
    }

    false
}

/// Compute the execution order via Kahn's algorithm.
///
/// The queue is seeded in node order, so the result is deterministic for
/// a given snapshot. Edges whose endpoints are not in `nodes` are
/// ignored, matching how a persisted canvas is interpreted.
pub fn execution_order(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>, GraphError> {
    let node_ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let known: HashSet<&str> = node_ids.iter().copied().collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = node_ids.iter().map(|id| (*id, 0)).collect();

    for edge in edges {
        let (source, target) = (edge.source.as_str(), edge.target.as_str());
        if known.contains(source) && known.contains(target) {
            adjacency.entry(source).or_default().push(target);
            *in_degree.entry(target).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .copied()
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(node_ids.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());

        if let Some(next) = adjacency.get(id) {
            for neighbor in next {
                if let Some(degree) = in_degree.get_mut(neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    if order.len() != node_ids.len() {
        let processed: HashSet<&str> = order.iter().map(String::as_str).collect();
        let mut cycle_nodes: Vec<String> = node_ids
            .iter()
            .filter(|id| !processed.contains(**id))
            .map(|id| id.to_string())
            .collect();
        cycle_nodes.sort();
        return Err(GraphError::CycleDetected(cycle_nodes));
    }

    Ok(order)
}

/// IDs of all nodes with an edge into `node_id`.
pub fn dependencies_of<'a>(node_id: &str, edges: &'a [Edge]) -> Vec<&'a str> {
    edges
        .iter()
        .filter(|edge| edge.target == node_id)
        .map(|edge| edge.source.as_str())
        .collect()
}
