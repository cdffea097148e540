//! Dependency ordering of one node's member assignments.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::warn;
use weaver_core::{Error, MemberAssignment, Result, TypeId};

/// Indices of `assignments` in an order where every assignment comes after
/// the assignments its member depends on. Ties keep document order.
pub fn dependency_order(owner: &TypeId, assignments: &[MemberAssignment]) -> Result<Vec<usize>> {
    let mut graph = DiGraphMap::<usize, ()>::with_capacity(assignments.len(), 0);

    for index in 0..assignments.len() {
        graph.add_node(index);
    }

    // Edges run from prerequisite to dependent
    for (index, assignment) in assignments.iter().enumerate() {
        for dependency in assignment.member.dependencies() {
            for (prerequisite, candidate) in assignments.iter().enumerate() {
                if candidate.member.name() == dependency.as_str() {
                    graph.add_edge(prerequisite, index, ());
                }
            }
        }
    }

    if let Some(cycle) = tarjan_scc(&graph)
        .into_iter()
        .find(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    {
        let mut indices = cycle;
        indices.sort_unstable();
        let members: Vec<String> = indices
            .into_iter()
            .map(|i| assignments[i].member.name().to_string())
            .collect();
        warn!(owner = %owner, members = ?members, "dependency cycle");
        return Err(Error::DependencyCycle {
            owner: owner.to_string(),
            members,
        });
    }

    let mut in_degree: Vec<usize> = (0..assignments.len())
        .map(|i| graph.neighbors_directed(i, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(assignments.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for dependent in graph.neighbors_directed(index, Direction::Outgoing) {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }
    Ok(order)
}

/// The assignments of one node, reordered by [`dependency_order`].
pub fn sort_assignments<'a>(
    owner: &TypeId,
    assignments: &'a [MemberAssignment],
) -> Result<Vec<&'a MemberAssignment>> {
    Ok(dependency_order(owner, assignments)?
        .into_iter()
        .map(|i| &assignments[i])
        .collect())
}
