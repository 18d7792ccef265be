//! Topological ordering for the artifact dependency table.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;

/// Sort `nodes` so every edge `(from, to)` has `from` first, using Kahn's
/// algorithm. Ties are broken by `Ord` so the order is stable.
///
/// On failure the error holds a path that closes a cycle.
pub fn sort<N>(nodes: &[N], edges: &[(N, N)]) -> Result<Vec<N>, Vec<N>>
where
    N: Copy + Ord + Debug,
{
    let mut indegree: BTreeMap<N, usize> = BTreeMap::new();
    let mut adjacency: BTreeMap<N, Vec<N>> = BTreeMap::new();

    for node in nodes {
        indegree.entry(*node).or_insert(0);
        adjacency.entry(*node).or_default();
    }

    for (from, to) in edges {
        adjacency.entry(*from).or_default().push(*to);
        indegree.entry(*from).or_insert(0);
        *indegree.entry(*to).or_insert(0) += 1;
    }

    for neighbours in adjacency.values_mut() {
        neighbours.sort();
    }

    let mut queue: VecDeque<N> = indegree
        .iter()
        .filter_map(|(node, &count)| (count == 0).then_some(*node))
        .collect();
    let mut order = Vec::with_capacity(indegree.len());

    while let Some(node) = queue.pop_front() {
        order.push(node);
        if let Some(neighbours) = adjacency.get(&node) {
            for neighbour in neighbours {
                if let Some(count) = indegree.get_mut(neighbour) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(*neighbour);
                    }
                }
            }
        }
    }

    if order.len() == indegree.len() {
        return Ok(order);
    }

    Err(find_cycle(&adjacency).unwrap_or_default())
}

fn find_cycle<N>(adjacency: &BTreeMap<N, Vec<N>>) -> Option<Vec<N>>
where
    N: Copy + Ord,
{
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum VisitState {
        Unvisited,
        Visiting,
        Visited,
    }

    fn dfs<N: Copy + Ord>(
        node: N,
        adjacency: &BTreeMap<N, Vec<N>>,
        state: &mut BTreeMap<N, VisitState>,
        stack: &mut Vec<N>,
    ) -> Option<Vec<N>> {
        state.insert(node, VisitState::Visiting);
        stack.push(node);

        if let Some(neighbours) = adjacency.get(&node) {
            for neighbour in neighbours {
                match state
                    .get(neighbour)
                    .copied()
                    .unwrap_or(VisitState::Unvisited)
                {
                    VisitState::Unvisited => {
                        if let Some(cycle) = dfs(*neighbour, adjacency, state, stack) {
                            return Some(cycle);
                        }
                    }
                    VisitState::Visiting => {
                        if let Some(position) = stack.iter().position(|n| n == neighbour) {
                            let mut cycle = stack[position..].to_vec();
                            cycle.push(*neighbour);
                            return Some(cycle);
                        }
                    }
                    VisitState::Visited => {}
                }
            }
        }

        stack.pop();
        state.insert(node, VisitState::Visited);
        None
    }

    let mut state: BTreeMap<N, VisitState> = BTreeMap::new();
    for node in adjacency.keys() {
        if state.get(node).copied().unwrap_or(VisitState::Unvisited) == VisitState::Unvisited {
            let mut stack = Vec::new();
            if let Some(cycle) = dfs(*node, adjacency, &mut state, &mut stack) {
                return Some(cycle);
            }
        }
    }

    None
}
