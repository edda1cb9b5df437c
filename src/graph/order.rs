//! Dependency-first vertex order over the component condensation.

use std::collections::VecDeque;

use super::components::strongly_connected_components;

/// Order vertex indices so that every vertex follows all vertices it has
/// an edge to, unless both lie on a common cycle.
///
/// Strongly connected components are ordered with Kahn's algorithm on the
/// condensation, first-in first-out, seeded by least member. The members
/// of a component are emitted together, by index.
pub(super) fn dependencies_first(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let mut components = strongly_connected_components(adjacency, 0);
    components.sort_by_key(|members| members.first().copied().unwrap_or(usize::MAX));

    let mut component_of = vec![0; adjacency.len()];
    for (component, members) in components.iter().enumerate() {
        for &v in members {
            component_of[v] = component;
        }
    }

    let mut waiting_on = vec![0usize; components.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); components.len()];
    for (from, targets) in adjacency.iter().enumerate() {
        for &to in targets {
            let (from, to) = (component_of[from], component_of[to]);
            if from != to && !dependents[to].contains(&from) {
                dependents[to].push(from);
                waiting_on[from] += 1;
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..components.len()).filter(|&c| waiting_on[c] == 0).collect();
    let mut order = Vec::with_capacity(adjacency.len());
    while let Some(component) = ready.pop_front() {
        let members = &components[component];
        if members.len() > 1 {
            tracing::trace!("Emitting cyclic group {:?}", members);
        }
        order.extend_from_slice(members);

        for &dependent in &dependents[component] {
            waiting_on[dependent] -= 1;
            if waiting_on[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain() {
        // 0 -> 1 -> 2
        let adjacency = vec![vec![1], vec![2], vec![]];
        assert_eq!(dependencies_first(&adjacency), vec![2, 1, 0]);
    }

    #[test]
    fn test_diamond() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let adjacency = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert_eq!(dependencies_first(&adjacency), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_independent_vertices_keep_index_order() {
        let adjacency = vec![vec![], vec![], vec![]];
        assert_eq!(dependencies_first(&adjacency), vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_members_come_out_together() {
        // 0 <-> 1, 2 -> 0
        let adjacency = vec![vec![1], vec![0], vec![0]];
        assert_eq!(dependencies_first(&adjacency), vec![0, 1, 2]);
    }

    #[test]
    fn test_self_loop_is_broken() {
        let adjacency = vec![vec![0], vec![0]];
        assert_eq!(dependencies_first(&adjacency), vec![0, 1]);
    }

    #[test]
    fn test_vertices_waiting_on_a_cycle_stay_ordered() {
        // 0 -> 1, 1 -> 2, 2 <-> 3
        let adjacency = vec![vec![1], vec![2], vec![3], vec![2]];
        assert_eq!(dependencies_first(&adjacency), vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_cycle_importing_a_vertex_comes_after_it() {
        // 0 <-> 1, 1 -> 2
        let adjacency = vec![vec![1], vec![0, 2], vec![]];
        assert_eq!(dependencies_first(&adjacency), vec![2, 0, 1]);
    }
}
