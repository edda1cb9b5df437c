//! Strongly connected components over vertex indices.

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

/// Strongly connected components of the subgraph induced by the vertices
/// `>= lowest`.
///
/// Components come dependencies first: when `a -> b` crosses two
/// components, the one holding `b` is listed earlier. Members of a
/// component are sorted by index.
pub(super) fn strongly_connected_components(adjacency: &[Vec<usize>], lowest: usize) -> Vec<Vec<usize>> {
    let count = adjacency.len().saturating_sub(lowest);
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(count, 0);
    let nodes: Vec<_> = (lowest..adjacency.len()).map(|v| graph.add_node(v)).collect();

    for (from, targets) in adjacency.iter().enumerate().skip(lowest) {
        for &to in targets {
            if to >= lowest {
                graph.add_edge(nodes[from - lowest], nodes[to - lowest], ());
            }
        }
    }

    // tarjan_scc yields components in reverse topological order
    tarjan_scc(&graph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<usize> = component.into_iter().map(|node| graph[node]).collect();
            members.sort_unstable();
            members
        })
        .collect()
}

/// A component lies on a cycle if it has several vertices or a self-loop.
pub(super) fn is_cyclic(adjacency: &[Vec<usize>], component: &[usize]) -> bool {
    match component {
        [single] => adjacency[*single].contains(single),
        _ => component.len() > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(components: &[Vec<usize>], v: usize) -> usize {
        components.iter().position(|c| c.contains(&v)).unwrap()
    }

    #[test]
    fn test_components_come_dependencies_first() {
        // 0 -> 1 -> {2 <-> 3}
        let adjacency = vec![vec![1], vec![2], vec![3], vec![2]];
        let components = strongly_connected_components(&adjacency, 0);

        assert_eq!(components.len(), 3);
        assert!(components.contains(&vec![2, 3]));
        assert!(position(&components, 2) < position(&components, 1));
        assert!(position(&components, 1) < position(&components, 0));
    }

    #[test]
    fn test_lower_vertices_are_ignored() {
        // 0 <-> 1, 1 -> 2
        let adjacency = vec![vec![1], vec![0, 2], vec![]];
        let components = strongly_connected_components(&adjacency, 1);
        assert_eq!(components, vec![vec![2], vec![1]]);
    }

    #[test]
    fn test_is_cyclic() {
        let adjacency = vec![vec![0], vec![], vec![1]];
        assert!(is_cyclic(&adjacency, &[0]));
        assert!(!is_cyclic(&adjacency, &[1]));
        assert!(is_cyclic(&adjacency, &[1, 2]));
    }
}
