//! Elementary cycle enumeration (Johnson's algorithm).
//!
//! Works on vertex indices. For each start vertex `s` in index order, the
//! strongly connected components of the subgraph induced by vertices
//! `>= s` are computed; the component holding the least vertex that lies
//! on a cycle is searched for circuits through that vertex, then `s`
//! moves past it. Every elementary cycle is reported exactly once,
//! starting at its least vertex.

use super::components::{is_cyclic, strongly_connected_components};

/// Enumerate the elementary cycles of `adjacency`.
pub(super) fn elementary_cycles(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut cycles = Vec::new();
    let mut lowest = 0;

    while lowest < adjacency.len() {
        let Some(component) = least_cyclic_component(adjacency, lowest) else {
            break;
        };
        let Some(&start) = component.iter().min() else {
            break;
        };

        let mut in_component = vec![false; adjacency.len()];
        for &v in &component {
            in_component[v] = true;
        }

        let mut search = CircuitSearch {
            adjacency,
            in_component,
            blocked: vec![false; adjacency.len()],
            blocked_by: vec![Vec::new(); adjacency.len()],
            stack: Vec::new(),
            start,
            cycles: &mut cycles,
        };
        search.circuit(start);

        tracing::trace!("Enumerated cycles through vertex {}", start);
        lowest = start + 1;
    }

    cycles
}

/// The strongly connected component, among vertices `>= lowest`, that
/// contains a cycle and has the smallest least vertex.
fn least_cyclic_component(adjacency: &[Vec<usize>], lowest: usize) -> Option<Vec<usize>> {
    strongly_connected_components(adjacency, lowest)
        .into_iter()
        .filter(|component| is_cyclic(adjacency, component))
        .min_by_key(|component| component.first().copied().unwrap_or(usize::MAX))
}

// ============================================================================
// CIRCUIT SEARCH
// ============================================================================

struct CircuitSearch<'a> {
    adjacency: &'a [Vec<usize>],
    in_component: Vec<bool>,
    blocked: Vec<bool>,
    blocked_by: Vec<Vec<usize>>,
    stack: Vec<usize>,
    start: usize,
    cycles: &'a mut Vec<Vec<usize>>,
}

impl CircuitSearch<'_> {
    fn circuit(&mut self, v: usize) -> bool {
        let adjacency = self.adjacency;
        let mut found = false;
        self.stack.push(v);
        self.blocked[v] = true;

        for &w in &adjacency[v] {
            if !self.in_component[w] {
                continue;
            }
            if w == self.start {
                self.cycles.push(self.stack.clone());
                found = true;
            } else if !self.blocked[w] && self.circuit(w) {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in &adjacency[v] {
                if self.in_component[w] && !self.blocked_by[w].contains(&v) {
                    self.blocked_by[w].push(v);
                }
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, v: usize) {
        self.blocked[v] = false;
        for w in std::mem::take(&mut self.blocked_by[v]) {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_vertices() {
        assert!(elementary_cycles(&[]).is_empty());
    }

    #[test]
    fn test_triangle() {
        let adjacency = vec![vec![1], vec![2], vec![0]];
        assert_eq!(elementary_cycles(&adjacency), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_two_cycles_sharing_a_vertex() {
        // 0 -> 1 -> 0 and 0 -> 2 -> 0
        let adjacency = vec![vec![1, 2], vec![0], vec![0]];
        let cycles = elementary_cycles(&adjacency);
        assert_eq!(cycles, vec![vec![0, 1], vec![0, 2]]);
    }

    #[test]
    fn test_cycle_not_through_vertex_zero() {
        // 0 -> 1, 1 -> 2 -> 1
        let adjacency = vec![vec![1], vec![2], vec![1]];
        assert_eq!(elementary_cycles(&adjacency), vec![vec![1, 2]]);
    }

    #[test]
    fn test_complete_graph_on_three_vertices() {
        let adjacency = vec![vec![1, 2], vec![0, 2], vec![0, 1]];
        // two 2-cycles through 0, two 3-cycles, one 2-cycle between 1 and 2
        assert_eq!(elementary_cycles(&adjacency).len(), 5);
    }
}
