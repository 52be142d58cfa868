// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge-loop reconstruction
//!
//! Groups an unordered set of directed boundary edges into closed vertex
//! loops by repeatedly joining chains that share an endpoint. Chains live in
//! an arena and are removed by key once absorbed, so no chain is ever
//! mutated while it is being scanned.
//!
//! Joining is first-match in arena order. For a cross-section that touches
//! itself (figure-eight) the decomposition is deterministic for a fixed edge
//! order but not unique.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct ChainId;
}

/// Directed edge plus its position in the input, kept through reversals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChainEdge {
    from: usize,
    to: usize,
    ordinal: usize,
}

impl ChainEdge {
    fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ordinal: self.ordinal,
        }
    }
}

/// Ordered, possibly open run of edges. Never empty.
#[derive(Debug, Clone)]
struct Chain {
    edges: Vec<ChainEdge>,
}

impl Chain {
    fn start(&self) -> usize {
        self.edges[0].from
    }

    fn end(&self) -> usize {
        self.edges[self.edges.len() - 1].to
    }

    fn is_closed(&self) -> bool {
        self.start() == self.end()
    }

    fn reverse(&mut self) {
        self.edges.reverse();
        for edge in &mut self.edges {
            *edge = edge.reversed();
        }
    }

    /// Absorb `other` on the side selected by `join`
    fn absorb(&mut self, mut other: Chain, join: Join) {
        match join {
            Join::Prepend | Join::PrependReversed => {
                if join == Join::PrependReversed {
                    other.reverse();
                }
                other.edges.append(&mut self.edges);
                self.edges = other.edges;
            }
            Join::Append | Join::AppendReversed => {
                if join == Join::AppendReversed {
                    other.reverse();
                }
                self.edges.append(&mut other.edges);
            }
        }
    }

    /// Vertex cycle starting at the edge that came first in the input
    fn into_loop(self) -> EdgeLoop {
        let first = self
            .edges
            .iter()
            .enumerate()
            .min_by_key(|(_, edge)| edge.ordinal)
            .map_or(0, |(position, _)| position);

        let vertices = self.edges[first..]
            .iter()
            .chain(&self.edges[..first])
            .map(|edge| edge.from)
            .collect();

        EdgeLoop { vertices }
    }
}

/// How chain B attaches to chain A, in the order joins are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// start(A) == end(B)
    Prepend,
    /// start(A) == start(B)
    PrependReversed,
    /// end(A) == start(B)
    Append,
    /// end(A) == end(B)
    AppendReversed,
}

impl Join {
    fn between(a: &Chain, b: &Chain) -> Option<Self> {
        if a.start() == b.end() {
            Some(Join::Prepend)
        } else if a.start() == b.start() {
            Some(Join::PrependReversed)
        } else if a.end() == b.start() {
            Some(Join::Append)
        } else if a.end() == b.end() {
            Some(Join::AppendReversed)
        } else {
            None
        }
    }
}

/// Closed, ordered vertex cycle. The closing edge runs from the last
/// vertex back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLoop {
    vertices: Vec<usize>,
}

impl EdgeLoop {
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Number of edges (equal to the number of vertices)
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn reverse(&mut self) {
        self.vertices.reverse();
    }

    /// Fan triangulation from the first vertex: `len - 2` triangles
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let apex = self.vertices.first().copied();
        self.vertices
            .windows(2)
            .skip(1)
            .filter_map(move |pair| apex.map(|apex| [apex, pair[0], pair[1]]))
    }
}

/// Outcome of loop reconstruction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReconstruction {
    /// Closed loops of at least three edges, in arena order
    pub loops: Vec<EdgeLoop>,
    /// Chains that never closed (cut clipped at a mesh border)
    pub open_chains: usize,
    /// Closed chains too short to bound an area
    pub degenerate_loops: usize,
}

/// Group directed edges into closed loops, discarding open chains and
/// loops of fewer than three edges
pub fn reconstruct_loops(edges: &[(usize, usize)]) -> Vec<EdgeLoop> {
    reconstruct(edges).loops
}

/// Same as [`reconstruct_loops`] but also counts what was discarded
pub fn reconstruct(edges: &[(usize, usize)]) -> LoopReconstruction {
    let mut chains: SlotMap<ChainId, Chain> = SlotMap::with_capacity_and_key(edges.len());
    for (ordinal, &(from, to)) in edges.iter().enumerate() {
        chains.insert(Chain {
            edges: vec![ChainEdge { from, to, ordinal }],
        });
    }

    while join_first_pair(&mut chains) {}

    let mut result = LoopReconstruction::default();
    for (_, chain) in chains {
        if !chain.is_closed() {
            result.open_chains += 1;
        } else if chain.edges.len() < 3 {
            result.degenerate_loops += 1;
        } else {
            result.loops.push(chain.into_loop());
        }
    }

    if result.open_chains > 0 || result.degenerate_loops > 0 {
        log::debug!(
            "loop reconstruction discarded {} open chains and {} degenerate loops",
            result.open_chains,
            result.degenerate_loops
        );
    }

    result
}

/// One scan over all ordered pairs; joins the first adjacent pair found
fn join_first_pair(chains: &mut SlotMap<ChainId, Chain>) -> bool {
    let ids: Vec<ChainId> = chains.keys().collect();

    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let join = match Join::between(&chains[a], &chains[b]) {
                Some(join) => join,
                None => continue,
            };
            if let Some(other) = chains.remove(b) {
                chains[a].absorb(other, join);
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_lists(loops: &[EdgeLoop]) -> Vec<Vec<usize>> {
        loops.iter().map(|l| l.vertices().to_vec()).collect()
    }

    #[test]
    fn test_triangle_closes() {
        let loops = reconstruct_loops(&[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(vertex_lists(&loops), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_open_chain_is_discarded() {
        let result = reconstruct(&[(0, 1), (1, 2)]);
        assert!(result.loops.is_empty());
        assert_eq!(result.open_chains, 1);
    }

    #[test]
    fn test_mixed_orientation_edges_join() {
        // Middle edge points the wrong way and must be flipped
        let loops = reconstruct_loops(&[(0, 1), (2, 1), (2, 0)]);
        assert_eq!(vertex_lists(&loops), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_shuffled_edges_start_at_first_input_edge() {
        let loops = reconstruct_loops(&[(2, 3), (0, 1), (3, 0), (1, 2)]);
        assert_eq!(vertex_lists(&loops), vec![vec![2, 3, 0, 1]]);
    }

    #[test]
    fn test_two_disjoint_loops() {
        let edges = [(0, 1), (10, 11), (1, 2), (11, 12), (2, 0), (12, 10)];
        let loops = reconstruct_loops(&edges);
        assert_eq!(vertex_lists(&loops), vec![vec![0, 1, 2], vec![10, 11, 12]]);
    }

    #[test]
    fn test_two_edge_cycle_is_degenerate() {
        let result = reconstruct(&[(0, 1), (1, 0)]);
        assert!(result.loops.is_empty());
        assert_eq!(result.degenerate_loops, 1);
        assert_eq!(result.open_chains, 0);
    }

    #[test]
    fn test_self_edge_is_degenerate() {
        let result = reconstruct(&[(4, 4)]);
        assert!(result.loops.is_empty());
        assert_eq!(result.degenerate_loops, 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reconstruct(&[]), LoopReconstruction::default());
    }

    #[test]
    fn test_figure_eight_first_match_decomposition() {
        // Two triangles touching at vertex 0
        let edges = [(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 0)];
        let loops = reconstruct_loops(&edges);
        assert_eq!(vertex_lists(&loops), vec![vec![0, 1, 2], vec![0, 3, 4]]);
        assert_eq!(reconstruct_loops(&edges), loops);
    }

    #[test]
    fn test_fan_triangulation() {
        let edge_loop = EdgeLoop {
            vertices: vec![7, 8, 9, 10, 11],
        };
        let triangles: Vec<[usize; 3]> = edge_loop.fan().collect();
        assert_eq!(triangles, vec![[7, 8, 9], [7, 9, 10], [7, 10, 11]]);
    }

    #[test]
    fn test_every_edge_lands_in_one_chain() {
        let edges = [(5, 6), (6, 7), (7, 8), (8, 5), (20, 21)];
        let result = reconstruct(&edges);
        let looped: usize = result.loops.iter().map(EdgeLoop::len).sum();
        assert_eq!(looped + result.open_chains, edges.len());
    }
}
