//! The stretch counter (component C).
//!
//! Stretch is the *normalized* horizontal distance between an edge's two
//! endpoints — each position is scaled to `[0, 1]` by its own layer's width
//! first, so an edge crossing a wide channel and an edge crossing a narrow
//! one are comparable. A layer of fewer than two nodes has no meaningful
//! normalization (division by `|L| - 1` would be by zero), so any edge
//! touching one contributes zero stretch, per §4.C.
//!
//! Because normalized stretch is not integer-valued, it is tracked here as
//! `f64` and surfaced to the objective tracker (which wants `u64`s to keep
//! every tracked objective in one comparable currency) as a fixed-point
//! value scaled by [`STRETCH_SCALE`].

use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId};

/// Fixed-point scale applied to normalized (`[0, 1]`-ranged) stretch values
/// before they're handed to the objective tracker, which compares `u64`s.
/// Large enough that two distinct stretch sums occurring in any graph this
/// engine is meant to handle don't collide after rounding.
pub const STRETCH_SCALE: f64 = 1_000_000.0;

impl Graph {
    fn normalized_position(&self, node: NodeId) -> f64 {
        let n = self.node(node);
        let width = self.layer_size(n.layer as usize);
        if width < 2 {
            0.0
        } else {
            n.position as f64 / (width - 1) as f64
        }
    }

    /// Normalized stretch of a single edge: `0.0` if either endpoint's layer
    /// has fewer than two nodes.
    pub fn edge_stretch_normalized(&self, edge: EdgeId) -> f64 {
        let e = self.edge(edge);
        let down_width = self.layer_size(self.node(e.down).layer as usize);
        let up_width = self.layer_size(self.node(e.up).layer as usize);
        if down_width < 2 || up_width < 2 {
            return 0.0;
        }
        (self.normalized_position(e.down) - self.normalized_position(e.up)).abs()
    }

    /// Fixed-point (scaled by [`STRETCH_SCALE`]) stretch of a single edge,
    /// rounded to the nearest integer — the representation the objective
    /// tracker and the drivers compare.
    pub fn edge_stretch(&self, edge: EdgeId) -> u64 {
        (self.edge_stretch_normalized(edge) * STRETCH_SCALE).round() as u64
    }

    /// Sum of (fixed-point) stretch over every edge in the graph.
    pub fn total_stretch(&self) -> u64 {
        (0..self.edges.len()).map(|i| self.edge_stretch(EdgeId::new(i))).sum()
    }

    /// Sum of (fixed-point) stretch over the edges incident on a single node.
    pub fn node_stretch(&self, node: NodeId) -> u64 {
        let n = self.node(node);
        n.up_edges
            .iter()
            .chain(n.down_edges.iter())
            .map(|&e| self.edge_stretch(e))
            .sum()
    }

    /// The edge with the greatest stretch, ties broken by lower id.
    pub fn max_stretch_edge(&self) -> Option<EdgeId> {
        (0..self.edges.len())
            .map(EdgeId::new)
            .max_by_key(|&e| (self.edge_stretch(e), std::cmp::Reverse(e)))
    }

    /// For each candidate insertion slot in `left..=right`, the (fixed-point)
    /// stretch that would be contributed by `node`'s incident edges if it
    /// were moved there. Unlike crossings, stretch is a direct per-edge
    /// distance computation, so no difference-array pre-pass is needed —
    /// each slot is O(degree) on its own. Moving `node` changes only its own
    /// layer's width, not the neighboring layers', so the neighbor side of
    /// each edge's normalization stays fixed across every candidate slot.
    pub fn stretch_around(&self, node: NodeId, left: usize, right: usize) -> Vec<u64> {
        let n = self.node(node);
        let own_width = self.layer_size(n.layer as usize);
        let down_norms: Vec<Option<f64>> = n
            .down_edges
            .iter()
            .map(|&e| {
                let neighbor = self.edge(e).down;
                let neighbor_width = self.layer_size(self.node(neighbor).layer as usize);
                if own_width < 2 || neighbor_width < 2 {
                    None
                } else {
                    Some(self.normalized_position(neighbor))
                }
            })
            .collect();
        let up_norms: Vec<Option<f64>> = n
            .up_edges
            .iter()
            .map(|&e| {
                let neighbor = self.edge(e).up;
                let neighbor_width = self.layer_size(self.node(neighbor).layer as usize);
                if own_width < 2 || neighbor_width < 2 {
                    None
                } else {
                    Some(self.normalized_position(neighbor))
                }
            })
            .collect();
        (left..=right)
            .map(|s| {
                let here = if own_width < 2 { 0.0 } else { s as f64 / (own_width - 1) as f64 };
                let down: f64 = down_norms.iter().flatten().map(|&p| (here - p).abs()).sum();
                let up: f64 = up_norms.iter().flatten().map(|&p| (here - p).abs()).sum();
                ((down + up) * STRETCH_SCALE).round() as u64
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_path_has_zero_stretch() {
        let mut g = Graph::new("path");
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(1, "b");
        g.add_edge(a, b);
        assert_eq!(g.total_stretch(), 0);
    }

    #[test]
    fn offset_edge_has_matching_stretch() {
        let mut g = Graph::new("offset");
        g.add_layer();
        g.add_layer();
        let _a0 = g.add_node(0, "a0");
        let a1 = g.add_node(0, "a1");
        let b0 = g.add_node(1, "b0");
        let _b1 = g.add_node(1, "b1");
        let e = g.add_edge(a1, b0);
        // a1 normalizes to 1.0 (last of 2), b0 normalizes to 0.0 (first of 2).
        assert_eq!(g.edge_stretch(e), STRETCH_SCALE as u64);
        assert_eq!(g.total_stretch(), STRETCH_SCALE as u64);
    }

    #[test]
    fn single_node_layer_has_no_stretch() {
        let mut g = Graph::new("singleton-layer");
        g.add_layer();
        g.add_layer();
        let a0 = g.add_node(0, "a0");
        let b0 = g.add_node(1, "b0");
        let _b1 = g.add_node(1, "b1");
        let e = g.add_edge(a0, b0);
        assert_eq!(g.edge_stretch(e), 0);
    }

    #[test]
    fn stretch_around_matches_brute_force() {
        let mut g = Graph::new("fan");
        g.add_layer();
        g.add_layer();
        let a0 = g.add_node(0, "a0");
        let _a1 = g.add_node(0, "a1");
        let b0 = g.add_node(1, "b0");
        let _b1 = g.add_node(1, "b1");
        g.add_edge(a0, b0);
        let fast = g.stretch_around(a0, 0, 1);
        for (s, &expected) in fast.iter().enumerate() {
            let mut trial = g.clone();
            trial.reposition_node(a0, s);
            assert_eq!(trial.node_stretch(a0), expected);
        }
    }
}
