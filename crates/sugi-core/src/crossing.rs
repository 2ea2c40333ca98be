//! The crossing counter (component B).
//!
//! `full_recount`/`recount_channel` are O(channel size²) pairwise scans —
//! simple and exactly right, since they run once per pass rather than once
//! per candidate move. `crossings_around`/`edge_crossings_around`, which run
//! once per candidate slot inside a sift, instead do an O(degree ×
//! layer-size) difference-array pre-pass, extended here to attribute
//! crossings to the specific moving node/edge rather than only an aggregate
//! total, so that reading off a window of candidate slots afterward is
//! O(window).

use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId};

/// Per-slot cost used by the edge sifter: the worst (max) crossing count
/// borne by any single edge incident on the moving node, with total
/// crossings as a tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSiftCost {
    pub max_edge_crossings: u64,
    pub total_crossings: u64,
}

impl Graph {
    /// Total crossings across every channel.
    pub fn number_of_crossings(&self) -> u64 {
        self.channel_crossings.iter().sum()
    }

    /// Recomputes crossing counts for every channel from scratch.
    pub fn full_recount(&mut self) {
        for channel in 0..self.num_channels() {
            self.recount_channel(channel);
        }
    }

    /// Recomputes the crossing count for a single channel (between
    /// `layers[channel]` and `layers[channel + 1]`), updating both the
    /// per-edge `crossings` fields and `channel_crossings[channel]`.
    pub fn recount_channel(&mut self, channel: usize) {
        let mut ordered: Vec<EdgeId> = Vec::new();
        for &node in &self.layers[channel].nodes {
            ordered.extend_from_slice(&self.node(node).up_edges);
        }
        for &e in &ordered {
            self.edge_mut(e).crossings = 0;
        }
        let mut total = 0u64;
        for i in 0..ordered.len() {
            let ei = ordered[i];
            let (di, ui) = (self.edge(ei).down, self.edge(ei).up);
            let (pdi, pui) = (self.node(di).position, self.node(ui).position);
            for &ej in &ordered[i + 1..] {
                let (dj, uj) = (self.edge(ej).down, self.edge(ej).up);
                if di == dj {
                    continue;
                }
                let (pdj, puj) = (self.node(dj).position, self.node(uj).position);
                let crosses = (pdi < pdj && pui > puj) || (pdi > pdj && pui < puj);
                if crosses {
                    self.edge_mut(ei).crossings += 1;
                    self.edge_mut(ej).crossings += 1;
                    total += 1;
                }
            }
        }
        self.channel_crossings[channel] = total;
    }

    /// Total crossings across every channel if the two (layer-)adjacent
    /// nodes `a` and `b` were swapped (§4.B). Pure: does not mutate the
    /// graph. Panics if `a` and `b` are not adjacent positions in the same
    /// layer.
    pub fn crossings_if_swapped(&self, a: NodeId, b: NodeId) -> u64 {
        (self.number_of_crossings() as i64 + self.swap_delta(a, b)).max(0) as u64
    }

    /// Signed change to `number_of_crossings()` if `a` and `b` were swapped;
    /// the internal primitive `crossings_if_swapped` adds onto the current
    /// total and postprocessing's swap-acceptance check compares against it.
    fn swap_delta(&self, a: NodeId, b: NodeId) -> i64 {
        let (na, nb) = (self.node(a), self.node(b));
        assert_eq!(na.layer, nb.layer, "swap_delta requires same-layer nodes");
        assert_eq!(na.position.abs_diff(nb.position), 1, "swap_delta requires adjacent positions");
        let (left, right) = if na.position < nb.position { (a, b) } else { (b, a) };
        let (left, right) = (self.node(left), self.node(right));

        let mut delta = 0i64;
        for &e1 in &left.down_edges {
            let p1 = self.node(self.edge(e1).down).position;
            for &e2 in &right.down_edges {
                let p2 = self.node(self.edge(e2).down).position;
                match p1.cmp(&p2) {
                    std::cmp::Ordering::Less => delta += 1,
                    std::cmp::Ordering::Greater => delta -= 1,
                    std::cmp::Ordering::Equal => {}
                }
            }
        }
        for &e1 in &left.up_edges {
            let p1 = self.node(self.edge(e1).up).position;
            for &e2 in &right.up_edges {
                let p2 = self.node(self.edge(e2).up).position;
                match p1.cmp(&p2) {
                    std::cmp::Ordering::Less => delta += 1,
                    std::cmp::Ordering::Greater => delta -= 1,
                    std::cmp::Ordering::Equal => {}
                }
            }
        }
        delta
    }

    /// For each candidate insertion slot in `left..=right` (slots are among
    /// the *other* nodes of `node`'s layer, per the standard sifting
    /// convention: slot `s` means "before the `s`-th remaining node"),
    /// returns the crossings that would be contributed by `node`'s incident
    /// edges if it were moved there.
    pub fn crossings_around(&self, node: NodeId, left: usize, right: usize) -> Vec<u64> {
        let layer_idx = self.node(node).layer as usize;
        let n = self.layer_size(layer_idx);
        let diff = self.crossing_diff(node, layer_idx, n);
        let mut acc = 0i64;
        let mut full = vec![0u64; n];
        for (s, slot) in full.iter_mut().enumerate() {
            acc += diff[s];
            *slot = acc.max(0) as u64;
        }
        full[left..=right.min(n.saturating_sub(1))].to_vec()
    }

    /// Same candidate-slot sweep as `crossings_around`, but broken out per
    /// incident edge so the edge sifter can minimize the worst edge rather
    /// than the sum.
    pub fn edge_crossings_around(&self, node: NodeId, left: usize, right: usize) -> Vec<EdgeSiftCost> {
        let layer_idx = self.node(node).layer as usize;
        let n = self.layer_size(layer_idx);
        let per_edge = self.crossing_diff_per_edge(node, layer_idx, n);

        let mut acc = vec![0i64; per_edge.len()];
        let mut max_here = vec![0u64; n];
        let mut total_here = vec![0u64; n];
        for s in 0..n {
            let mut m = 0i64;
            let mut t = 0i64;
            for (k, diff) in per_edge.iter().enumerate() {
                acc[k] += diff[s];
                m = m.max(acc[k]);
                t += acc[k];
            }
            max_here[s] = m.max(0) as u64;
            total_here[s] = t.max(0) as u64;
        }
        (left..=right.min(n.saturating_sub(1)))
            .map(|s| EdgeSiftCost {
                max_edge_crossings: max_here[s],
                total_crossings: total_here[s],
            })
            .collect()
    }

    fn crossing_diff(&self, node: NodeId, layer_idx: usize, n: usize) -> Vec<i64> {
        let mut diff = vec![0i64; n + 1];
        for edge_diff in self.crossing_diff_per_edge(node, layer_idx, n) {
            for (d, e) in diff.iter_mut().zip(edge_diff.iter()) {
                *d += e;
            }
        }
        diff
    }

    /// One difference array per edge incident on `node`, each describing how
    /// that single edge's crossing count changes as `node` sweeps through
    /// every insertion slot.
    fn crossing_diff_per_edge(&self, node: NodeId, layer_idx: usize, n: usize) -> Vec<Vec<i64>> {
        let v = self.node(node);
        let mut per_edge = Vec::with_capacity(v.down_edges.len() + v.up_edges.len());

        for &e1 in &v.down_edges {
            let mut diff = vec![0i64; n + 1];
            let pu = self.node(self.edge(e1).down).position as usize;
            let mut r = 0usize;
            for &w in &self.layers[layer_idx].nodes {
                if w == node {
                    continue;
                }
                for &e2 in &self.node(w).down_edges {
                    let pu2 = self.node(self.edge(e2).down).position as usize;
                    if pu < pu2 {
                        diff[r + 1] += 1;
                        diff[n] -= 1;
                    } else if pu > pu2 {
                        diff[0] += 1;
                        diff[r + 1] -= 1;
                    }
                }
                r += 1;
            }
            per_edge.push(diff);
        }

        for &e1 in &v.up_edges {
            let mut diff = vec![0i64; n + 1];
            let px = self.node(self.edge(e1).up).position as usize;
            let mut r = 0usize;
            for &w in &self.layers[layer_idx].nodes {
                if w == node {
                    continue;
                }
                for &e2 in &self.node(w).up_edges {
                    let px2 = self.node(self.edge(e2).up).position as usize;
                    if px > px2 {
                        diff[0] += 1;
                        diff[r + 1] -= 1;
                    } else if px < px2 {
                        diff[r + 1] += 1;
                        diff[n] -= 1;
                    }
                }
                r += 1;
            }
            per_edge.push(diff);
        }

        per_edge
    }

    /// The edge bearing the most crossings, ties broken by lower id.
    pub fn max_crossings_edge(&self) -> Option<EdgeId> {
        self.edges.iter().max_by_key(|e| (e.crossings, std::cmp::Reverse(e.id))).map(|e| e.id)
    }

    /// The node whose incident edges together bear the most crossings.
    pub fn max_crossings_node(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .max_by_key(|n| {
                let total: u64 = n
                    .up_edges
                    .iter()
                    .chain(n.down_edges.iter())
                    .map(|&e| self.edge(e).crossings)
                    .sum();
                (total, std::cmp::Reverse(n.id))
            })
            .map(|n| n.id)
    }

    /// The channel (pair of adjacent layers) bearing the most crossings.
    pub fn max_crossings_channel(&self) -> Option<usize> {
        self.channel_crossings
            .iter()
            .enumerate()
            .max_by_key(|&(idx, &c)| (c, std::cmp::Reverse(idx)))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k33() -> Graph {
        let mut g = Graph::new("k33");
        g.add_layer();
        g.add_layer();
        let top: Vec<_> = (0..3).map(|i| g.add_node(0, format!("t{i}"))).collect();
        let bot: Vec<_> = (0..3).map(|i| g.add_node(1, format!("b{i}"))).collect();
        for &t in &top {
            for &b in &bot {
                g.add_edge(t, b);
            }
        }
        g
    }

    #[test]
    fn k33_has_nine_crossings_in_natural_order() {
        let mut g = k33();
        g.full_recount();
        // Each of the 3 pairs of top nodes contributes (3 choose 2) = 3 crossings.
        assert_eq!(g.number_of_crossings(), 9);
    }

    #[test]
    fn path_graph_has_no_crossings() {
        let mut g = Graph::new("path");
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(1, "b");
        g.add_edge(a, b);
        g.full_recount();
        assert_eq!(g.number_of_crossings(), 0);
    }

    #[test]
    fn crossings_if_swapped_matches_full_recount_total() {
        let mut g = k33();
        g.full_recount();
        let a = g.layer(0).nodes[0];
        let b = g.layer(0).nodes[1];
        let predicted = g.crossings_if_swapped(a, b);
        g.swap_positions(0, 0, 1);
        g.full_recount();
        assert_eq!(g.number_of_crossings(), predicted);
    }

    #[test]
    fn crossings_around_matches_brute_force_reinsertion() {
        let mut g = k33();
        g.full_recount();
        let node = g.layer(0).nodes[0];
        let n = g.layer_size(0);
        let fast = g.crossings_around(node, 0, n - 1);
        for (s, &expected) in fast.iter().enumerate() {
            let mut trial = g.clone();
            trial.reposition_node(node, s);
            trial.full_recount();
            let contributed: u64 = trial
                .node(node)
                .up_edges
                .iter()
                .chain(trial.node(node).down_edges.iter())
                .map(|&e| trial.edge(e).crossings)
                .sum();
            assert_eq!(expected, contributed, "slot {s}");
        }
    }
}
