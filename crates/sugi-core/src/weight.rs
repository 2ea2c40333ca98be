//! Sort and weight primitives (component E).
//!
//! `assign_barycenter`/`assign_median` fill in each node's `weight` from its
//! already-ordered neighbors on one or both sides; `layer_sort` then reorders
//! a layer by that weight. The merge in `layer_sort` keeps nodes without a
//! weight ("unsortable") in their original slot, with the weighted
//! ("sortable") nodes filling in the remaining slots in weight order —
//! rather than the simpler but behaviorally different approach of appending
//! unsortables at the ends.

use crate::config::WeightCarryPolicy;
use crate::graph::Graph;
use crate::ids::NodeId;

/// Which neighbors contribute to a node's weight: the layer above, the layer
/// below, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Up,
    Down,
    Both,
}

impl Graph {
    fn neighbor_positions(&self, node: NodeId, orientation: Orientation) -> Vec<f64> {
        let n = self.node(node);
        let mut positions = Vec::new();
        if matches!(orientation, Orientation::Up | Orientation::Both) {
            positions.extend(n.up_edges.iter().map(|&e| self.node(self.edge(e).up).position as f64));
        }
        if matches!(orientation, Orientation::Down | Orientation::Both) {
            positions.extend(n.down_edges.iter().map(|&e| self.node(self.edge(e).down).position as f64));
        }
        positions
    }

    /// Writes `node.weight` for every node of `layer` to the mean position of
    /// its neighbors on `orientation`'s side(s). Isolated nodes (no such
    /// neighbors) are resolved per `policy`: see [`WeightCarryPolicy`].
    ///
    /// `balanced` only matters for `Orientation::Both` (§4.E, the
    /// `balanced_weight` configuration): when `false`, every up- and
    /// down-neighbor position is pooled into one count-weighted mean; when
    /// `true`, the up-directed and down-directed barycenters are computed
    /// separately and averaged unweighted — the two differ whenever a
    /// node's up-degree and down-degree differ.
    pub fn assign_barycenter(&mut self, layer: usize, orientation: Orientation, policy: WeightCarryPolicy, balanced: bool) {
        let ids = self.layers[layer].nodes.clone();
        let mut isolated = Vec::new();
        for &id in &ids {
            let weight = if matches!(orientation, Orientation::Both) && balanced {
                self.balanced_barycenter(id)
            } else {
                let positions = self.neighbor_positions(id, orientation);
                (!positions.is_empty()).then(|| positions.iter().sum::<f64>() / positions.len() as f64)
            };
            match weight {
                Some(w) => self.node_mut(id).weight = Some(w),
                None => isolated.push(id),
            }
        }
        self.apply_carry_policy(&ids, &isolated, policy);
    }

    /// The `balanced_weight` variant of `Orientation::Both`: the unweighted
    /// mean of the up- and down-directed barycenters rather than one pooled
    /// mean across every neighbor. A node with neighbors on only one side
    /// falls back to that side's mean alone; a node isolated on both sides
    /// is `None` (resolved by the caller's carry policy).
    fn balanced_barycenter(&self, node: NodeId) -> Option<f64> {
        let mean = |positions: Vec<f64>| (!positions.is_empty()).then(|| positions.iter().sum::<f64>() / positions.len() as f64);
        let up = mean(self.neighbor_positions(node, Orientation::Up));
        let down = mean(self.neighbor_positions(node, Orientation::Down));
        match (up, down) {
            (Some(u), Some(d)) => Some((u + d) / 2.0),
            (Some(u), None) => Some(u),
            (None, Some(d)) => Some(d),
            (None, None) => None,
        }
    }

    /// Same as `assign_barycenter`, but using the median-of-neighbors
    /// formula: the middle element for an odd neighbor count; for an even
    /// count, ties between the two middle elements are broken by whichever
    /// is closer to the node's current position.
    pub fn assign_median(&mut self, layer: usize, orientation: Orientation, policy: WeightCarryPolicy) {
        let ids = self.layers[layer].nodes.clone();
        let mut isolated = Vec::new();
        for &id in &ids {
            let mut positions = self.neighbor_positions(id, orientation);
            if positions.is_empty() {
                isolated.push(id);
                continue;
            }
            positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let len = positions.len();
            let m = len / 2;
            let median = if len % 2 == 1 {
                positions[m]
            } else {
                let current = self.node(id).position as f64;
                let lo = positions[m - 1];
                let hi = positions[m];
                if (current - lo).abs() <= (hi - current).abs() {
                    lo
                } else {
                    hi
                }
            };
            self.node_mut(id).weight = Some(median);
        }
        self.apply_carry_policy(&ids, &isolated, policy);
    }

    /// Resolves the weight of every isolated node (one with no neighbor on
    /// the assigner's chosen side) per `policy`:
    /// - `None`: left as unsortable (`weight = None`).
    /// - `Left`: keeps whatever weight it carried into this pass untouched.
    /// - `Avg`: set to the mean weight of the layer's other, just-assigned
    ///   nodes (or left unsortable if the whole layer is isolated).
    fn apply_carry_policy(&mut self, layer_ids: &[NodeId], isolated: &[NodeId], policy: WeightCarryPolicy) {
        match policy {
            WeightCarryPolicy::None => {
                for &id in isolated {
                    self.node_mut(id).weight = None;
                }
            }
            WeightCarryPolicy::Left => {
                // Weight field already holds whatever it carried in; leave it.
            }
            WeightCarryPolicy::Avg => {
                let assigned: Vec<f64> = layer_ids
                    .iter()
                    .filter(|id| !isolated.contains(id))
                    .filter_map(|&id| self.node(id).weight)
                    .collect();
                if assigned.is_empty() {
                    for &id in isolated {
                        self.node_mut(id).weight = None;
                    }
                } else {
                    let avg = assigned.iter().sum::<f64>() / assigned.len() as f64;
                    for &id in isolated {
                        self.node_mut(id).weight = Some(avg);
                    }
                }
            }
        }
    }

    /// Assigns a DFS preorder number to every node in the graph, walking
    /// forward along `up_edges` from each not-yet-visited source. Used as
    /// the initial-order weight for the `mse` driver and the `dfs`
    /// preprocessor.
    pub fn assign_dfs_preorder(&mut self) {
        for node in &mut self.nodes {
            node.preorder = None;
        }
        let mut counter = 0u32;
        let mut stack: Vec<NodeId> = Vec::new();
        for layer in 0..self.layers.len() {
            for &start in &self.layers[layer].nodes.clone() {
                if self.node(start).preorder.is_some() {
                    continue;
                }
                stack.push(start);
                while let Some(v) = stack.pop() {
                    if self.node(v).preorder.is_some() {
                        continue;
                    }
                    self.node_mut(v).preorder = Some(counter);
                    counter += 1;
                    let next: Vec<NodeId> =
                        self.node(v).up_edges.iter().map(|&e| self.edge(e).up).collect();
                    for n in next.into_iter().rev() {
                        if self.node(n).preorder.is_none() {
                            stack.push(n);
                        }
                    }
                }
            }
        }
    }

    /// Reorders `layer` by each node's current `weight`, stable with respect
    /// to the original order among ties (or reversed, if `bias_right`).
    /// Nodes with no weight ("unsortable") keep their original slot; the
    /// weighted nodes fill the remaining slots in ascending weight order.
    pub fn layer_sort(&mut self, layer: usize, bias_right: bool) {
        let nodes = self.layers[layer].nodes.clone();
        let n = nodes.len();
        let mut sortable: Vec<(NodeId, f64)> = Vec::new();
        let mut result: Vec<Option<NodeId>> = vec![None; n];
        for (idx, &id) in nodes.iter().enumerate() {
            match self.node(id).weight {
                Some(w) => sortable.push((id, w)),
                None => result[idx] = Some(id),
            }
        }
        if bias_right {
            sortable.reverse();
        }
        sortable.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

        let mut next_sortable = sortable.into_iter();
        for slot in result.iter_mut() {
            if slot.is_none() {
                *slot = Some(next_sortable.next().expect("sortable count matches empty slots").0);
            }
        }

        self.layers[layer].nodes = result.into_iter().map(|o| o.unwrap()).collect();
        for (p, &id) in self.layers[layer].nodes.iter().enumerate() {
            self.node_mut(id).position = p as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bipartite(top_n: usize, bottom_n: usize) -> Graph {
        let mut g = Graph::new("bip");
        g.add_layer();
        g.add_layer();
        for i in 0..top_n {
            g.add_node(0, format!("t{i}"));
        }
        for i in 0..bottom_n {
            g.add_node(1, format!("b{i}"));
        }
        g
    }

    #[test]
    fn layer_sort_orders_by_barycenter() {
        let mut g = bipartite(2, 2);
        let a = g.layer(0).nodes[0];
        let b = g.layer(0).nodes[1];
        g.node_mut(a).weight = Some(2.0);
        g.node_mut(b).weight = Some(1.0);
        g.layer_sort(0, false);
        assert_eq!(g.layer(0).nodes, vec![b, a]);
    }

    #[test]
    fn layer_sort_biases_left_by_default_on_ties() {
        let mut g = bipartite(2, 0);
        let a = g.layer(0).nodes[0];
        let b = g.layer(0).nodes[1];
        g.node_mut(a).weight = Some(1.0);
        g.node_mut(b).weight = Some(1.0);
        g.layer_sort(0, false);
        assert_eq!(g.layer(0).nodes, vec![a, b]);
        g.node_mut(a).weight = Some(1.0);
        g.node_mut(b).weight = Some(1.0);
        g.layer_sort(0, true);
        assert_eq!(g.layer(0).nodes, vec![b, a]);
    }

    #[test]
    fn layer_sort_keeps_unsortable_nodes_in_place() {
        let mut g = bipartite(4, 0);
        let ids: Vec<_> = g.layer(0).nodes.clone();
        g.node_mut(ids[0]).weight = Some(2.0);
        g.node_mut(ids[1]).weight = Some(6.0);
        g.node_mut(ids[2]).weight = None;
        g.node_mut(ids[3]).weight = Some(3.0);
        g.layer_sort(0, false);
        assert_eq!(g.layer(0).nodes, vec![ids[0], ids[3], ids[2], ids[1]]);
    }

    #[test]
    fn median_of_single_neighbor_is_its_position() {
        let mut g = bipartite(1, 1);
        let t0 = g.layer(0).nodes[0];
        let b0 = g.layer(1).nodes[0];
        g.add_edge(t0, b0);
        g.assign_median(0, Orientation::Up, WeightCarryPolicy::Left);
        assert_eq!(g.node(t0).weight, Some(0.0));
    }

    #[test]
    fn avg_carry_policy_places_isolated_node_at_mean_weight() {
        // Layer 0: t0, t1 (isolated), t2. Layer 1: b0, b2 wired to t0/t2.
        let mut g = bipartite(3, 2);
        let t: Vec<_> = g.layer(0).nodes.clone();
        let b: Vec<_> = g.layer(1).nodes.clone();
        g.add_edge(t[0], b[0]);
        g.add_edge(t[2], b[1]);
        g.assign_barycenter(0, Orientation::Down, WeightCarryPolicy::Avg, false);
        assert_eq!(g.node(t[0]).weight, Some(0.0));
        assert_eq!(g.node(t[2]).weight, Some(1.0));
        assert_eq!(g.node(t[1]).weight, Some(0.5));
    }

    #[test]
    fn none_carry_policy_leaves_isolated_node_unsortable() {
        let mut g = bipartite(2, 1);
        let t: Vec<_> = g.layer(0).nodes.clone();
        let b0 = g.layer(1).nodes[0];
        g.add_edge(t[0], b0);
        g.assign_barycenter(0, Orientation::Down, WeightCarryPolicy::None, false);
        assert_eq!(g.node(t[1]).weight, None);
    }

    #[test]
    fn balanced_both_averages_directed_barycenters_unweighted() {
        // t0 has 1 down-neighbor at position 0 and 2 up-neighbors at
        // positions 0 and 1 (mean 0.5). Pooled: (0+0+1)/3 = 1/3. Balanced:
        // (0 + 0.5)/2 = 0.25.
        let mut g = Graph::new("balanced");
        g.add_layer();
        g.add_layer();
        g.add_layer();
        let t0 = g.add_node(1, "t0");
        let d0 = g.add_node(0, "d0");
        let u0 = g.add_node(2, "u0");
        let u1 = g.add_node(2, "u1");
        g.add_edge(d0, t0);
        g.add_edge(t0, u0);
        g.add_edge(t0, u1);

        g.assign_barycenter(1, Orientation::Both, WeightCarryPolicy::Left, false);
        assert_eq!(g.node(t0).weight, Some(1.0 / 3.0));

        g.assign_barycenter(1, Orientation::Both, WeightCarryPolicy::Left, true);
        assert_eq!(g.node(t0).weight, Some(0.25));
    }

    #[test]
    fn dfs_preorder_visits_every_node() {
        let mut g = bipartite(2, 2);
        let t: Vec<_> = g.layer(0).nodes.clone();
        let b: Vec<_> = g.layer(1).nodes.clone();
        g.add_edge(t[0], b[0]);
        g.add_edge(t[1], b[1]);
        g.assign_dfs_preorder();
        for n in &g.nodes {
            assert!(n.preorder.is_some());
        }
    }
}
