//! The layered-graph store (component A).
//!
//! Nodes and edges live in two flat `Vec`s owned by [`Graph`]; everything
//! else — which layer a node sits in, which position it occupies, which
//! edges touch it — is a field on the node/edge record or an index into one
//! of these vectors. This is the "pointer graph -> flat arrays + indices"
//! strategy called for in the design notes: no `Rc`/`RefCell`, no string
//! keys, one owner.

use crate::ids::{EdgeId, NodeId};

/// A single layer: the nodes that occupy it, left to right.
///
/// A node's position within its layer is simply its index in `nodes`, so
/// `layer.nodes[p]` and "the node at position `p`" are the same thing.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub nodes: Vec<NodeId>,
    /// Layers can be pinned by a preprocessor (e.g. a source/sink layer);
    /// heuristics must not reorder a fixed layer.
    pub fixed: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub layer: u32,
    pub position: u32,
    /// Edges to the layer above (`layer + 1`); this node is the "down" end.
    pub up_edges: Vec<EdgeId>,
    /// Edges to the layer below (`layer - 1`); this node is the "up" end.
    pub down_edges: Vec<EdgeId>,
    /// Scratch weight slot written by §4.E's assigners and read by `layer_sort`.
    pub weight: Option<f64>,
    /// Set by mce/mce-s once the node's position has been locked for the pass.
    pub fixed: bool,
    /// DFS preorder number, used by the `dfs` preprocessor and the `mse` driver.
    pub preorder: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    /// Endpoint on the lower layer.
    pub down: NodeId,
    /// Endpoint on the upper layer (`down.layer + 1`).
    pub up: NodeId,
    /// Crossings this edge currently participates in, maintained by
    /// [`crate::crossing`]'s `full_recount`/`recount_channel`.
    pub crossings: u64,
    pub fixed: bool,
}

/// A snapshot of every layer's node order, restorable with [`Graph::restore_order`].
///
/// Deliberately holds nothing but positions: the "when was this captured and
/// how good was it" metadata belongs to the caller ([`crate::objective`]),
/// which may keep several snapshots (one per tracked objective) around a
/// single `Graph`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    /// Flattened layer-major, position-major: `layers[0]` positions, then
    /// `layers[1]`, and so on.
    node_ids: Vec<NodeId>,
    layer_bounds: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    pub name: String,
    /// Free-form comment buffer (§3): the parsers accumulate the command
    /// line here as a comment, and it is propagated unchanged to every
    /// output file (§6.4).
    pub comment: String,
    pub layers: Vec<Layer>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// `channel_crossings[i]` is the crossing count between `layers[i]` and
    /// `layers[i + 1]`; length is `layers.len().saturating_sub(1)`.
    pub channel_crossings: Vec<u64>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Graph {
            name: name.into(),
            comment: String::new(),
            layers: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            channel_crossings: Vec::new(),
        }
    }

    pub fn with_capacity(name: impl Into<String>, layers: usize, nodes: usize, edges: usize) -> Self {
        let mut g = Graph::new(name);
        g.layers.reserve(layers);
        g.nodes.reserve(nodes);
        g.edges.reserve(edges);
        g
    }

    /// Appends a new, empty layer and returns its index.
    pub fn add_layer(&mut self) -> usize {
        self.layers.push(Layer::default());
        if self.layers.len() >= 2 {
            self.channel_crossings.push(0);
        }
        self.layers.len() - 1
    }

    /// Appends a node to the end of `layer` and returns its id.
    pub fn add_node(&mut self, layer: usize, name: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let position = self.layers[layer].nodes.len() as u32;
        self.nodes.push(Node {
            id,
            name: name.into(),
            layer: layer as u32,
            position,
            up_edges: Vec::new(),
            down_edges: Vec::new(),
            weight: None,
            fixed: false,
            preorder: None,
        });
        self.layers[layer].nodes.push(id);
        id
    }

    /// Adds an edge between adjacent layers. Panics if `down`/`up` are not on
    /// consecutive layers — that invariant is a programming error, not a
    /// recoverable condition (§7).
    pub fn add_edge(&mut self, down: NodeId, up: NodeId) -> EdgeId {
        let down_layer = self.nodes[down.index()].layer;
        let up_layer = self.nodes[up.index()].layer;
        assert_eq!(
            up_layer,
            down_layer + 1,
            "edge endpoints must be on adjacent layers (down={down_layer}, up={up_layer})"
        );
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge {
            id,
            down,
            up,
            crossings: 0,
            fixed: false,
        });
        self.nodes[down.index()].up_edges.push(id);
        self.nodes[up.index()].down_edges.push(id);
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> &Layer {
        &self.layers[idx]
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer_size(&self, idx: usize) -> usize {
        self.layers[idx].nodes.len()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channel_crossings.len()
    }

    /// Swaps two positions within a layer; the caller is responsible for
    /// updating any cached crossing counts afterward (see
    /// [`crate::crossing::Graph::crossings_if_swapped`] for the read-only
    /// variant used to decide whether a swap is worth making).
    pub fn swap_positions(&mut self, layer: usize, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.layers[layer].nodes.swap(i, j);
        let a = self.layers[layer].nodes[i];
        let b = self.layers[layer].nodes[j];
        self.node_mut(a).position = i as u32;
        self.node_mut(b).position = j as u32;
    }

    /// Removes `node` from its current slot and reinserts it at
    /// `new_position` (measured among the *other* nodes of the layer, i.e.
    /// the insertion-slot convention used throughout §4.F), shifting the
    /// nodes in between by one.
    pub fn reposition_node(&mut self, node: NodeId, new_position: usize) {
        let layer_idx = self.node(node).layer as usize;
        let old_position = self.node(node).position as usize;
        if old_position == new_position {
            return;
        }
        let nodes = &mut self.layers[layer_idx].nodes;
        nodes.remove(old_position);
        nodes.insert(new_position.min(nodes.len()), node);
        let layer = &self.layers[layer_idx];
        let lo = old_position.min(new_position);
        let hi = old_position.max(new_position);
        for p in lo..=hi.min(layer.nodes.len() - 1) {
            let id = layer.nodes[p];
            self.nodes[id.index()].position = p as u32;
        }
    }

    /// Captures the current order of every layer.
    pub fn save_order(&self) -> OrderSnapshot {
        let mut node_ids = Vec::with_capacity(self.nodes.len());
        let mut layer_bounds = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let start = node_ids.len();
            node_ids.extend_from_slice(&layer.nodes);
            layer_bounds.push((start, node_ids.len()));
        }
        OrderSnapshot {
            node_ids,
            layer_bounds,
        }
    }

    /// Restores a previously captured order. Panics if the snapshot's shape
    /// doesn't match this graph's layer structure — a snapshot is only ever
    /// valid for the graph it was taken from.
    pub fn restore_order(&mut self, snapshot: &OrderSnapshot) {
        assert_eq!(
            snapshot.layer_bounds.len(),
            self.layers.len(),
            "snapshot layer count does not match graph"
        );
        for (layer_idx, &(start, end)) in snapshot.layer_bounds.iter().enumerate() {
            self.layers[layer_idx].nodes.clear();
            self.layers[layer_idx]
                .nodes
                .extend_from_slice(&snapshot.node_ids[start..end]);
            for (p, &id) in self.layers[layer_idx].nodes.iter().enumerate() {
                self.nodes[id.index()].position = p as u32;
            }
        }
    }

    /// Verifies the structural invariants of §8 item 1: positions agree with
    /// layer order, edges span exactly one layer, adjacency lists agree with
    /// the edge list. Intended for tests and debug assertions, not hot paths.
    pub fn check_invariants(&self) {
        for (layer_idx, layer) in self.layers.iter().enumerate() {
            for (p, &id) in layer.nodes.iter().enumerate() {
                let node = self.node(id);
                assert_eq!(node.layer as usize, layer_idx, "node {id} layer mismatch");
                assert_eq!(node.position as usize, p, "node {id} position mismatch");
            }
        }
        for edge in &self.edges {
            let down = self.node(edge.down);
            let up = self.node(edge.up);
            assert_eq!(up.layer, down.layer + 1, "edge {} spans non-adjacent layers", edge.id);
            assert!(
                down.up_edges.contains(&edge.id),
                "edge {} missing from down endpoint's up_edges",
                edge.id
            );
            assert!(
                up.down_edges.contains(&edge.id),
                "edge {} missing from up endpoint's down_edges",
                edge.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        let mut g = Graph::new("path");
        g.add_layer();
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(1, "b");
        let c = g.add_node(2, "c");
        g.add_edge(a, b);
        g.add_edge(b, c);
        g
    }

    #[test]
    fn builder_produces_consistent_adjacency() {
        let g = path_graph();
        g.check_invariants();
        assert_eq!(g.num_layers(), 3);
        assert_eq!(g.num_channels(), 2);
    }

    #[test]
    #[should_panic]
    fn add_edge_rejects_non_adjacent_layers() {
        let mut g = Graph::new("bad");
        g.add_layer();
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let c = g.add_node(2, "c");
        g.add_edge(a, c);
    }

    #[test]
    fn reposition_node_shifts_intervening_nodes() {
        let mut g = Graph::new("shift");
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(0, "b");
        let c = g.add_node(0, "c");
        g.reposition_node(a, 2);
        assert_eq!(g.layer(0).nodes, vec![b, c, a]);
        assert_eq!(g.node(a).position, 2);
        assert_eq!(g.node(b).position, 0);
        assert_eq!(g.node(c).position, 1);
    }

    #[test]
    fn save_and_restore_order_roundtrips() {
        let mut g = path_graph();
        let snap = g.save_order();
        g.swap_positions(0, 0, 0);
        let a = g.layer(1).nodes[0];
        g.node_mut(a).position = 0;
        g.restore_order(&snap);
        g.check_invariants();
        assert_eq!(g.save_order(), snap);
    }
}
