//! The eight named heuristic drivers, built from the primitives in
//! `crate::weight` and `crate::sift`.

use super::{Engine, Report};
use crate::sift::SiftObjective;
use crate::weight::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WeightKind {
    Median,
    Barycenter,
}

/// Shared loop for `median` and `barycenter`: alternate top-down and
/// bottom-up weighted resorts, alternating direction every pass and
/// toggling `bias_right` every other pass, tracking the primary objective
/// after every full sweep. `mod_bary` has a fundamentally different pass
/// shape (§4.G) and is driven by [`run_mod_barycenter`] instead.
pub(super) fn run_weighted_sweep(engine: &mut Engine, kind: WeightKind) -> Report {
    let mut pass = 0u64;
    let mut stale = 0u64;
    loop {
        pass += 1;
        let bias_right = (pass % 4) >= 2;
        let downward = pass % 2 == 1;
        let carry = engine.config.weight_carry;
        let num_layers = engine.graph.num_layers();
        let mut improved = false;

        let layers: Box<dyn Iterator<Item = usize>> = if downward {
            Box::new(1..num_layers)
        } else {
            Box::new((0..num_layers.saturating_sub(1)).rev())
        };
        let orientation = if downward { Orientation::Down } else { Orientation::Up };
        for layer in layers {
            if engine.graph.layer(layer).fixed {
                continue;
            }
            match kind {
                WeightKind::Median => engine.graph.assign_median(layer, orientation, carry),
                WeightKind::Barycenter => {
                    engine.graph.assign_barycenter(layer, orientation, carry, engine.config.balanced_weight)
                }
            }
            engine.graph.layer_sort(layer, bias_right);
            improved |= engine.record();
        }

        stale = if improved { 0 } else { stale + 1 };
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, crossings = engine.graph.number_of_crossings(), "weighted sweep pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}

fn layer_crossing_load(graph: &crate::graph::Graph, layer: usize) -> u64 {
    let mut total = 0u64;
    if layer > 0 {
        total += graph.channel_crossings[layer - 1];
    }
    if layer < graph.num_channels() {
        total += graph.channel_crossings[layer];
    }
    total
}

/// `mod_bary`: clears all layer-fixed flags at pass start; then repeatedly
/// picks the unfixed layer bearing the most crossings (summed over its one
/// or two incident channels), sorts it by the balanced-or-pooled `Both`
/// barycenter, fixes it, and does one upward sweep of the layers above it
/// (ascending, sorted by downward neighbors) and one downward sweep of the
/// layers below it (descending, sorted by upward neighbors) — the same
/// sweep directions `median`/`barycenter` use, restricted to the layers on
/// each side of the just-fixed one. The pass ends when every layer is
/// fixed.
pub(super) fn run_mod_barycenter(engine: &mut Engine) -> Report {
    let mut pass = 0u64;
    let mut stale = 0u64;
    loop {
        pass += 1;
        for layer in &mut engine.graph.layers {
            layer.fixed = false;
        }
        engine.graph.full_recount();
        let mut improved = false;

        loop {
            let num_layers = engine.graph.num_layers();
            let worst = (0..num_layers)
                .filter(|&l| !engine.graph.layer(l).fixed)
                .max_by_key(|&l| (layer_crossing_load(&engine.graph, l), std::cmp::Reverse(l)));
            let Some(layer) = worst else { break };

            let carry = engine.config.weight_carry;
            engine.graph.assign_barycenter(layer, Orientation::Both, carry, engine.config.balanced_weight);
            engine.graph.layer_sort(layer, false);
            engine.graph.layers[layer].fixed = true;
            improved |= engine.record();

            for l in (layer + 1)..num_layers {
                if engine.graph.layer(l).fixed {
                    continue;
                }
                engine.graph.assign_barycenter(l, Orientation::Down, carry, engine.config.balanced_weight);
                engine.graph.layer_sort(l, false);
                improved |= engine.record();
            }
            for l in (0..layer).rev() {
                if engine.graph.layer(l).fixed {
                    continue;
                }
                engine.graph.assign_barycenter(l, Orientation::Up, carry, engine.config.balanced_weight);
                engine.graph.layer_sort(l, false);
                improved |= engine.record();
            }
        }

        stale = if improved { 0 } else { stale + 1 };
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, crossings = engine.graph.number_of_crossings(), "mod_bary pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}

fn node_crossing_load(engine: &Engine, node: crate::ids::NodeId) -> u64 {
    let n = engine.graph.node(node);
    n.up_edges
        .iter()
        .chain(n.down_edges.iter())
        .map(|&e| engine.graph.edge(e).crossings)
        .sum()
}

/// `mcn`: clears all node-fixed flags at pass start, then repeatedly picks
/// the unfixed node with the largest crossing load, total-sifts it, and
/// fixes it. The pass ends when every node is fixed; the outer loop (and
/// its stale-pass counter) tracks one such pass as a single unit of
/// termination bookkeeping.
pub(super) fn run_mcn(engine: &mut Engine) -> Report {
    let mut pass = 0u64;
    let mut stale = 0u64;
    loop {
        pass += 1;
        for node in &mut engine.graph.nodes {
            node.fixed = false;
        }
        engine.graph.full_recount();
        let mut improved = false;
        loop {
            let worst = engine
                .graph
                .nodes
                .iter()
                .filter(|n| !n.fixed)
                .max_by_key(|n| (node_crossing_load(engine, n.id), std::cmp::Reverse(n.id)))
                .map(|n| n.id);
            let Some(node) = worst else { break };
            engine.graph.sift_node(node, SiftObjective::Total);
            engine.graph.node_mut(node).fixed = true;
            improved |= engine.record();
        }
        stale = if improved { 0 } else { stale + 1 };
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, crossings = engine.graph.number_of_crossings(), "mcn pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}

fn node_degree(graph: &crate::graph::Graph, node: crate::ids::NodeId) -> usize {
    let n = graph.node(node);
    n.up_edges.len() + n.down_edges.len()
}

/// `sifting`: sorts the node list once by ascending degree, then sifts every
/// node in decreasing-degree order each pass. A pass that fails to improve
/// the total flips the traversal to increasing-degree order for the next
/// attempt (§4.G); `engine.should_stop`'s own single-stale-pass rule is what
/// actually ends a standard-mode run — the direction flip only matters when
/// a configured iteration/runtime bound keeps the driver going past that
/// point, giving it a different node order to try next.
pub(super) fn run_sifting(engine: &mut Engine) -> Report {
    use rand::seq::SliceRandom;

    let mut order: Vec<crate::ids::NodeId> = engine.graph.nodes.iter().map(|n| n.id).collect();
    order.sort_by_key(|&id| node_degree(&engine.graph, id));

    let mut pass = 0u64;
    let mut stale = 0u64;
    let mut descending = true;
    loop {
        pass += 1;
        if engine.config.sift_randomize {
            order.shuffle(&mut engine.rng);
            order.sort_by_key(|&id| node_degree(&engine.graph, id));
        }
        let traversal: Vec<crate::ids::NodeId> =
            if descending { order.iter().rev().copied().collect() } else { order.clone() };
        let mut improved = false;
        for node in traversal {
            engine.graph.sift_node(node, SiftObjective::Total);
            improved |= engine.record();
        }
        if improved {
            stale = 0;
        } else {
            stale += 1;
            descending = !descending;
        }
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, descending, crossings = engine.graph.number_of_crossings(), "sifting pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}

/// `mce`/`mce-s`: clears node- and edge-fixed flags at pass start, then
/// repeatedly picks the unfixed edge with the largest crossing count and
/// disposes of it per `mce_mode` (§4.G's `{NODES, EDGES, EARLY, ONE_NODE}`).
/// `mce-s` (`use_total_sifter`) is "like mce/NODES, but uses the total
/// sifter on each endpoint instead of the edge sifter" — it forces `NODES`
/// regardless of the configured mode, matching that wording exactly.
pub(super) fn run_mce(engine: &mut Engine, use_total_sifter: bool) -> Report {
    use crate::config::MceMode;

    let mode = if use_total_sifter { MceMode::Nodes } else { engine.config.mce_mode };
    let sift_objective = if use_total_sifter { SiftObjective::Total } else { SiftObjective::Edge };

    let mut pass = 0u64;
    let mut stale = 0u64;
    loop {
        pass += 1;
        for node in &mut engine.graph.nodes {
            node.fixed = false;
        }
        for edge in &mut engine.graph.edges {
            edge.fixed = false;
        }
        engine.graph.full_recount();
        let mut improved = false;

        loop {
            let worst = engine
                .graph
                .edges
                .iter()
                .filter(|e| !e.fixed)
                .max_by_key(|e| (e.crossings, std::cmp::Reverse(e.id)))
                .map(|e| e.id);
            let Some(edge_id) = worst else { break };
            let (down, up) = {
                let e = engine.graph.edge(edge_id);
                (e.down, e.up)
            };
            let (down_fixed, up_fixed) = (engine.graph.node(down).fixed, engine.graph.node(up).fixed);

            if matches!(mode, MceMode::Early) && down_fixed && up_fixed {
                break;
            }

            match mode {
                MceMode::Edges => {
                    engine.graph.sift_node(down, sift_objective);
                    engine.graph.sift_node(up, sift_objective);
                }
                MceMode::Nodes | MceMode::Early => {
                    if !down_fixed {
                        engine.graph.sift_node(down, sift_objective);
                        engine.graph.node_mut(down).fixed = true;
                    }
                    if !up_fixed {
                        engine.graph.sift_node(up, sift_objective);
                        engine.graph.node_mut(up).fixed = true;
                    }
                }
                MceMode::OneNode => {
                    let target = if node_crossing_load(engine, down) >= node_crossing_load(engine, up) {
                        down
                    } else {
                        up
                    };
                    engine.graph.sift_node(target, sift_objective);
                    engine.graph.node_mut(target).fixed = true;
                }
            }
            engine.graph.edge_mut(edge_id).fixed = true;
            improved |= engine.record();
        }

        stale = if improved { 0 } else { stale + 1 };
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, crossings = engine.graph.number_of_crossings(), "mce pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}

/// `mse`: "analogous to mce, but picks the unfixed edge with the largest
/// stretch and uses the total-stretch sifter" — same pass structure and
/// `mce_mode` fixing scheme as [`run_mce`], substituting stretch for
/// crossings as the ranking and sift objective.
pub(super) fn run_mse(engine: &mut Engine) -> Report {
    use crate::config::MceMode;

    let mut pass = 0u64;
    let mut stale = 0u64;
    loop {
        pass += 1;
        for node in &mut engine.graph.nodes {
            node.fixed = false;
        }
        for edge in &mut engine.graph.edges {
            edge.fixed = false;
        }
        let mut improved = false;

        loop {
            let worst = engine
                .graph
                .edges
                .iter()
                .filter(|e| !e.fixed)
                .max_by_key(|e| (engine.graph.edge_stretch(e.id), std::cmp::Reverse(e.id)))
                .map(|e| e.id);
            let Some(edge_id) = worst else { break };
            let (down, up) = {
                let e = engine.graph.edge(edge_id);
                (e.down, e.up)
            };
            let (down_fixed, up_fixed) = (engine.graph.node(down).fixed, engine.graph.node(up).fixed);

            if matches!(engine.config.mce_mode, MceMode::Early) && down_fixed && up_fixed {
                break;
            }

            match engine.config.mce_mode {
                MceMode::Edges => {
                    engine.graph.sift_node(down, SiftObjective::Stretch);
                    engine.graph.sift_node(up, SiftObjective::Stretch);
                }
                MceMode::Nodes | MceMode::Early => {
                    if !down_fixed {
                        engine.graph.sift_node(down, SiftObjective::Stretch);
                        engine.graph.node_mut(down).fixed = true;
                    }
                    if !up_fixed {
                        engine.graph.sift_node(up, SiftObjective::Stretch);
                        engine.graph.node_mut(up).fixed = true;
                    }
                }
                MceMode::OneNode => {
                    let target = if engine.graph.node_stretch(down) >= engine.graph.node_stretch(up) {
                        down
                    } else {
                        up
                    };
                    engine.graph.sift_node(target, SiftObjective::Stretch);
                    engine.graph.node_mut(target).fixed = true;
                }
            }
            engine.graph.edge_mut(edge_id).fixed = true;
            improved |= engine.record();
        }

        stale = if improved { 0 } else { stale + 1 };
        if pass % engine.config.trace_every.max(1) == 0 {
            tracing::debug!(pass, stretch = engine.graph.total_stretch(), "mse pass");
        }
        if let Some(t) = engine.should_stop(pass, stale) {
            return engine.finish(pass, t);
        }
    }
}
