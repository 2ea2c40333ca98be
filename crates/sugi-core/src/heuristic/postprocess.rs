//! Post-processing swap optimization (§4.G's final paragraph): alternating
//! "even" and "odd" passes that each swap a layer-adjacent pair only when
//! both the layer index and the left slot's index share the pass's parity,
//! and only when the swap strictly reduces the two channels incident on
//! that layer. Intended to run after a driver terminates, on its best
//! recorded order — cheap, local, and monotone, so it can never make the
//! result worse.
//!
//! Per Design Notes §9 ("post-processing correctness"), this refreshes
//! every tracker (not just total crossings) once per pass, rather than
//! relying on the swap pass's own total-crossings-only acceptance rule to
//! keep bottleneck/stretch/Pareto state current.

use crate::graph::Graph;
use crate::objective::Tracker;

/// Runs alternating even/odd passes (§4.G), stopping as soon as a pass
/// makes no improving swap. Returns the number of swaps performed.
pub fn postprocess_swaps(graph: &mut Graph, tracker: &mut Tracker) -> usize {
    let mut total_swaps = 0usize;
    let mut parity_is_even = true;
    loop {
        let swapped = postprocess_pass(graph, parity_is_even);
        total_swaps += swapped;
        if swapped > 0 {
            tracker.update_all(graph);
        }
        if swapped == 0 {
            break;
        }
        parity_is_even = !parity_is_even;
    }
    graph.full_recount();
    total_swaps
}

/// One even (`even_layers_and_slots = true`) or odd pass: for every layer
/// `L` whose parity matches, and every slot `i` on that layer whose parity
/// matches, swap `nodes[L][i]` and `nodes[L][i+1]` iff doing so strictly
/// reduces the crossings of the (one or two) channels incident on `L`.
fn postprocess_pass(graph: &mut Graph, even_layers_and_slots: bool) -> usize {
    let mut swaps = 0usize;
    for layer in 0..graph.num_layers() {
        if graph.layer(layer).fixed {
            continue;
        }
        if (layer % 2 == 0) != even_layers_and_slots {
            continue;
        }
        let n = graph.layer_size(layer);
        for i in 0..n.saturating_sub(1) {
            if (i % 2 == 0) != even_layers_and_slots {
                continue;
            }
            let nodes = graph.layer(layer).nodes.clone();
            let (a, b) = (nodes[i], nodes[i + 1]);
            if graph.crossings_if_swapped(a, b) < graph.number_of_crossings() {
                graph.swap_positions(layer, i, i + 1);
                swaps += 1;
            }
        }
    }
    if swaps > 0 {
        graph.full_recount();
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Objective;

    #[test]
    fn postprocess_removes_a_single_adjacent_inversion() {
        let mut g = Graph::new("inv");
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(0, "b");
        let x = g.add_node(1, "x");
        let y = g.add_node(1, "y");
        g.add_edge(a, y);
        g.add_edge(b, x);
        g.full_recount();
        assert_eq!(g.number_of_crossings(), 1);
        let mut tracker = Tracker::new(Objective::TotalCrossings, None);
        postprocess_swaps(&mut g, &mut tracker);
        assert_eq!(g.number_of_crossings(), 0);
    }

    #[test]
    fn postprocess_never_increases_crossings() {
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
        g.full_recount();
        let before = g.number_of_crossings();
        let mut tracker = Tracker::new(Objective::TotalCrossings, None);
        postprocess_swaps(&mut g, &mut tracker);
        assert!(g.number_of_crossings() <= before);
    }

    #[test]
    fn postprocess_refreshes_bottleneck_tracker_on_accepted_swap() {
        let mut g = Graph::new("inv");
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(0, "b");
        let x = g.add_node(1, "x");
        let y = g.add_node(1, "y");
        g.add_edge(a, y);
        g.add_edge(b, x);
        g.full_recount();
        let mut tracker = Tracker::new(Objective::TotalCrossings, None);
        tracker.update_all(&g);
        assert_eq!(tracker.best(Objective::BottleneckCrossings), Some(1));
        postprocess_swaps(&mut g, &mut tracker);
        assert_eq!(tracker.best(Objective::BottleneckCrossings), Some(0));
    }
}
