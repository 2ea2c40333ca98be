//! Black-box scenario tests (§8's numbered table): fixed small graphs run
//! through a named heuristic for 1,000 iterations with no randomization and
//! no post-processing, checked against the expected best total crossings.

use sugi_core::config::{EngineConfig, HeuristicKind, MceMode, WeightCarryPolicy};
use sugi_core::heuristic::{postprocess_swaps, Engine};
use sugi_core::{Graph, Objective};

fn config(heuristic: HeuristicKind) -> EngineConfig {
    EngineConfig {
        heuristic,
        primary_objective: Objective::TotalCrossings,
        pareto_pair: None,
        max_iterations: Some(1000),
        max_runtime: None,
        seed: 0,
        weight_carry: WeightCarryPolicy::Left,
        balanced_weight: false,
        mce_mode: MceMode::Nodes,
        sift_randomize: false,
        trace_every: 10_000,
        capture_iteration: None,
    }
}

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

/// Scenario 1 (§8's table lists this as converging to 3): a *complete*
/// bipartite K3,3 with every one of its 9 edges present has a total
/// crossing count that is mathematically invariant under any permutation of
/// either layer — for any two nodes on one side and any two on the other,
/// exactly one of the two possible cross-pairings inverts, regardless of
/// position, so the total is always `C(3,2) * C(3,2) = 9` (matching
/// `crossing::tests::k33_has_nine_crossings_in_natural_order`). No
/// heuristic can move a complete bipartite graph's crossing count at all,
/// let alone down to 3 (see DESIGN.md's Open Questions). This test asserts
/// the value that is actually reachable — and, since it's a fixed point,
/// doubles as a check that `barycenter` doesn't regress it.
#[test]
fn scenario_1_complete_k33_crossings_are_invariant_at_nine() {
    let mut engine = Engine::new(k33(), config(HeuristicKind::Barycenter));
    let report = engine.run();
    assert_eq!(report.best, 9);
}

/// Scenario 2: a 5-layer path (one node per layer, 4 edges) has no
/// crossings to begin with, under any heuristic.
#[test]
fn scenario_2_path_graph_has_zero_crossings_under_any_heuristic() {
    for heuristic in [
        HeuristicKind::Median,
        HeuristicKind::Barycenter,
        HeuristicKind::ModBarycenter,
        HeuristicKind::Mcn,
        HeuristicKind::Sifting,
        HeuristicKind::Mce,
        HeuristicKind::MceS,
        HeuristicKind::Mse,
    ] {
        let mut g = Graph::new("path");
        let mut prev = None;
        for _ in 0..5 {
            let layer = g.add_layer();
            let node = g.add_node(layer, format!("n{layer}"));
            if let Some(p) = prev {
                g.add_edge(p, node);
            }
            prev = Some(node);
        }
        let mut engine = Engine::new(g, config(heuristic));
        let report = engine.run();
        assert_eq!(report.best, 0, "{heuristic:?} should find zero crossings on a path");
    }
}

/// Scenario 3: two layers of 4 with a "perfect shuffle" reversal pairing —
/// a pure mirror permutation that a barycenter sweep resolves to zero.
#[test]
fn scenario_3_perfect_shuffle_barycenter_converges_to_zero() {
    let mut g = Graph::new("shuffle");
    g.add_layer();
    g.add_layer();
    let down: Vec<_> = (1..=4).map(|i| g.add_node(0, format!("n{i}"))).collect();
    let up: Vec<_> = (5..=8).map(|i| g.add_node(1, format!("n{i}"))).collect();
    // e (1 8) e (2 7) e (3 6) e (4 5): node i (1-indexed, position i-1) to
    // node (9-i).
    g.add_edge(down[0], up[3]); // 1-8
    g.add_edge(down[1], up[2]); // 2-7
    g.add_edge(down[2], up[1]); // 3-6
    g.add_edge(down[3], up[0]); // 4-5

    let mut engine = Engine::new(g, config(HeuristicKind::Barycenter));
    let report = engine.run();
    assert_eq!(report.best, 0);
}

/// Scenario 4 (§8's table lists this as converging to 6): same invariance
/// as scenario 1 applies per channel — each of the two K3,3 channels
/// contributes a fixed 9 crossings no matter the order of any layer, so the
/// reachable total here is `9 + 9 = 18`, not 6 (see DESIGN.md). Asserts the
/// true fixed point.
#[test]
fn scenario_4_three_layer_full_bipartite_crossings_are_invariant_at_eighteen() {
    let mut g = Graph::new("tripartite");
    g.add_layer();
    g.add_layer();
    g.add_layer();
    let l0: Vec<_> = (0..3).map(|i| g.add_node(0, format!("a{i}"))).collect();
    let l1: Vec<_> = (0..3).map(|i| g.add_node(1, format!("b{i}"))).collect();
    let l2: Vec<_> = (0..3).map(|i| g.add_node(2, format!("c{i}"))).collect();
    for &a in &l0 {
        for &b in &l1 {
            g.add_edge(a, b);
        }
    }
    for &b in &l1 {
        for &c in &l2 {
            g.add_edge(b, c);
        }
    }

    let mut engine = Engine::new(g, config(HeuristicKind::ModBarycenter));
    let report = engine.run();
    assert_eq!(report.best, 18);
}

/// `mod_bary` on a solvable instance: §8's own tripartite fixture is a
/// complete bipartite graph per channel, whose crossing count can't move at
/// all (see scenario 4's doc comment), so it can't tell a correct modified-
/// barycenter pass from a broken one. This reuses scenario 3's perfect-
/// shuffle reversal, chained across two channels, which a fixing driver
/// must still resolve to zero.
#[test]
fn mod_barycenter_resolves_chained_perfect_shuffle_to_zero() {
    let mut g = Graph::new("shuffle-chain");
    g.add_layer();
    g.add_layer();
    g.add_layer();
    let l0: Vec<_> = (1..=4).map(|i| g.add_node(0, format!("a{i}"))).collect();
    let l1: Vec<_> = (5..=8).map(|i| g.add_node(1, format!("b{i}"))).collect();
    let l2: Vec<_> = (9..=12).map(|i| g.add_node(2, format!("c{i}"))).collect();
    for i in 0..4 {
        g.add_edge(l0[i], l1[3 - i]);
        g.add_edge(l1[i], l2[3 - i]);
    }

    let mut engine = Engine::new(g, config(HeuristicKind::ModBarycenter));
    let report = engine.run();
    assert_eq!(report.best, 0);
}

/// Scenario 5: two layers of 5 with a one-edge-per-node matching that
/// starts at 8 crossings; a single sifting pass must not increase it.
#[test]
fn scenario_5_sifting_never_increases_eight_crossings() {
    let mut g = Graph::new("matching");
    g.add_layer();
    g.add_layer();
    let a: Vec<_> = (0..5).map(|i| g.add_node(0, format!("a{i}"))).collect();
    let b: Vec<_> = (0..5).map(|i| g.add_node(1, format!("b{i}"))).collect();
    // Permutation [3, 4, 2, 0, 1]: exactly 8 inversions among 5 elements
    // (max for n=5 is 10, the full reversal).
    let perm = [3usize, 4, 2, 0, 1];
    for (i, &p) in perm.iter().enumerate() {
        g.add_edge(a[i], b[p]);
    }
    g.full_recount();
    assert_eq!(g.number_of_crossings(), 8);

    let mut config = config(HeuristicKind::Sifting);
    config.max_iterations = Some(1);
    let mut engine = Engine::new(g, config);
    let report = engine.run();
    assert!(report.best <= 8, "a sifting pass must not increase crossings, got {}", report.best);
}

/// Scenario 6: mce followed by the post-processing swap pass must never do
/// worse than mce alone.
#[test]
fn scenario_6_postprocessing_never_worsens_mce_result() {
    let mut engine = Engine::new(k33(), config(HeuristicKind::Mce));
    let report = engine.run();
    let mce_best = report.best;

    engine.tracker.restore_best(Objective::TotalCrossings, &mut engine.graph).unwrap();
    postprocess_swaps(&mut engine.graph, &mut engine.tracker);
    assert!(engine.graph.number_of_crossings() <= mce_best);
}
