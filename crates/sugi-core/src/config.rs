//! Engine configuration (ambient, §4.J).
//!
//! One plain struct, built by the caller (`sugi-cli`'s argument parser, or a
//! test) as an explicit literal — there is no on-disk config file format;
//! configuration arrives as constructor arguments rather than a project
//! file.

use crate::objective::Objective;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicKind {
    Median,
    Barycenter,
    ModBarycenter,
    Mcn,
    Sifting,
    Mce,
    MceS,
    Mse,
}

/// Which endpoints mce fixes once its chosen edge has been sifted, per
/// §4.G's `{NODES, EDGES, EARLY, ONE_NODE}`. See SPEC_FULL.md Open
/// Question 2 for the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MceMode {
    /// Edge-sift both endpoints, then fix whichever of them isn't already
    /// fixed from an earlier pick.
    Nodes,
    /// Edge-sift both endpoints, but leave them unfixed; only the edge
    /// itself is marked fixed.
    Edges,
    /// Stop the pass as soon as the chosen edge's endpoints are already
    /// both fixed, without sifting again.
    Early,
    /// Sift only the endpoint with the larger `up_crossings + down_crossings`,
    /// then fix that one endpoint.
    OneNode,
}

/// The policy used by [`crate::weight`] assigners for a node with no
/// neighbors in the chosen orientation. See §4.E and SPEC_FULL.md Open
/// Question 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightCarryPolicy {
    /// The node is left unsortable (`weight = None`); `layer_sort` keeps it
    /// in its current slot.
    None,
    /// The node keeps whatever weight it last carried (its position in the
    /// previous sorted order), so it drifts with its neighbors instead of
    /// snapping back to "unsortable" every pass.
    Left,
    /// The node's weight is the mean of every other weighted node's weight
    /// on the same layer — a neutral "middle of the pack" placement.
    Avg,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub heuristic: HeuristicKind,
    pub primary_objective: Objective,
    pub pareto_pair: Option<(Objective, Objective)>,
    pub max_iterations: Option<u64>,
    pub max_runtime: Option<Duration>,
    pub seed: u64,
    /// Policy for isolated nodes during weight assignment. Default `Left`,
    /// per §4.E's stated default (SPEC_FULL.md Open Question 1).
    pub weight_carry: WeightCarryPolicy,
    /// §4.E's `balanced_weight` toggle: when `true`, `Orientation::Both`
    /// averages the up- and down-directed barycenters unweighted instead of
    /// pooling every neighbor into one count-weighted mean. Only affects
    /// `mod_bary`, the only driver that assigns weight from both sides at
    /// once. Default `false` (the pooled mean).
    pub balanced_weight: bool,
    pub mce_mode: MceMode,
    /// §4.G: "(optionally) randomly permute the [degree-sorted node] list
    /// and re-sort by degree" at the start of each `sifting` pass. Off by
    /// default so a fixed seed and `false` reproduce the same run as no
    /// seed at all (§8 scenario table runs with "no randomization").
    pub sift_randomize: bool,
    /// Emit the per-pass `tracing::debug!` event only every `trace_every`
    /// passes (§4.H's "trace-frequency switch"); `1` logs every pass.
    pub trace_every: u64,
    /// If set, the iteration counter value at which the engine should
    /// capture the current order (§4.G, §5). The write itself goes through
    /// a writer the caller injects with [`crate::heuristic::Engine::set_capture_writer`] —
    /// not part of this struct, since the destination is caller-owned state
    /// rather than configuration.
    pub capture_iteration: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            heuristic: HeuristicKind::Barycenter,
            primary_objective: Objective::TotalCrossings,
            pareto_pair: None,
            max_iterations: Some(24),
            max_runtime: None,
            seed: 0,
            weight_carry: WeightCarryPolicy::Left,
            balanced_weight: false,
            mce_mode: MceMode::Nodes,
            sift_randomize: false,
            trace_every: 1,
            capture_iteration: None,
        }
    }
}
