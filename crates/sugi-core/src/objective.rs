//! The objective tracker (component D).
//!
//! Tracks current/best values for every objective the heuristics care about,
//! captures an [`OrderSnapshot`] each time an objective improves, and keeps
//! an optional two-objective Pareto frontier for drivers that report a
//! trade-off rather than a single winner.

use crate::error::{Error, Result};
use crate::graph::{Graph, OrderSnapshot};

/// The set of quantities the engine can optimize or merely observe. See
/// SPEC_FULL.md Open Question 4 for `FavoredCrossings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    TotalCrossings,
    BottleneckCrossings,
    TotalStretch,
    BottleneckStretch,
    FavoredCrossings,
}

impl Objective {
    pub const ALL: [Objective; 5] = [
        Objective::TotalCrossings,
        Objective::BottleneckCrossings,
        Objective::TotalStretch,
        Objective::BottleneckStretch,
        Objective::FavoredCrossings,
    ];

    fn slot(self) -> usize {
        match self {
            Objective::TotalCrossings => 0,
            Objective::BottleneckCrossings => 1,
            Objective::TotalStretch => 2,
            Objective::BottleneckStretch => 3,
            Objective::FavoredCrossings => 4,
        }
    }

    fn measure(self, graph: &Graph) -> u64 {
        match self {
            Objective::TotalCrossings => graph.number_of_crossings(),
            Objective::BottleneckCrossings => graph.edges.iter().map(|e| e.crossings).max().unwrap_or(0),
            Objective::TotalStretch => graph.total_stretch(),
            Objective::BottleneckStretch => {
                graph.max_stretch_edge().map(|e| graph.edge_stretch(e)).unwrap_or(0)
            }
            Objective::FavoredCrossings => graph
                .edges
                .iter()
                .filter(|e| !e.fixed)
                .map(|e| e.crossings)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Record {
    current: u64,
    best: Option<u64>,
    best_iteration: u64,
    snapshot: Option<OrderSnapshot>,
}

/// A two-objective Pareto frontier of non-dominated `(a, b)` points, both
/// minimized.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    points: Vec<(u64, u64)>,
}

impl Frontier {
    pub fn points(&self) -> &[(u64, u64)] {
        &self.points
    }

    fn offer(&mut self, point: (u64, u64)) -> bool {
        if self.points.iter().any(|&p| dominates(p, point)) {
            return false;
        }
        self.points.retain(|&p| !dominates(point, p));
        self.points.push(point);
        true
    }
}

fn dominates(a: (u64, u64), b: (u64, u64)) -> bool {
    a.0 <= b.0 && a.1 <= b.1 && a != b
}

/// Tracks every [`Objective`], drives improvement detection, and restores
/// the best order seen for a given objective.
#[derive(Debug, Clone)]
pub struct Tracker {
    primary: Objective,
    records: [Record; 5],
    improved_this_update: [bool; 5],
    iteration: u64,
    pareto_pair: Option<(Objective, Objective)>,
    frontier: Frontier,
}

impl Tracker {
    pub fn new(primary: Objective, pareto_pair: Option<(Objective, Objective)>) -> Self {
        Tracker {
            primary,
            records: Default::default(),
            improved_this_update: [false; 5],
            iteration: 0,
            pareto_pair,
            frontier: Frontier::default(),
        }
    }

    pub fn primary(&self) -> Objective {
        self.primary
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn current(&self, obj: Objective) -> u64 {
        self.records[obj.slot()].current
    }

    pub fn best(&self, obj: Objective) -> Option<u64> {
        self.records[obj.slot()].best
    }

    /// Recomputes every tracked objective from `graph`, advances the
    /// iteration counter, records a snapshot for any objective that just
    /// reached a new best, and updates the Pareto frontier if configured.
    /// Returns whether the primary objective improved.
    pub fn update_all(&mut self, graph: &Graph) -> bool {
        self.iteration += 1;
        self.improved_this_update = [false; 5];
        for obj in Objective::ALL {
            let value = obj.measure(graph);
            let slot = obj.slot();
            self.records[slot].current = value;
            let improved = match self.records[slot].best {
                None => true,
                Some(best) => value < best,
            };
            if improved {
                self.records[slot].best = Some(value);
                self.records[slot].best_iteration = self.iteration;
                self.records[slot].snapshot = Some(graph.save_order());
                self.improved_this_update[slot] = true;
            }
        }
        if let Some((a, b)) = self.pareto_pair {
            self.frontier.offer((self.current(a), self.current(b)));
        }
        self.improved_this_update[self.primary.slot()]
    }

    pub fn has_improved(&self, obj: Objective) -> bool {
        self.improved_this_update[obj.slot()]
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Restores `graph` to the best order recorded for `obj`.
    pub fn restore_best(&self, obj: Objective, graph: &mut Graph) -> Result<()> {
        let snapshot = self.records[obj.slot()].snapshot.as_ref().ok_or(Error::NoSnapshot(obj))?;
        graph.restore_order(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        let mut g = Graph::new("path");
        g.add_layer();
        g.add_layer();
        let a = g.add_node(0, "a");
        let b = g.add_node(1, "b");
        g.add_edge(a, b);
        g.full_recount();
        g
    }

    #[test]
    fn tracker_records_best_on_first_update() {
        let g = path_graph();
        let mut t = Tracker::new(Objective::TotalCrossings, None);
        let improved = t.update_all(&g);
        assert!(improved);
        assert_eq!(t.best(Objective::TotalCrossings), Some(0));
    }

    #[test]
    fn tracker_only_improves_on_strict_decrease() {
        let mut g = path_graph();
        let mut t = Tracker::new(Objective::TotalCrossings, None);
        t.update_all(&g);
        g.full_recount();
        let improved_again = t.update_all(&g);
        assert!(!improved_again);
    }

    #[test]
    fn restore_best_recovers_recorded_order() {
        let mut g = path_graph();
        let mut t = Tracker::new(Objective::TotalCrossings, None);
        t.update_all(&g);
        let a = g.layer(0).nodes[0];
        g.node_mut(a).position = 0;
        t.restore_best(Objective::TotalCrossings, &mut g).unwrap();
        g.check_invariants();
    }

    #[test]
    fn frontier_drops_dominated_points() {
        let mut f = Frontier::default();
        assert!(f.offer((5, 5)));
        assert!(f.offer((3, 6)));
        assert!(!f.offer((4, 7)));
        assert!(f.points().contains(&(3, 6)));
    }
}
