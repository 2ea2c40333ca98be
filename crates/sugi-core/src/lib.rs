//! Heuristic engine for minimizing edge crossings in layered-graph drawings.
//!
//! The graph store (`graph`), crossing/stretch counters (`crossing`,
//! `stretch`), objective tracker (`objective`), sort/weight primitives
//! (`weight`), sifting primitive (`sift`), and heuristic drivers
//! (`heuristic`) are the engine proper; `config` and `error` are the ambient
//! configuration and error-handling surface around them.

pub mod config;
pub mod crossing;
pub mod error;
pub mod graph;
pub mod heuristic;
pub mod ids;
pub mod objective;
pub mod sift;
pub mod stretch;
pub mod weight;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use graph::{Graph, OrderSnapshot};
pub use ids::{EdgeId, NodeId};
pub use objective::Objective;
