//! Parsers and writers for the two textual formats the heuristic engine
//! (`sugi-core`) consumes and produces (§6.1, §6.2).
//!
//! Neither format is interpreted here beyond what's needed to populate or
//! serialize a [`sugi_core::Graph`] — name resolution, layer/position
//! bookkeeping, and validation live entirely in this crate so the engine
//! itself never has to know these formats exist.

pub mod dot_ord;
pub mod error;
pub mod sgf;

pub use error::{Error, Result};
