//! Recoverable engine conditions.
//!
//! Invariant violations (a malformed graph, an out-of-range position) are
//! programming errors and stay `panic!`/`debug_assert!` per §7 — they never
//! surface here. This enum is only for conditions a caller can legitimately
//! hit and recover from.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no snapshot has been recorded for objective {0:?}")]
    NoSnapshot(crate::objective::Objective),
}

pub type Result<T> = std::result::Result<T, Error>;
