//! Event data model.
//!
//! - [`Pair`] / [`Game`]: an unordered pair of distinct participants
//! - [`Round`]: `G` games plus the resting participants
//! - [`Schedule`]: `R` rounds, immutable once returned by the solver
//! - [`PairHistogram`]: per-pair meeting counts of a finished schedule

mod histogram;
mod types;

pub use histogram::PairHistogram;
pub(crate) use types::exceeds_seats;
pub use types::{EventShape, Game, Pair, ParticipantId, Round, Schedule};
