//! Pairing ledger.
//!
//! Tracks how often every unordered pair of participants has met, plus
//! per-participant bye and game totals. The ledger is exclusively owned by
//! whichever search state holds it; backtracking uses journaled
//! [`Checkpoint`]s instead of copying the count matrix.

mod counts;

pub use counts::{penalty, Checkpoint, PairingLedger};
