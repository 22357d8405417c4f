//! Error taxonomy for matchup scheduling.

use thiserror::Error;

/// Errors surfaced by the scheduling core.
///
/// Timeouts are never errors: an expired budget yields the best complete
/// schedule found so far, tagged with a non-optimal status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The requested event dimensions or solver settings are unusable.
    ///
    /// Raised before any search is attempted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The feasibility layer cannot place a legal round: more game slots
    /// than participants.
    #[error(
        "infeasible configuration: {games_per_round} games per round need more than {participants} participants"
    )]
    InfeasibleConfig {
        participants: usize,
        games_per_round: usize,
    },

    /// A pair violates the ledger's invariants (self-pairing, unknown id,
    /// or retracting a game that was never recorded).
    ///
    /// This signals a programming defect and aborts the run.
    #[error("invalid pair ({a}, {b}): {reason}")]
    InvalidPair {
        a: usize,
        b: usize,
        reason: &'static str,
    },

    /// A finished round failed its legality check.
    #[error("illegal round {round}: {reason}")]
    IllegalRound { round: usize, reason: String },

    /// A ledger checkpoint was restored after a commit had invalidated it.
    ///
    /// Like [`ScheduleError::InvalidPair`], a programming defect.
    #[error("stale checkpoint from epoch {taken}, ledger is at epoch {current}")]
    StaleCheckpoint { taken: u64, current: u64 },
}
