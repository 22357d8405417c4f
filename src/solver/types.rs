//! Solver outcome types.

use crate::schedule::{PairHistogram, Schedule};
use std::fmt;
use std::time::Duration;

/// Quality guarantee attached to a returned schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven minimum penalty under the bye policy.
    Optimal,
    /// Exact search stopped early (budget, node or solution limit); the
    /// gap to the optimum is unproven.
    FeasibleBounded,
    /// Local-search result, no optimality guarantee.
    Heuristic,
    /// The schedule is complete and round-legal but breaks the meeting cap.
    Infeasible,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::FeasibleBounded => "feasible-bounded",
            SolverStatus::Heuristic => "heuristic",
            SolverStatus::Infeasible => "infeasible",
        })
    }
}

/// Engine that produced a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    Exact,
    Heuristic,
}

/// Run statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveStats {
    pub strategy: Strategy,
    /// Search nodes (exact) or proposed moves (heuristic).
    pub explored: usize,
    /// Branches cut by the bound (exact only).
    pub pruned: usize,
    /// Improving incumbents (exact) or improving moves (heuristic).
    pub improvements: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Everything a run hands back to its caller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveOutcome {
    pub schedule: Schedule,
    /// Sum over pairs of `max(meetings - 1, 0)`.
    pub total_penalty: u64,
    pub histogram: PairHistogram,
    pub status: SolverStatus,
    /// Proven lower bound on the penalty of any schedule the bye policy allows.
    pub lower_bound: u64,
    pub stats: SolveStats,
}

impl SolveOutcome {
    /// Number of distinct pairings realized.
    pub fn distinct_pairs(&self) -> usize {
        self.histogram.distinct_pairs()
    }
}
