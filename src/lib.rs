//! Round-constrained matchup scheduling.
//!
//! Given `P` participants, `R` rounds and `G` two-player games per round,
//! builds a schedule in which every participant appears at most once per
//! round, exactly `P - 2G` participants rest each round, and the number of
//! repeated pairings is as small as the search can make it:
//!
//! ```text
//! penalty = sum over pairs of max(meetings - 1, 0)
//! ```
//!
//! Two engines share one pairing ledger and one bye policy:
//!
//! - **Exact**: branch-and-bound over whole rounds, pruned by a pigeonhole
//!   lower bound, with first-round symmetry breaking. Branches over every
//!   fair choice of resting participants and proves optimality for small
//!   events.
//! - **Anneal**: simulated annealing over full schedules with in-round
//!   exchange, bye-swap and greedy-reseed moves.
//!
//! # Modules
//!
//! - [`schedule`]: participants, pairs, rounds, schedules, histograms
//! - [`ledger`]: incremental pair counts with checkpoint/restore
//! - [`feasibility`]: bye planning, greedy rounds, round enumeration
//! - [`exact`]: branch-and-bound search
//! - [`anneal`]: simulated annealing
//! - [`solver`]: strategy selection and the end-to-end run
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use u_matchup::{solve, SolverStatus, StrategyHint};
//!
//! let outcome = solve(4, 3, 2, Duration::from_secs(1), StrategyHint::Auto).unwrap();
//! assert_eq!(outcome.total_penalty, 0);
//! assert_eq!(outcome.status, SolverStatus::Optimal);
//! ```

pub mod anneal;
pub mod budget;
pub mod error;
pub mod exact;
pub mod feasibility;
pub mod ledger;
pub mod schedule;
pub mod solver;

pub use error::ScheduleError;
pub use schedule::{EventShape, Game, Pair, PairHistogram, ParticipantId, Round, Schedule};
pub use solver::{Scheduler, SolveConfig, SolveOutcome, SolveStats, SolverStatus, StrategyHint};

use std::time::Duration;

/// Seed used by [`solve`] so that repeated calls agree when local search
/// is not cut short by the clock.
pub const DEFAULT_SEED: u64 = 0x6d61_7463_6875_70;

/// Schedules `participants` over `rounds` rounds of `games_per_round`
/// games within `time_budget`.
///
/// Uses the default configuration with [`DEFAULT_SEED`]; build a
/// [`SolveConfig`] and call [`Scheduler::solve`] for anything else.
///
/// # Errors
///
/// [`ScheduleError::InvalidConfig`] if `participants` or `rounds` is zero
/// or `2 * games_per_round > participants`.
pub fn solve(
    participants: usize,
    rounds: usize,
    games_per_round: usize,
    time_budget: Duration,
    strategy: StrategyHint,
) -> Result<SolveOutcome, ScheduleError> {
    let config = SolveConfig::default()
        .with_strategy(strategy)
        .with_time_budget(time_budget)
        .with_seed(DEFAULT_SEED);
    Scheduler::solve(EventShape::new(participants, rounds, games_per_round), &config)
}
