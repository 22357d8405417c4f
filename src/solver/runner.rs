//! End-to-end solve driver.

use super::config::{SolveConfig, StrategyHint};
use super::types::{SolveOutcome, SolveStats, SolverStatus, Strategy};
use crate::anneal::AnnealRunner;
use crate::budget::Budget;
use crate::error::ScheduleError;
use crate::exact::{repeat_lower_bound, ExactRunner};
use crate::feasibility::SearchSpace;
use crate::schedule::{EventShape, PairHistogram};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Owns a complete scheduling run: validation, strategy choice, seeding,
/// search under the time budget, and the final checks.
pub struct Scheduler;

impl Scheduler {
    /// Solves `shape` under `config`.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::InvalidConfig`] for zero participants or rounds,
    ///   `2G > P`, or an invalid configuration; no search is attempted
    /// - [`ScheduleError::InvalidPair`] / [`ScheduleError::IllegalRound`] if
    ///   an internal invariant breaks
    ///
    /// An expired budget is not an error: the best schedule found so far is
    /// returned with a non-optimal status.
    pub fn solve(shape: EventShape, config: &SolveConfig) -> Result<SolveOutcome, ScheduleError> {
        Self::solve_with_cancel(shape, config, None)
    }

    /// Solves with an optional cancellation token.
    ///
    /// Raising the flag makes the search return its incumbent at the next
    /// round or iteration boundary.
    pub fn solve_with_cancel(
        shape: EventShape,
        config: &SolveConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SolveOutcome, ScheduleError> {
        shape.validate()?;
        config.validate().map_err(ScheduleError::InvalidConfig)?;

        let started = Instant::now();
        let budget = Budget::with_time_limit(config.time_budget).with_cancel(cancel);
        let space = SearchSpace::new(shape, config.bye_policy, config.max_meetings)?;
        let strategy = choose_strategy(&shape, config);

        tracing::info!(
            participants = shape.participants,
            rounds = shape.rounds,
            games_per_round = shape.games_per_round,
            ?strategy,
            "solving matchup schedule"
        );

        let greedy = space.greedy_schedule()?;
        let lower_bound = repeat_lower_bound(&space);

        let (schedule, status, stats) = match strategy {
            Strategy::Exact => {
                let result = ExactRunner::run(&space, &config.exact, &greedy, &budget)?;
                let status = if !result.cap_satisfied {
                    SolverStatus::Infeasible
                } else if result.optimal {
                    SolverStatus::Optimal
                } else {
                    SolverStatus::FeasibleBounded
                };
                let stats = SolveStats {
                    strategy,
                    explored: result.nodes,
                    pruned: result.pruned,
                    improvements: result.incumbents,
                    elapsed: started.elapsed(),
                    cancelled: result.cancelled,
                };
                (result.best, status, stats)
            }
            Strategy::Heuristic => {
                let result = AnnealRunner::run(&space, &config.anneal, &greedy, lower_bound, &budget)?;
                let status = if result.cap_satisfied {
                    SolverStatus::Heuristic
                } else {
                    SolverStatus::Infeasible
                };
                let stats = SolveStats {
                    strategy,
                    explored: result.iterations,
                    pruned: 0,
                    improvements: result.improving_moves,
                    elapsed: started.elapsed(),
                    cancelled: result.cancelled,
                };
                (result.best, status, stats)
            }
        };

        schedule.validate()?;
        let ledger = space.ledger_of(&schedule)?;
        let total_penalty = schedule.total_penalty();
        debug_assert_eq!(ledger.total_penalty(), total_penalty);
        debug_assert_eq!(ledger.cap_excess() > 0, status == SolverStatus::Infeasible);

        tracing::info!(
            %status,
            penalty = total_penalty,
            lower_bound,
            distinct_pairs = ledger.distinct_pairs(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "matchup schedule solved"
        );

        Ok(SolveOutcome {
            histogram: PairHistogram::from_schedule(&schedule),
            schedule,
            total_penalty,
            status,
            lower_bound,
            stats,
        })
    }
}

/// Exact search for small events, local search otherwise.
fn choose_strategy(shape: &EventShape, config: &SolveConfig) -> Strategy {
    match config.strategy {
        StrategyHint::Exact => Strategy::Exact,
        StrategyHint::Heuristic => Strategy::Heuristic,
        StrategyHint::Auto => {
            if shape.participants <= config.exact_max_participants
                && shape.rounds <= config.exact_max_rounds
            {
                Strategy::Exact
            } else {
                Strategy::Heuristic
            }
        }
    }
}
