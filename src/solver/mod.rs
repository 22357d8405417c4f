//! Solve orchestration.
//!
//! [`Scheduler`] validates an [`EventShape`](crate::schedule::EventShape),
//! plans a starting bye order, builds a greedy incumbent and the root lower bound,
//! then hands the remaining budget to exact search for small events or to
//! simulated annealing otherwise. The returned [`SolveOutcome`] is
//! re-validated and its penalty recomputed from scratch.

mod config;
mod runner;
mod types;

pub use config::{SolveConfig, StrategyHint};
pub use runner::Scheduler;
pub use types::{SolveOutcome, SolveStats, SolverStatus, Strategy};
