//! Exact branch-and-bound search.
//!
//! Explores partial schedules round by round, ordering each round's game
//! sets by the penalty they add and pruning with a pigeonhole lower bound
//! on unavoidable future repeats. First-round game sets that differ only
//! by relabeling participants with identical bye patterns are explored
//! once.
//!
//! # References
//!
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"
//! - Margot (2010), "Symmetry in Integer Linear Programming"

mod bound;
mod config;
mod runner;
mod symmetry;

pub use bound::repeat_lower_bound;
pub use config::ExactConfig;
pub use runner::{ExactResult, ExactRunner};
