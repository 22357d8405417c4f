//! Local search by simulated annealing.
//!
//! Starts from a greedy full schedule and repeatedly rewrites one round:
//! swapping a participant between two games, swapping a player with a
//! resting participant, or rebuilding the round greedily with its repeated
//! pairs forbidden. Rejected moves are reverted through the ledger's
//! checkpoints.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod config;
mod moves;
mod runner;

pub use config::{AnnealConfig, CoolingSchedule};
pub use runner::{AnnealResult, AnnealRunner};
