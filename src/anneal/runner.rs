//! Annealing execution loop.

use super::config::{AnnealConfig, CoolingSchedule};
use super::moves::State;
use crate::budget::Budget;
use crate::error::ScheduleError;
use crate::feasibility::SearchSpace;
use crate::schedule::Schedule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of a local-search run.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    /// The best schedule found.
    pub best: Schedule,

    /// Penalty of the best schedule.
    pub best_penalty: u64,

    /// Whether the best schedule respects the meeting cap.
    pub cap_satisfied: bool,

    /// Total moves proposed, over all restarts.
    pub iterations: usize,

    /// Moves accepted (including improvements), over all restarts.
    pub accepted_moves: usize,

    /// Strictly improving moves, over all restarts.
    pub improving_moves: usize,

    /// Temperature when the winning run stopped.
    pub final_temperature: f64,

    /// Whether any run was cancelled externally.
    pub cancelled: bool,

    /// Best cost of the winning run, sampled at regular intervals.
    pub cost_history: Vec<u64>,

    /// Seed of the winning run.
    pub seed: u64,
}

/// Executes simulated annealing over full schedules.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs `config.restarts` independent annealing runs from `initial` and
    /// keeps the best.
    ///
    /// Restart `i` uses seed `seed + i`; with the `parallel` feature the
    /// runs execute on separate threads, each owning its own schedule copy
    /// and ledger. The winner is the lowest cost, then the lowest restart
    /// index, so results do not depend on thread timing.
    ///
    /// `target` is a proven lower bound; a run stops as soon as it reaches it.
    pub fn run(
        space: &SearchSpace,
        config: &AnnealConfig,
        initial: &Schedule,
        target: u64,
        budget: &Budget,
    ) -> Result<AnnealResult, ScheduleError> {
        let base_seed = config.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..config.restarts as u64)
            .map(|i| base_seed.wrapping_add(i))
            .collect();

        let single = |&seed: &u64| run_single(space, config, initial, target, budget, seed);

        #[cfg(feature = "parallel")]
        let runs: Vec<AnnealResult> = {
            use rayon::prelude::*;
            seeds.par_iter().map(single).collect::<Result<_, _>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let runs: Vec<AnnealResult> = seeds.iter().map(single).collect::<Result<_, _>>()?;

        let weight = space.cap_weight();
        let cost = |r: &AnnealResult| r.best_penalty + u64::from(!r.cap_satisfied) * weight;
        let iterations = runs.iter().map(|r| r.iterations).sum();
        let accepted_moves = runs.iter().map(|r| r.accepted_moves).sum();
        let improving_moves = runs.iter().map(|r| r.improving_moves).sum();
        let cancelled = runs.iter().any(|r| r.cancelled);

        let mut winner = None;
        for run in runs {
            if winner.as_ref().is_none_or(|w: &AnnealResult| cost(&run) < cost(w)) {
                winner = Some(run);
            }
        }
        let mut best = winner.ok_or_else(|| {
            ScheduleError::InvalidConfig("local search needs at least one restart".into())
        })?;

        tracing::info!(
            restarts = config.restarts,
            penalty = best.best_penalty,
            seed = best.seed,
            iterations,
            "local search finished"
        );

        best.iterations = iterations;
        best.accepted_moves = accepted_moves;
        best.improving_moves = improving_moves;
        best.cancelled = cancelled;
        Ok(best)
    }
}

fn run_single(
    space: &SearchSpace,
    config: &AnnealConfig,
    initial: &Schedule,
    target: u64,
    budget: &Budget,
    seed: u64,
) -> Result<AnnealResult, ScheduleError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let weight = space.cap_weight();

    let mut state = State {
        rounds: initial.rounds().to_vec(),
        ledger: space.ledger_of(initial)?,
    };
    let mut current_cost = state.cost(weight);
    let mut best_rounds = state.rounds.clone();
    let mut best_cost = current_cost;
    let mut best_penalty = state.ledger.total_penalty();
    let mut best_excess = state.ledger.cap_excess();

    let mut thermostat = Thermostat::new(config);
    let mut total_iterations = 0usize;
    let mut accepted_moves = 0usize;
    let mut improving_moves = 0usize;
    let mut since_best = 0usize;
    let mut cancelled = false;

    let history_interval = 100.max(config.iterations_per_temperature);
    let mut cost_history = vec![best_cost];

    'cooling: while thermostat.is_warm() {
        for _ in 0..thermostat.plateau(config) {
            if best_cost <= target
                || (config.max_iterations > 0 && total_iterations >= config.max_iterations)
                || (config.patience > 0 && since_best >= config.patience)
            {
                break 'cooling;
            }
            if budget.expired() {
                cancelled = budget.is_cancelled();
                break 'cooling;
            }

            total_iterations += 1;
            since_best += 1;
            if total_iterations % history_interval == 0 {
                cost_history.push(best_cost);
            }

            let Some(mv) = state.propose(space, config, &mut rng) else {
                continue;
            };
            let saved = state.rounds[mv.round()].clone();
            let checkpoint = state.ledger.snapshot();
            state.apply(mv, space)?;

            let new_cost = state.cost(weight);
            // Metropolis acceptance, bounded uphill
            let accept = if new_cost < current_cost {
                improving_moves += 1;
                true
            } else {
                let delta = new_cost - current_cost;
                delta <= config.max_uphill
                    && rng.random_range(0.0..1.0) < (-(delta as f64) / thermostat.temperature).exp()
            };

            if accept {
                state.ledger.commit();
                current_cost = new_cost;
                accepted_moves += 1;
                if current_cost < best_cost {
                    best_rounds = state.rounds.clone();
                    best_cost = current_cost;
                    best_penalty = state.ledger.total_penalty();
                    best_excess = state.ledger.cap_excess();
                    since_best = 0;
                    tracing::trace!(seed, iteration = total_iterations, penalty = best_penalty, "local search: new best");
                }
            } else {
                state.ledger.restore(checkpoint)?;
                state.rounds[mv.round()] = saved;
            }
        }

        thermostat.cool();
    }

    if cost_history.last() != Some(&best_cost) {
        cost_history.push(best_cost);
    }

    tracing::debug!(seed, iterations = total_iterations, penalty = best_penalty, "local search run finished");

    Ok(AnnealResult {
        best: Schedule::new(space.shape, best_rounds),
        best_penalty,
        cap_satisfied: best_excess == 0,
        iterations: total_iterations,
        accepted_moves,
        improving_moves,
        final_temperature: thermostat.temperature,
        cancelled,
        cost_history,
        seed,
    })
}

/// Temperature and its descent from one plateau to the next.
#[derive(Debug, Clone, Copy)]
struct Thermostat {
    temperature: f64,
    floor: f64,
    cooling: CoolingSchedule,
    /// Fixed drop per plateau under linear cooling.
    linear_drop: f64,
}

impl Thermostat {
    fn new(config: &AnnealConfig) -> Self {
        // linear cooling spans the iteration budget, or 1000 plateaus
        // when the budget is open-ended
        let plateaus = match config.max_iterations {
            0 => 1000,
            n => (n / config.iterations_per_temperature).max(1),
        };
        Self {
            temperature: config.initial_temperature,
            floor: config.min_temperature,
            cooling: config.cooling,
            linear_drop: (config.initial_temperature - config.min_temperature) / plateaus as f64,
        }
    }

    fn is_warm(&self) -> bool {
        self.temperature > self.floor
    }

    /// Moves tried at one temperature. Lundy-Mees cools after every move.
    fn plateau(&self, config: &AnnealConfig) -> usize {
        match self.cooling {
            CoolingSchedule::LundyMees { .. } => 1,
            _ => config.iterations_per_temperature,
        }
    }

    fn cool(&mut self) {
        self.temperature = match self.cooling {
            CoolingSchedule::Geometric { alpha } => self.temperature * alpha,
            CoolingSchedule::Linear => (self.temperature - self.linear_drop).max(self.floor),
            CoolingSchedule::LundyMees { beta } => self.temperature / (1.0 + beta * self.temperature),
        };
    }
}
