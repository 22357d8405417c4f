//! Solver configuration.

use crate::anneal::AnnealConfig;
use crate::exact::ExactConfig;
use crate::feasibility::ByePolicy;
use std::time::Duration;

/// Which search engine to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyHint {
    /// Exact search for small events, local search otherwise.
    #[default]
    Auto,
    /// Always branch-and-bound.
    Exact,
    /// Always simulated annealing.
    Heuristic,
}

/// Top-level solver configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_matchup::solver::{SolveConfig, StrategyHint};
///
/// let config = SolveConfig::default()
///     .with_strategy(StrategyHint::Heuristic)
///     .with_time_budget(Duration::from_secs(2))
///     .with_max_meetings(2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveConfig {
    pub strategy: StrategyHint,

    /// Wall-clock budget for the whole run.
    pub time_budget: Duration,

    /// `Auto` picks exact search when `P` is at most this.
    pub exact_max_participants: usize,

    /// `Auto` picks exact search when `R` is at most this.
    pub exact_max_rounds: usize,

    pub bye_policy: ByePolicy,

    /// Hard cap on how often any pair may meet. `None` = uncapped.
    pub max_meetings: Option<u32>,

    pub exact: ExactConfig,

    pub anneal: AnnealConfig,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyHint::Auto,
            time_budget: Duration::from_secs(10),
            exact_max_participants: 12,
            exact_max_rounds: 10,
            bye_policy: ByePolicy::Equalize,
            max_meetings: None,
            exact: ExactConfig::default(),
            anneal: AnnealConfig::default(),
        }
    }
}

impl SolveConfig {
    pub fn with_strategy(mut self, strategy: StrategyHint) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the `Auto` thresholds for exact search.
    pub fn with_exact_thresholds(mut self, max_participants: usize, max_rounds: usize) -> Self {
        self.exact_max_participants = max_participants;
        self.exact_max_rounds = max_rounds;
        self
    }

    pub fn with_bye_policy(mut self, policy: ByePolicy) -> Self {
        self.bye_policy = policy;
        self
    }

    pub fn with_max_meetings(mut self, cap: u32) -> Self {
        self.max_meetings = Some(cap);
        self
    }

    pub fn with_exact(mut self, exact: ExactConfig) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    /// Seeds local search.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.anneal.seed = Some(seed);
        self
    }

    /// Sets the number of independent workers for both engines: exact
    /// subtree workers and annealing restarts.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.exact.workers = n;
        self.anneal.restarts = n;
        self
    }

    /// Validates the configuration and the nested engine configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_meetings == Some(0) {
            return Err("max_meetings must be at least 1".into());
        }
        self.exact.validate()?;
        self.anneal.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolveConfig::default();
        assert_eq!(config.strategy, StrategyHint::Auto);
        assert_eq!(config.exact_max_participants, 12);
        assert_eq!(config.exact_max_rounds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_meeting_cap_rejected() {
        assert!(SolveConfig::default().with_max_meetings(0).validate().is_err());
    }

    #[test]
    fn test_nested_validation() {
        let config = SolveConfig::default().with_workers(0);
        assert!(config.validate().is_err());
    }
}
