//! Annealing configuration and cooling schedules.

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling: `T_k = T_0 - k * (T_0 - T_min) / steps`.
    ///
    /// The step count comes from the iteration budget.
    Linear,

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`, one
    /// iteration per temperature step.
    LundyMees {
        /// Cooling parameter, typically `(T_0 - T_min) / (max_iter * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.97 }
    }
}

/// Configuration for the local-search engine.
///
/// Penalty deltas of single moves are small integers, so temperatures of
/// order 1 are the useful range.
///
/// # Examples
///
/// ```
/// use u_matchup::anneal::{AnnealConfig, CoolingSchedule};
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(3.0)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.99 })
///     .with_max_iterations(50_000)
///     .with_restarts(4)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Starting temperature.
    pub initial_temperature: f64,

    /// The run stops once the temperature drops below this.
    pub min_temperature: f64,

    pub cooling: CoolingSchedule,

    /// Moves tried at each temperature level (ignored by `LundyMees`).
    pub iterations_per_temperature: usize,

    /// Hard iteration budget per restart. 0 = no limit.
    pub max_iterations: usize,

    /// Stop after this many iterations without a new best. 0 = never.
    pub patience: usize,

    /// Largest penalty increase a move may cause and still be accepted.
    pub max_uphill: u64,

    /// Probability of working on the round holding the most-repeated pair
    /// rather than a uniformly random round.
    pub focus_probability: f64,

    /// Probability of trying a player/resting participant swap.
    pub bye_swap_probability: f64,

    /// Probability of rebuilding a whole round greedily with its repeated
    /// pairs forbidden.
    pub reseed_probability: f64,

    /// Independent runs with seeds `seed, seed + 1, ...`; the best wins.
    pub restarts: usize,

    /// Random seed for reproducibility. `None` draws one at random.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 2.0,
            min_temperature: 0.01,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 500,
            max_iterations: 0,
            patience: 20_000,
            max_uphill: 2,
            focus_probability: 0.5,
            bye_swap_probability: 0.1,
            reseed_probability: 0.02,
            restarts: 1,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_patience(mut self, n: usize) -> Self {
        self.patience = n;
        self
    }

    pub fn with_max_uphill(mut self, delta: u64) -> Self {
        self.max_uphill = delta;
        self
    }

    pub fn with_focus_probability(mut self, p: f64) -> Self {
        self.focus_probability = p;
        self
    }

    pub fn with_bye_swap_probability(mut self, p: f64) -> Self {
        self.bye_swap_probability = p;
        self
    }

    pub fn with_reseed_probability(mut self, p: f64) -> Self {
        self.reseed_probability = p;
        self
    }

    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_temperature <= 0.0 {
            return Err("initial_temperature must be positive".into());
        }
        if self.min_temperature <= 0.0 {
            return Err("min_temperature must be positive".into());
        }
        if self.min_temperature >= self.initial_temperature {
            return Err("min_temperature must be less than initial_temperature".into());
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha <= 0.0 || alpha >= 1.0 {
                    return Err(format!("geometric alpha must be in (0, 1), got {alpha}"));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if beta <= 0.0 {
                    return Err(format!("lundy-mees beta must be positive, got {beta}"));
                }
            }
            CoolingSchedule::Linear => {}
        }
        if self.iterations_per_temperature == 0 {
            return Err("iterations_per_temperature must be positive".into());
        }
        for (name, p) in [
            ("focus_probability", self.focus_probability),
            ("bye_swap_probability", self.bye_swap_probability),
            ("reseed_probability", self.reseed_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        if self.restarts == 0 {
            return Err("restarts must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert!((config.initial_temperature - 2.0).abs() < 1e-12);
        assert_eq!(config.restarts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_min_ge_initial() {
        let config = AnnealConfig::default()
            .with_initial_temperature(1.0)
            .with_min_temperature(2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_alpha() {
        let config = AnnealConfig::default().with_cooling(CoolingSchedule::Geometric { alpha: 1.5 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_beta() {
        let config = AnnealConfig::default().with_cooling(CoolingSchedule::LundyMees { beta: -1.0 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_probability() {
        let config = AnnealConfig::default().with_reseed_probability(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_restarts() {
        assert!(AnnealConfig::default().with_restarts(0).validate().is_err());
    }
}
