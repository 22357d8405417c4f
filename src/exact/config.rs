//! Exact search configuration.

/// Configuration for branch-and-bound search.
///
/// # Examples
///
/// ```
/// use u_matchup::exact::ExactConfig;
///
/// let config = ExactConfig::default()
///     .with_max_nodes(1_000_000)
///     .with_solution_limit(3)
///     .with_workers(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactConfig {
    /// Maximum search nodes (extended partial schedules). 0 = no limit.
    pub max_nodes: usize,

    /// Maximum game sets enumerated per round. 0 = no limit.
    ///
    /// Hitting the cap makes the search non-exhaustive.
    pub max_candidates_per_round: usize,

    /// Stop after this many improving incumbents. 0 = no limit.
    pub solution_limit: usize,

    /// Explore only one representative of first-round game sets that are
    /// equivalent up to relabeling participants.
    pub symmetry_breaking: bool,

    /// Independent subtree workers (effective with the `parallel` feature).
    pub workers: usize,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            max_nodes: 0,
            max_candidates_per_round: 50_000,
            solution_limit: 0,
            symmetry_breaking: true,
            workers: 1,
        }
    }
}

impl ExactConfig {
    pub fn with_max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn with_max_candidates_per_round(mut self, n: usize) -> Self {
        self.max_candidates_per_round = n;
        self
    }

    pub fn with_solution_limit(mut self, n: usize) -> Self {
        self.solution_limit = n;
        self
    }

    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("exact workers must be at least 1".into());
        }
        Ok(())
    }
}
