//! Branch-and-bound execution.
//!
//! # Algorithm
//!
//! States are partial schedules with rounds `0..k` filled. A state is
//! extended by trying every bye set the policy allows for round `k`
//! together with every game set of its active participants, in order of
//! increasing added penalty against the current ledger. Under
//! [`ByePolicy::Equalize`](crate::feasibility::ByePolicy::Equalize) the
//! participants tied at the boundary bye count may rest in any
//! combination, and each combination is a separate branch. A branch is cut
//! when
//!
//! - its penalty so far plus the round's added penalty already reaches the
//!   incumbent (candidates are sorted, so the rest of the round is cut too)
//! - its penalty after the round plus [`LowerBound`] on the remaining
//!   rounds reaches the incumbent
//!
//! The ledger is checkpointed before each extension and restored after
//! backtracking. Search stops early once an incumbent meets the root lower
//! bound, which proves it optimal.

use super::bound::LowerBound;
use super::config::ExactConfig;
use super::symmetry::{first_round_representatives, participant_classes};
use crate::budget::Budget;
use crate::error::ScheduleError;
use crate::feasibility::{bye_choices, round_candidates, Candidate, SearchSpace};
use crate::ledger::PairingLedger;
use crate::schedule::{Game, ParticipantId, Round, Schedule};

/// Result of an exact search.
#[derive(Debug, Clone)]
pub struct ExactResult {
    /// Best complete schedule found (the starting incumbent if nothing
    /// better was found).
    pub best: Schedule,

    /// Penalty of `best`.
    pub best_penalty: u64,

    /// Whether `best` respects the meeting cap.
    pub cap_satisfied: bool,

    /// Whether `best` is proven optimal among all schedules the bye
    /// policy allows.
    pub optimal: bool,

    /// Root lower bound on the penalty.
    pub lower_bound: u64,

    /// Partial schedules extended.
    pub nodes: usize,

    /// Branches cut by the bound.
    pub pruned: usize,

    /// Improving complete schedules found.
    pub incumbents: usize,

    /// Whether stopped by the cancellation flag.
    pub cancelled: bool,
}

/// Executes branch-and-bound search.
pub struct ExactRunner;

impl ExactRunner {
    /// Searches for a minimum-penalty schedule over `space`.
    ///
    /// `incumbent` is a complete schedule (typically greedy) used as the
    /// initial upper bound when it respects the meeting cap.
    pub fn run(
        space: &SearchSpace,
        config: &ExactConfig,
        incumbent: &Schedule,
        budget: &Budget,
    ) -> Result<ExactResult, ScheduleError> {
        let bound = LowerBound::new(space);
        let classes = participant_classes(space);
        let root_bound = bound.future_repeats(0, &space.empty_ledger());

        let start_ledger = space.ledger_of(incumbent)?;
        let start = (start_ledger.cap_excess() == 0)
            .then(|| (incumbent.rounds().to_vec(), start_ledger.total_penalty()));

        let mut search = Search {
            space,
            config,
            budget,
            bound: &bound,
            classes: &classes,
            target: root_bound,
            ledger: space.empty_ledger(),
            prefix: Vec::with_capacity(space.shape.rounds),
            best: start,
            nodes: 0,
            pruned: 0,
            incumbents: 0,
            complete: true,
            stopped: false,
            cancelled: false,
        };

        if search.best_penalty() > root_bound {
            if config.workers > 1 && space.shape.rounds > 1 {
                search = run_split(search)?;
            } else {
                search.descend(0)?;
            }
        }

        let optimal = search.best.is_some()
            && (search.complete || search.best_penalty() <= root_bound);

        tracing::info!(
            nodes = search.nodes,
            pruned = search.pruned,
            incumbents = search.incumbents,
            optimal,
            cancelled = search.cancelled,
            "exact search finished"
        );

        let Search {
            best,
            nodes,
            pruned,
            incumbents,
            cancelled,
            ..
        } = search;

        Ok(match best {
            Some((rounds, penalty)) => ExactResult {
                best: Schedule::new(space.shape, rounds),
                best_penalty: penalty,
                cap_satisfied: true,
                optimal,
                lower_bound: root_bound,
                nodes,
                pruned,
                incumbents,
                cancelled,
            },
            None => ExactResult {
                best: incumbent.clone(),
                best_penalty: start_ledger.total_penalty(),
                cap_satisfied: false,
                optimal: false,
                lower_bound: root_bound,
                nodes,
                pruned,
                incumbents,
                cancelled,
            },
        })
    }
}

/// One way to fill the next round.
#[derive(Debug, Clone)]
struct Branch {
    games: Vec<Game>,
    resting: Vec<ParticipantId>,
    added_penalty: u32,
}

struct Search<'a> {
    space: &'a SearchSpace,
    config: &'a ExactConfig,
    budget: &'a Budget,
    bound: &'a LowerBound,
    classes: &'a [usize],
    target: u64,
    ledger: PairingLedger,
    prefix: Vec<Round>,
    best: Option<(Vec<Round>, u64)>,
    nodes: usize,
    pruned: usize,
    incumbents: usize,
    /// False once any part of the tree was skipped without a bound proof.
    complete: bool,
    stopped: bool,
    cancelled: bool,
}

impl<'a> Search<'a> {
    fn best_penalty(&self) -> u64 {
        self.best.as_ref().map_or(u64::MAX, |(_, p)| *p)
    }

    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        let out_of_nodes = self.config.max_nodes > 0 && self.nodes >= self.config.max_nodes;
        if out_of_nodes || self.budget.expired() {
            self.stopped = true;
            self.complete = false;
            self.cancelled = self.budget.is_cancelled();
        }
        self.stopped
    }

    fn candidates(&mut self, depth: usize) -> Result<Vec<Branch>, ScheduleError> {
        let shape = self.space.shape;
        let limit = self.config.max_candidates_per_round;
        let mut choices = bye_choices(
            shape.participants,
            shape.games_per_round,
            &self.ledger,
            self.space.policy,
        )?;
        let first_round = depth == 0 && self.config.symmetry_breaking;
        if first_round {
            // the class structure already accounts for the first bye set
            choices.truncate(1);
        }
        let single_class = self.classes.iter().all(|&c| c == self.classes[0]);

        let mut branches = Vec::new();
        for byes in choices {
            let found = round_candidates(&byes.active, &self.ledger, limit);
            if found.truncated && !(first_round && single_class) {
                self.complete = false;
            }
            let rounds: Vec<Candidate> = if first_round {
                first_round_representatives(found.rounds, self.classes)
            } else {
                found.rounds
            };
            branches.extend(rounds.into_iter().map(|cand| Branch {
                games: cand.games,
                resting: byes.resting.clone(),
                added_penalty: cand.added_penalty,
            }));
        }

        branches.sort_by_key(|b| b.added_penalty);
        if limit > 0 && branches.len() > limit {
            branches.truncate(limit);
            self.complete = false;
        }
        Ok(branches)
    }

    fn descend(&mut self, depth: usize) -> Result<(), ScheduleError> {
        if depth == self.space.shape.rounds {
            self.accept_complete();
            return Ok(());
        }
        if self.should_stop() {
            return Ok(());
        }
        self.nodes += 1;
        let candidates = self.candidates(depth)?;
        self.explore(depth, &candidates)
    }

    fn explore(&mut self, depth: usize, candidates: &[Branch]) -> Result<(), ScheduleError> {
        for (i, cand) in candidates.iter().enumerate() {
            let base = self.ledger.total_penalty();
            if base + u64::from(cand.added_penalty) >= self.best_penalty() {
                self.pruned += candidates.len() - i;
                break;
            }

            let checkpoint = self.ledger.snapshot();
            let round = Round::new(cand.games.clone(), cand.resting.clone());
            self.ledger.record_round(&round)?;

            let future = self.bound.future_repeats(depth + 1, &self.ledger);
            if self.ledger.total_penalty() + future >= self.best_penalty() {
                self.pruned += 1;
            } else {
                self.prefix.push(round);
                self.descend(depth + 1)?;
                self.prefix.pop();
            }
            self.ledger.restore(checkpoint)?;

            if self.stopped {
                break;
            }
        }
        Ok(())
    }

    fn accept_complete(&mut self) {
        let penalty = self.ledger.total_penalty();
        if penalty >= self.best_penalty() {
            return;
        }
        self.best = Some((self.prefix.clone(), penalty));
        self.incumbents += 1;
        tracing::debug!(penalty, incumbents = self.incumbents, "exact search: new incumbent");

        if penalty <= self.target {
            self.stopped = true;
        } else if self.config.solution_limit > 0 && self.incumbents >= self.config.solution_limit {
            tracing::debug!(limit = self.config.solution_limit, "exact search: solution limit reached");
            self.stopped = true;
            self.complete = false;
        }
    }

    /// Copy for an independent subtree worker.
    fn fork(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            prefix: self.prefix.clone(),
            best: self.best.clone(),
            nodes: 0,
            pruned: 0,
            incumbents: 0,
            ..*self
        }
    }

    /// Folds a finished worker into this search.
    fn merge(&mut self, other: Search<'a>) {
        if other.best_penalty() < self.best_penalty() {
            self.best = other.best;
        }
        self.nodes += other.nodes;
        self.pruned += other.pruned;
        self.incumbents += other.incumbents;
        self.complete &= other.complete;
        self.cancelled |= other.cancelled;
    }
}

/// Partitions the tree by its frontier branches and explores each share
/// in an independent worker that owns a private ledger.
///
/// The frontier is the first round with more than one candidate among the
/// first two rounds. Workers only share the read-only search space; their
/// results are merged by comparing penalties.
fn run_split(mut root: Search<'_>) -> Result<Search<'_>, ScheduleError> {
    root.nodes += 1;
    let mut depth = 0;
    let mut frontier = root.candidates(0)?;
    if frontier.len() == 1 {
        let only = frontier.remove(0);
        let round = Round::new(only.games, only.resting);
        root.ledger.record_round(&round)?;
        root.prefix.push(round);
        root.nodes += 1;
        depth = 1;
        frontier = root.candidates(1)?;
    }

    let workers = root.config.workers.min(frontier.len()).max(1);
    let shares: Vec<Vec<Branch>> = (0..workers)
        .map(|w| {
            frontier
                .iter()
                .enumerate()
                .filter(|(i, _)| i % workers == w)
                .map(|(_, c)| c.clone())
                .collect()
        })
        .collect();

    let explore_share = |share: &Vec<Branch>| {
        let mut worker = root.fork();
        worker.explore(depth, share)?;
        Ok::<_, ScheduleError>(worker)
    };

    #[cfg(feature = "parallel")]
    let finished: Vec<Search<'_>> = {
        use rayon::prelude::*;
        shares
            .par_iter()
            .map(explore_share)
            .collect::<Result<_, _>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let finished: Vec<Search<'_>> = shares.iter().map(explore_share).collect::<Result<_, _>>()?;

    tracing::debug!(workers, depth, frontier = frontier.len(), "exact search: subtrees merged");
    for worker in finished {
        root.merge(worker);
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::ByePolicy;
    use crate::schedule::EventShape;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn solve(p: usize, r: usize, g: usize, config: &ExactConfig) -> ExactResult {
        let space = SearchSpace::new(EventShape::new(p, r, g), ByePolicy::Equalize, None).unwrap();
        let greedy = space.greedy_schedule().unwrap();
        ExactRunner::run(&space, config, &greedy, &Budget::unlimited()).unwrap()
    }

    #[test]
    fn test_round_robin_four() {
        let result = solve(4, 3, 2, &ExactConfig::default());
        assert_eq!(result.best_penalty, 0);
        assert!(result.optimal);
        assert!(result.best.validate().is_ok());
    }

    #[test]
    fn test_single_pair_repeats() {
        let result = solve(2, 5, 1, &ExactConfig::default());
        assert_eq!(result.best_penalty, 4);
        assert!(result.optimal);
    }

    #[test]
    fn test_improves_on_greedy() {
        // a 1-factorization of K6 covers 5 rounds without repeats
        let result = solve(6, 5, 3, &ExactConfig::default());
        assert_eq!(result.best_penalty, 0);
        assert!(result.optimal);
        assert_eq!(result.best.total_penalty(), 0);
    }

    #[test]
    fn test_beyond_round_robin_is_optimal() {
        // 4 participants, 5 rounds: the bound says 4 repeats are forced
        let result = solve(4, 5, 2, &ExactConfig::default());
        assert_eq!(result.best_penalty, 4);
        assert_eq!(result.lower_bound, 4);
        assert!(result.optimal);
    }

    #[test]
    fn test_with_byes() {
        let result = solve(5, 2, 2, &ExactConfig::default());
        assert_eq!(result.best_penalty, 0);
        assert!(result.optimal);
        for p in 0..5 {
            assert!(result.best.byes_of(p) <= 1);
        }
    }

    #[test]
    fn test_node_limit_is_not_optimal() {
        // odd case where the bound is not tight enough to stop immediately
        let config = ExactConfig::default().with_max_nodes(1);
        let result = solve(7, 7, 3, &config);
        assert!(result.best.validate().is_ok());
        if !result.optimal {
            assert!(result.nodes <= 1);
        }
    }

    #[test]
    fn test_cancelled_returns_incumbent() {
        let space = SearchSpace::new(EventShape::new(8, 7, 4), ByePolicy::Equalize, None).unwrap();
        let greedy = space.greedy_schedule().unwrap();
        let budget = Budget::unlimited().with_cancel(Some(Arc::new(AtomicBool::new(true))));
        let result = ExactRunner::run(&space, &ExactConfig::default(), &greedy, &budget).unwrap();
        assert!(result.best.validate().is_ok());
        assert_eq!(result.best_penalty, result.best.total_penalty());
        if !result.optimal {
            assert!(result.cancelled);
        }
    }

    #[test]
    fn test_split_matches_sequential() {
        let sequential = solve(6, 6, 3, &ExactConfig::default());
        let split = solve(6, 6, 3, &ExactConfig::default().with_workers(3));
        assert_eq!(sequential.best_penalty, split.best_penalty);
        assert_eq!(sequential.optimal, split.optimal);
        assert!(split.best.validate().is_ok());
    }

    #[test]
    fn test_meeting_cap_respected() {
        let space = SearchSpace::new(EventShape::new(4, 6, 2), ByePolicy::Equalize, Some(2)).unwrap();
        let greedy = space.greedy_schedule().unwrap();
        let result = ExactRunner::run(&space, &ExactConfig::default(), &greedy, &Budget::unlimited()).unwrap();
        assert!(result.cap_satisfied);
        assert!(result.best.pair_counts().values().all(|&c| c <= 2));
        assert_eq!(result.best_penalty, 6);
    }

    #[test]
    fn test_meeting_cap_infeasible() {
        // 2 participants, 3 rounds: the only pair must meet 3 times
        let space = SearchSpace::new(EventShape::new(2, 3, 1), ByePolicy::Equalize, Some(2)).unwrap();
        let greedy = space.greedy_schedule().unwrap();
        let result = ExactRunner::run(&space, &ExactConfig::default(), &greedy, &Budget::unlimited()).unwrap();
        assert!(!result.cap_satisfied);
        assert!(!result.optimal);
        assert!(result.best.validate().is_ok());
    }

    #[test]
    fn test_tied_byes_are_searched() {
        // 4 participants, 1 game, 3 rounds: resting a different pair each
        // round lets all three games be fresh
        let result = solve(4, 3, 1, &ExactConfig::default());
        assert_eq!(result.best_penalty, 0);
        assert!(result.optimal);
        assert!(result.best.validate().is_ok());
    }

    #[test]
    fn test_single_game_rounds_avoid_repeats() {
        for (p, r) in [(4, 5), (5, 6), (6, 4), (6, 5), (8, 5), (8, 6)] {
            let result = solve(p, r, 1, &ExactConfig::default());
            assert_eq!(result.best_penalty, 0, "{p} participants, {r} rounds");
            assert!(result.optimal);
            for q in 0..p {
                let byes = result.best.byes_of(q);
                let (lo, hi) = crate::feasibility::bye_window(r, p - 2, p);
                assert!((lo..=hi).contains(&byes));
            }
        }
    }

    #[test]
    fn test_fixed_policy_keeps_plan() {
        let space = SearchSpace::new(EventShape::new(4, 3, 1), ByePolicy::Fixed, None).unwrap();
        let greedy = space.greedy_schedule().unwrap();
        let result = ExactRunner::run(&space, &ExactConfig::default(), &greedy, &Budget::unlimited()).unwrap();
        // 0 and 1 play every round
        assert_eq!(result.best_penalty, 2);
        assert!(result.optimal);
        for round in result.best.rounds() {
            assert_eq!(round.resting(), &[2, 3]);
        }
    }
}
