//! Neighbourhood moves on a full schedule.

use super::config::AnnealConfig;
use crate::error::ScheduleError;
use crate::feasibility::{build_round_greedy, bye_window, ByePolicy, ByeSet, SearchSpace};
use crate::ledger::PairingLedger;
use crate::schedule::{Pair, ParticipantId, Round};
use rand::Rng;
use std::collections::HashSet;

/// A local change confined to one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Swap one participant between two games of the round:
    /// `(a, b), (c, d)` becomes `(a, c), (b, d)`, or `(a, d), (b, c)` when
    /// `cross` is set.
    Exchange {
        round: usize,
        first: usize,
        second: usize,
        cross: bool,
    },

    /// `leaving` hands its seat in `game` to the resting `entering`.
    ByeSwap {
        round: usize,
        game: usize,
        leaving: ParticipantId,
        entering: ParticipantId,
    },

    /// Rebuild the round greedily, forbidding the pairs that would repeat.
    Reseed { round: usize },
}

impl Move {
    pub(crate) fn round(&self) -> usize {
        match *self {
            Move::Exchange { round, .. } | Move::ByeSwap { round, .. } | Move::Reseed { round } => {
                round
            }
        }
    }
}

/// A full schedule with the ledger that matches it.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) rounds: Vec<Round>,
    pub(crate) ledger: PairingLedger,
}

impl State {
    /// Penalty with cap excess weighted to dominate it.
    pub(crate) fn cost(&self, cap_weight: u64) -> u64 {
        self.ledger.total_penalty() + self.ledger.cap_excess() * cap_weight
    }

    /// A round holding a pair with the highest meeting count, if any pair
    /// repeats. Ties are broken at random.
    fn hottest_round<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let mut hottest = 1;
        let mut rounds = Vec::new();
        for (r, round) in self.rounds.iter().enumerate() {
            let heat = round
                .games()
                .iter()
                .map(|&g| self.ledger.count_of(g))
                .max()
                .unwrap_or(0);
            if heat > hottest {
                hottest = heat;
                rounds.clear();
            }
            if heat == hottest && heat > 1 {
                rounds.push(r);
            }
        }
        if rounds.is_empty() {
            None
        } else {
            Some(rounds[rng.random_range(0..rounds.len())])
        }
    }

    /// Draws a random move, or `None` if the drawn kind is unavailable.
    pub(crate) fn propose<R: Rng>(
        &self,
        space: &SearchSpace,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> Option<Move> {
        let round = if rng.random_range(0.0..1.0) < config.focus_probability {
            self.hottest_round(rng)
                .unwrap_or_else(|| rng.random_range(0..self.rounds.len()))
        } else {
            rng.random_range(0..self.rounds.len())
        };
        let games = self.rounds[round].games();
        let resting = self.rounds[round].resting();

        let roll = rng.random_range(0.0..1.0);
        if roll < config.reseed_probability && games.len() >= 2 {
            return Some(Move::Reseed { round });
        }

        let bye_swaps = space.policy == ByePolicy::Equalize && !resting.is_empty() && !games.is_empty();
        if bye_swaps && (games.len() < 2 || roll < config.reseed_probability + config.bye_swap_probability) {
            let game = rng.random_range(0..games.len());
            let [lo, hi] = games[game].participants();
            let leaving = if rng.random_bool(0.5) { lo } else { hi };
            let entering = resting[rng.random_range(0..resting.len())];
            if !self.bye_swap_keeps_balance(round, leaving, entering, space) {
                return None;
            }
            return Some(Move::ByeSwap {
                round,
                game,
                leaving,
                entering,
            });
        }

        if games.len() < 2 {
            return None;
        }
        let first = rng.random_range(0..games.len());
        let mut second = rng.random_range(0..games.len() - 1);
        if second >= first {
            second += 1;
        }
        Some(Move::Exchange {
            round,
            first,
            second,
            cross: rng.random_bool(0.5),
        })
    }

    /// Whether `leaving` may take `entering`'s bye in `round` while both
    /// stay inside the equalized bye window after every later round.
    pub(crate) fn bye_swap_keeps_balance(
        &self,
        round: usize,
        leaving: ParticipantId,
        entering: ParticipantId,
        space: &SearchSpace,
    ) -> bool {
        let shape = &space.shape;
        let rest_count = shape.resting_per_round();
        let (mut leaving_byes, mut entering_byes) = (0, 0);
        for (i, r) in self.rounds.iter().enumerate() {
            if i == round {
                leaving_byes += 1;
            } else {
                leaving_byes += usize::from(r.is_resting(leaving));
                entering_byes += usize::from(r.is_resting(entering));
            }
            if i < round {
                continue;
            }
            let (lo, hi) = bye_window(i + 1, rest_count, shape.participants);
            let inside = |byes: usize| (lo..=hi).contains(&byes);
            if !inside(leaving_byes) || !inside(entering_byes) {
                return false;
            }
        }
        true
    }

    /// Applies `mv` to the round and the ledger.
    pub(crate) fn apply(&mut self, mv: Move, space: &SearchSpace) -> Result<(), ScheduleError> {
        match mv {
            Move::Exchange {
                round,
                first,
                second,
                cross,
            } => {
                let [a, b] = self.rounds[round].games()[first].participants();
                let [c, d] = self.rounds[round].games()[second].participants();
                self.ledger.retract(a, b)?;
                self.ledger.retract(c, d)?;
                let (x, y) = if cross { ((a, d), (b, c)) } else { ((a, c), (b, d)) };
                self.ledger.record(x.0, x.1)?;
                self.ledger.record(y.0, y.1)?;
                let games = self.rounds[round].games_mut();
                games[first] = Pair::new(x.0, x.1)?;
                games[second] = Pair::new(y.0, y.1)?;
            }

            Move::ByeSwap {
                round,
                game,
                leaving,
                entering,
            } => {
                let old = self.rounds[round].games()[game];
                let stays = old.opponent(leaving).ok_or(ScheduleError::InvalidPair {
                    a: old.lo(),
                    b: old.hi(),
                    reason: "bye swap on a game without the leaving participant",
                })?;
                self.ledger.retract(old.lo(), old.hi())?;
                self.ledger.record(entering, stays)?;
                self.ledger.retract_bye(entering);
                self.ledger.record_bye(leaving);

                let target = &mut self.rounds[round];
                target.games_mut()[game] = Pair::new(entering, stays)?;
                let resting = target.resting_mut();
                resting.retain(|&p| p != entering);
                resting.push(leaving);
                resting.sort_unstable();
            }

            Move::Reseed { round } => {
                let old: Vec<Pair> = self.rounds[round].games().to_vec();
                for g in &old {
                    self.ledger.retract(g.lo(), g.hi())?;
                }
                let forbidden: HashSet<Pair> = old
                    .iter()
                    .copied()
                    .filter(|&g| self.ledger.count_of(g) > 0)
                    .collect();
                let mut active: Vec<ParticipantId> = old.iter().flat_map(|g| g.participants()).collect();
                active.sort_unstable();
                let byes = ByeSet {
                    active,
                    resting: Vec::new(),
                };
                let rebuilt = build_round_greedy(&byes, old.len(), &self.ledger, &forbidden);
                for g in rebuilt.games() {
                    self.ledger.record(g.lo(), g.hi())?;
                }
                *self.rounds[round].games_mut() = rebuilt.games().to_vec();
            }
        }
        debug_assert!(
            crate::feasibility::check_round(&self.rounds[mv.round()], &space.shape).is_ok(),
            "move {mv:?} broke round legality"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::EventShape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_for(space: &SearchSpace) -> State {
        let schedule = space.greedy_schedule().unwrap();
        State {
            rounds: schedule.rounds().to_vec(),
            ledger: space.ledger_of(&schedule).unwrap(),
        }
    }

    fn assert_consistent(state: &State, space: &SearchSpace) {
        let rebuilt = PairingLedger::from_rounds(space.shape.participants, &state.rounds).unwrap();
        assert_eq!(rebuilt.total_penalty(), state.ledger.total_penalty());
        assert_eq!(rebuilt.total_games(), state.ledger.total_games());
        for p in 0..space.shape.participants {
            assert_eq!(rebuilt.bye_count(p), state.ledger.bye_count(p));
        }
        for round in &state.rounds {
            assert!(crate::feasibility::check_round(round, &space.shape).is_ok());
        }
    }

    #[test]
    fn test_exchange_keeps_ledger_in_sync() {
        let space = SearchSpace::new(EventShape::new(8, 4, 4), ByePolicy::Equalize, None).unwrap();
        let mut state = state_for(&space);
        let mv = Move::Exchange {
            round: 1,
            first: 0,
            second: 2,
            cross: true,
        };
        state.apply(mv, &space).unwrap();
        assert_consistent(&state, &space);
    }

    #[test]
    fn test_bye_swap_moves_rest() {
        let space = SearchSpace::new(EventShape::new(5, 2, 2), ByePolicy::Equalize, None).unwrap();
        let mut state = state_for(&space);
        // round 0 rests 4, round 1 rests 3; 0 plays in round 0
        let game = state.rounds[0]
            .games()
            .iter()
            .position(|g| g.contains(0))
            .unwrap();
        assert!(state.bye_swap_keeps_balance(0, 0, 4, &space));
        let mv = Move::ByeSwap {
            round: 0,
            game,
            leaving: 0,
            entering: 4,
        };
        state.apply(mv, &space).unwrap();
        assert_eq!(state.rounds[0].resting(), &[0]);
        assert_eq!(state.ledger.bye_count(0), 1);
        assert_eq!(state.ledger.bye_count(4), 0);
        assert_consistent(&state, &space);
    }

    #[test]
    fn test_bye_swap_rejects_second_bye() {
        let space = SearchSpace::new(EventShape::new(5, 2, 2), ByePolicy::Equalize, None).unwrap();
        let state = state_for(&space);
        // 3 already rests in round 1, so a bye in round 0 would give it two
        assert!(!state.bye_swap_keeps_balance(0, 3, 4, &space));
        assert!(state.bye_swap_keeps_balance(1, 0, 3, &space));
    }

    #[test]
    fn test_bye_swap_checks_every_prefix() {
        // 4 participants, 1 game: two rest per round, and after 2 rounds
        // everyone must have exactly one bye
        let space = SearchSpace::new(EventShape::new(4, 3, 1), ByePolicy::Equalize, None).unwrap();
        let p = |a, b| Pair::new(a, b).unwrap();
        let rounds = vec![
            Round::new(vec![p(0, 1)], vec![2, 3]),
            Round::new(vec![p(2, 3)], vec![0, 1]),
            Round::new(vec![p(0, 2)], vec![1, 3]),
        ];
        let state = State {
            ledger: PairingLedger::from_rounds(4, &rounds).unwrap(),
            rounds,
        };
        // 0 would rest twice in the first two rounds
        assert!(!state.bye_swap_keeps_balance(0, 0, 2, &space));
        // round 2 sits past the balanced prefix: 0 and 1 may trade
        assert!(state.bye_swap_keeps_balance(2, 0, 1, &space));
    }

    #[test]
    fn test_reseed_avoids_repeats() {
        let space = SearchSpace::new(EventShape::new(4, 2, 2), ByePolicy::Equalize, None).unwrap();
        let p = |a, b| Pair::new(a, b).unwrap();
        let rounds = vec![
            Round::new(vec![p(0, 1), p(2, 3)], vec![]),
            Round::new(vec![p(0, 1), p(2, 3)], vec![]),
        ];
        let mut state = State {
            ledger: PairingLedger::from_rounds(4, &rounds).unwrap(),
            rounds,
        };
        assert_eq!(state.cost(space.cap_weight()), 2);
        state.apply(Move::Reseed { round: 1 }, &space).unwrap();
        assert_eq!(state.cost(space.cap_weight()), 0);
        assert_consistent(&state, &space);
    }

    #[test]
    fn test_snapshot_restore_reverts_move() {
        let space = SearchSpace::new(EventShape::new(10, 5, 5), ByePolicy::Equalize, None).unwrap();
        let mut state = state_for(&space);
        let before = state.clone();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let Some(mv) = state.propose(&space, &AnnealConfig::default(), &mut rng) else {
                continue;
            };
            let saved = state.rounds[mv.round()].clone();
            let checkpoint = state.ledger.snapshot();
            state.apply(mv, &space).unwrap();
            state.ledger.restore(checkpoint).unwrap();
            state.rounds[mv.round()] = saved;
        }
        assert_eq!(state.rounds, before.rounds);
        assert_eq!(state.ledger.total_penalty(), before.ledger.total_penalty());
        assert_consistent(&state, &space);
    }
}
