//! Lower bound on unavoidable future repeats.

use crate::feasibility::{bye_window, ByePolicy, SearchSpace};
use crate::ledger::PairingLedger;

/// Pigeonhole bound over the rounds not yet placed.
///
/// Two limits apply from round `k` on:
///
/// - globally, `remaining games - fresh pairs` games must repeat a pair
/// - participant `p` plays at least `g_p` more games but has only `f_p`
///   opponents it never met, so at least `g_p - f_p` of its games are
///   repeats; each repeat involves two participants, so half the sum
///   (rounded up) bounds the repeats
///
/// `g_p` counts the rounds left minus the most byes `p` can still receive,
/// so the bound holds for every bye set the policy allows, not just the
/// starting plan. The larger of the two limits is returned.
#[derive(Debug, Clone)]
pub(crate) struct LowerBound {
    rounds: usize,
    /// `remaining_total[k]`: games in rounds `k..R`.
    remaining_total: Vec<usize>,
    /// Most byes each participant can hold once the event is over.
    max_byes: Vec<u32>,
}

impl LowerBound {
    pub(crate) fn new(space: &SearchSpace) -> Self {
        let shape = &space.shape;
        let remaining_total = (0..=shape.rounds)
            .map(|k| (shape.rounds - k) * shape.games_per_round)
            .collect();
        let max_byes = match space.policy {
            ByePolicy::Equalize => {
                let (_, most) = bye_window(shape.rounds, shape.resting_per_round(), shape.participants);
                vec![most as u32; shape.participants]
            }
            ByePolicy::Fixed => (0..shape.participants)
                .map(|p| space.plan.iter().filter(|set| set.resting.contains(&p)).count() as u32)
                .collect(),
        };
        Self {
            rounds: shape.rounds,
            remaining_total,
            max_byes,
        }
    }

    /// Minimum penalty still to be added by rounds `depth..R`, given the
    /// games and byes recorded in `ledger` for rounds `0..depth`.
    pub(crate) fn future_repeats(&self, depth: usize, ledger: &PairingLedger) -> u64 {
        let global = self.remaining_total[depth].saturating_sub(ledger.fresh_pairs());

        let left = (self.rounds - depth) as u32;
        let forced: usize = self
            .max_byes
            .iter()
            .enumerate()
            .map(|(p, &most)| {
                let byes_left = most.saturating_sub(ledger.bye_count(p)).min(left);
                ((left - byes_left) as usize).saturating_sub(ledger.fresh_opponents(p))
            })
            .sum();

        global.max(forced.div_ceil(2)) as u64
    }
}

/// Lower bound on the total penalty of any schedule over `space`.
pub fn repeat_lower_bound(space: &SearchSpace) -> u64 {
    LowerBound::new(space).future_repeats(0, &space.empty_ledger())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::EventShape;

    fn space(p: usize, r: usize, g: usize) -> SearchSpace {
        SearchSpace::new(EventShape::new(p, r, g), ByePolicy::Equalize, None).unwrap()
    }

    #[test]
    fn test_single_pair_forced() {
        assert_eq!(repeat_lower_bound(&space(2, 5, 1)), 4);
    }

    #[test]
    fn test_round_robin_fits() {
        assert_eq!(repeat_lower_bound(&space(4, 3, 2)), 0);
        assert_eq!(repeat_lower_bound(&space(6, 5, 3)), 0);
    }

    #[test]
    fn test_per_participant_bound() {
        // 4 participants, 5 rounds: each plays 5 games but has 3 opponents
        assert_eq!(repeat_lower_bound(&space(4, 5, 2)), 4);
    }

    #[test]
    fn test_bound_allows_any_fair_bye_set() {
        // 4 participants, 3 rounds of one game: each rests at most twice,
        // so one game each is enough and a repeat-free schedule may exist
        assert_eq!(repeat_lower_bound(&space(4, 3, 1)), 0);
        // 2 rounds more than there are fresh pairs for the busiest players
        assert_eq!(repeat_lower_bound(&space(3, 6, 1)), 3);
    }

    #[test]
    fn test_fixed_bound_uses_plan() {
        // 2 always rests, so 0 and 1 play all 6 games; the bound still
        // credits each with two fresh opponents
        let space = SearchSpace::new(EventShape::new(3, 6, 1), ByePolicy::Fixed, None).unwrap();
        assert_eq!(repeat_lower_bound(&space), 4);
    }

    #[test]
    fn test_bound_tightens_with_history() {
        let space = space(4, 4, 2);
        let bound = LowerBound::new(&space);
        let mut ledger = space.empty_ledger();
        assert_eq!(bound.future_repeats(3, &ledger), 0);
        for (a, b) in [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)] {
            ledger.record(a, b).unwrap();
        }
        // every pair has met; the last round must repeat both of its games
        assert_eq!(bound.future_repeats(3, &ledger), 2);
        assert_eq!(bound.future_repeats(4, &ledger), 0);
    }
}
