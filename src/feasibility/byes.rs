//! Bye selection: who sits out a round.

use crate::error::ScheduleError;
use crate::ledger::PairingLedger;
use crate::schedule::{exceeds_seats, EventShape, ParticipantId};

/// How resting participants are chosen when `2G < P`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByePolicy {
    /// Participants with the fewest byes so far rest; among equals the
    /// highest ids rest. Bye totals never differ by more than one.
    #[default]
    Equalize,

    /// The highest `P - 2G` ids rest every round.
    Fixed,
}

/// Split of the participants for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByeSet {
    /// Participants in play, ascending.
    pub active: Vec<ParticipantId>,
    /// Participants sitting out, ascending.
    pub resting: Vec<ParticipantId>,
}

/// Chooses the resting participants of the next round from the ledger's
/// bye history.
///
/// Fails with [`ScheduleError::InfeasibleConfig`] if `2G > P`.
pub fn enumerate_bye_set(
    num_participants: usize,
    games_per_round: usize,
    ledger: &PairingLedger,
    policy: ByePolicy,
) -> Result<ByeSet, ScheduleError> {
    if exceeds_seats(games_per_round, num_participants) {
        return Err(ScheduleError::InfeasibleConfig {
            participants: num_participants,
            games_per_round,
        });
    }
    let rest_count = num_participants - 2 * games_per_round;

    let mut order: Vec<ParticipantId> = (0..num_participants).collect();
    match policy {
        ByePolicy::Equalize => {
            order.sort_by(|&a, &b| {
                ledger
                    .bye_count(a)
                    .cmp(&ledger.bye_count(b))
                    .then_with(|| b.cmp(&a))
            });
        }
        ByePolicy::Fixed => order.reverse(),
    }

    let mut resting = order[..rest_count].to_vec();
    let mut active = order[rest_count..].to_vec();
    resting.sort_unstable();
    active.sort_unstable();
    Ok(ByeSet { active, resting })
}

/// Every bye set `policy` allows for the next round, the one chosen by
/// [`enumerate_bye_set`] first.
///
/// Under [`ByePolicy::Equalize`] everyone below the boundary bye count must
/// rest, and the remaining seats on the bench may go to any of the
/// participants tied at the boundary. Which of them rest changes who can
/// meet whom, so exact search branches over these sets.
/// [`ByePolicy::Fixed`] allows a single set.
pub fn bye_choices(
    num_participants: usize,
    games_per_round: usize,
    ledger: &PairingLedger,
    policy: ByePolicy,
) -> Result<Vec<ByeSet>, ScheduleError> {
    let canonical = enumerate_bye_set(num_participants, games_per_round, ledger, policy)?;
    if policy == ByePolicy::Fixed || canonical.resting.is_empty() || canonical.active.is_empty() {
        return Ok(vec![canonical]);
    }

    let level = canonical
        .resting
        .iter()
        .map(|&p| ledger.bye_count(p))
        .max()
        .unwrap_or(0);
    let must_rest: Vec<ParticipantId> = (0..num_participants)
        .filter(|&p| ledger.bye_count(p) < level)
        .collect();
    // highest ids first, so the first combination is the canonical set
    let tied: Vec<ParticipantId> = (0..num_participants)
        .rev()
        .filter(|&p| ledger.bye_count(p) == level)
        .collect();
    let seats = canonical.resting.len() - must_rest.len();

    let mut choices = Vec::new();
    let mut picked = Vec::with_capacity(seats);
    pick_tied(&tied, seats, 0, &mut picked, &mut |chosen| {
        let mut resting = must_rest.clone();
        resting.extend_from_slice(chosen);
        resting.sort_unstable();
        let active = (0..num_participants)
            .filter(|p| resting.binary_search(p).is_err())
            .collect();
        choices.push(ByeSet { active, resting });
    });
    Ok(choices)
}

fn pick_tied(
    tied: &[ParticipantId],
    seats: usize,
    from: usize,
    picked: &mut Vec<ParticipantId>,
    emit: &mut impl FnMut(&[ParticipantId]),
) {
    if picked.len() == seats {
        emit(picked);
        return;
    }
    let still_needed = seats - picked.len();
    for i in from..=(tied.len() - still_needed) {
        picked.push(tied[i]);
        pick_tied(tied, seats, i + 1, picked, emit);
        picked.pop();
    }
}

/// Range of bye totals every participant holds after `rounds_played`
/// rounds of a schedule balanced under [`ByePolicy::Equalize`]: the floor
/// and ceiling of the average.
pub fn bye_window(rounds_played: usize, rest_count: usize, num_participants: usize) -> (usize, usize) {
    let benched = rounds_played * rest_count;
    (benched / num_participants, benched.div_ceil(num_participants))
}

/// Computes the bye sets of every round up front.
///
/// Uses the [`enumerate_bye_set`] choice every round. This is the starting
/// plan for greedy construction and local search; exact search branches
/// over [`bye_choices`] instead.
pub fn plan_byes(shape: &EventShape, policy: ByePolicy) -> Result<Vec<ByeSet>, ScheduleError> {
    let mut scratch = PairingLedger::new(shape.participants);
    let mut plan = Vec::with_capacity(shape.rounds);
    for _ in 0..shape.rounds {
        let set = enumerate_bye_set(shape.participants, shape.games_per_round, &scratch, policy)?;
        for &p in &set.resting {
            scratch.record_bye(p);
        }
        plan.push(set);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_byes_when_full() {
        let ledger = PairingLedger::new(6);
        let set = enumerate_bye_set(6, 3, &ledger, ByePolicy::Equalize).unwrap();
        assert!(set.resting.is_empty());
        assert_eq!(set.active, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_too_many_games() {
        let ledger = PairingLedger::new(5);
        assert_eq!(
            enumerate_bye_set(5, 3, &ledger, ByePolicy::Equalize),
            Err(ScheduleError::InfeasibleConfig {
                participants: 5,
                games_per_round: 3
            })
        );
    }

    #[test]
    fn test_too_many_games_without_overflow() {
        let ledger = PairingLedger::new(4);
        let g = usize::MAX / 2 + 1;
        assert_eq!(
            enumerate_bye_set(4, g, &ledger, ByePolicy::Equalize),
            Err(ScheduleError::InfeasibleConfig {
                participants: 4,
                games_per_round: g
            })
        );
    }

    #[test]
    fn test_equalize_prefers_fewest_byes_to_rest() {
        let mut ledger = PairingLedger::new(5);
        ledger.record_bye(4);
        let set = enumerate_bye_set(5, 2, &ledger, ByePolicy::Equalize).unwrap();
        assert_eq!(set.resting, vec![3]);
        assert_eq!(set.active, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_choices_branch_over_ties() {
        // everyone level: any 2 of 4 may rest, canonical set first
        let ledger = PairingLedger::new(4);
        let choices = bye_choices(4, 1, &ledger, ByePolicy::Equalize).unwrap();
        assert_eq!(choices.len(), 6);
        assert_eq!(choices[0], enumerate_bye_set(4, 1, &ledger, ByePolicy::Equalize).unwrap());
        assert_eq!(choices[0].resting, vec![2, 3]);
        assert!(choices.iter().any(|c| c.resting == vec![0, 1]));
        assert!(choices.iter().all(|c| c.active.len() == 2 && c.resting.len() == 2));
    }

    #[test]
    fn test_choices_force_fewest_byes_to_rest() {
        // 4 has a bye; 0..4 are level and two of them must rest
        let mut ledger = PairingLedger::new(5);
        ledger.record_bye(4);
        let choices = bye_choices(5, 1, &ledger, ByePolicy::Equalize).unwrap();
        assert_eq!(choices.len(), 4);
        assert!(choices.iter().all(|c| c.resting.len() == 3 && !c.resting.contains(&4)));

        // 3 and 4 have a bye: 0, 1, 2 rest, no choice left
        ledger.record_bye(3);
        let choices = bye_choices(5, 1, &ledger, ByePolicy::Equalize).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].resting, vec![0, 1, 2]);
    }

    #[test]
    fn test_fixed_policy_has_one_choice() {
        let ledger = PairingLedger::new(6);
        let choices = bye_choices(6, 1, &ledger, ByePolicy::Fixed).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].resting, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_bye_window() {
        assert_eq!(bye_window(0, 1, 5), (0, 0));
        assert_eq!(bye_window(2, 1, 5), (0, 1));
        assert_eq!(bye_window(5, 1, 5), (1, 1));
        assert_eq!(bye_window(3, 2, 4), (1, 2));
    }

    #[test]
    fn test_plan_spreads_byes() {
        let shape = EventShape::new(5, 7, 2);
        let plan = plan_byes(&shape, ByePolicy::Equalize).unwrap();
        let mut byes = [0usize; 5];
        for set in &plan {
            assert_eq!(set.resting.len(), 1);
            assert_eq!(set.active.len(), 4);
            byes[set.resting[0]] += 1;
        }
        let max = byes.iter().max().unwrap();
        let min = byes.iter().min().unwrap();
        assert!(max - min <= 1, "bye totals {byes:?}");
    }

    #[test]
    fn test_fixed_policy() {
        let shape = EventShape::new(7, 3, 2);
        let plan = plan_byes(&shape, ByePolicy::Fixed).unwrap();
        for set in &plan {
            assert_eq!(set.resting, vec![4, 5, 6]);
        }
    }

    #[test]
    fn test_zero_games_rests_everyone() {
        let shape = EventShape::new(3, 2, 0);
        let plan = plan_byes(&shape, ByePolicy::Equalize).unwrap();
        assert!(plan.iter().all(|s| s.active.is_empty() && s.resting.len() == 3));
    }
}
