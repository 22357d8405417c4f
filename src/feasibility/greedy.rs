//! Greedy round construction.

use super::byes::ByeSet;
use crate::error::ScheduleError;
use crate::ledger::PairingLedger;
use crate::schedule::{EventShape, Game, Pair, Round, Schedule};
use std::collections::HashSet;

/// Builds one round by repeatedly taking the cheapest available pair.
///
/// Among still-unassigned active participants the pair is chosen by, in
/// order:
///
/// 1. not in `forbidden` and not at the ledger's meeting cap
/// 2. lowest meeting count
/// 3. lowest combined bye count
/// 4. smallest `(lo, hi)` ids
///
/// Stops once `games_per_round` games are formed or fewer than two
/// participants remain. The ledger is only read.
pub fn build_round_greedy(
    byes: &ByeSet,
    games_per_round: usize,
    ledger: &PairingLedger,
    forbidden: &HashSet<Pair>,
) -> Round {
    let mut pool = byes.active.clone();
    pool.sort_unstable();
    let mut games: Vec<Game> = Vec::with_capacity(games_per_round);

    while games.len() < games_per_round && pool.len() >= 2 {
        let mut best: Option<((bool, u32, u32, usize, usize), usize, usize)> = None;
        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let pair = Pair::ordered(pool[i], pool[j]);
                let key = (
                    forbidden.contains(&pair) || ledger.exceeds_cap(pair),
                    ledger.count_of(pair),
                    ledger.bye_count(pool[i]) + ledger.bye_count(pool[j]),
                    pair.lo(),
                    pair.hi(),
                );
                if best.as_ref().is_none_or(|(k, _, _)| key < *k) {
                    best = Some((key, i, j));
                }
            }
        }
        let Some((_, i, j)) = best else { break };
        games.push(Pair::ordered(pool[i], pool[j]));
        // j > i, so removing j first keeps i valid
        pool.remove(j);
        pool.remove(i);
    }

    let mut resting = byes.resting.clone();
    resting.extend(pool);
    Round::new(games, resting)
}

/// Builds a full schedule round by round with [`build_round_greedy`].
///
/// Returns the schedule together with the ledger it produced.
pub fn build_schedule_greedy(
    shape: &EventShape,
    plan: &[ByeSet],
    meeting_cap: Option<u32>,
) -> Result<(Schedule, PairingLedger), ScheduleError> {
    let mut ledger = PairingLedger::new(shape.participants).with_meeting_cap(meeting_cap);
    let none = HashSet::new();
    let mut rounds = Vec::with_capacity(plan.len());
    for byes in plan {
        let round = build_round_greedy(byes, shape.games_per_round, &ledger, &none);
        ledger.record_round(&round)?;
        rounds.push(round);
    }
    ledger.commit();
    Ok((Schedule::new(*shape, rounds), ledger))
}
