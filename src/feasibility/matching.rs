//! Enumeration of every legal game set for one round.

use crate::ledger::PairingLedger;
use crate::schedule::{Game, Pair, ParticipantId};

/// A complete game set for one round with its cost against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Games in ascending `(lo, hi)` order.
    pub games: Vec<Game>,
    /// Repeats this round would add (games whose pair already met).
    pub added_penalty: u32,
}

/// All candidates of a round, cheapest first.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub rounds: Vec<Candidate>,
    /// True if enumeration stopped at the limit before covering every
    /// matching.
    pub truncated: bool,
}

/// Enumerates the perfect matchings of `active`, cheapest first.
///
/// Matchings are generated in passes of increasing added penalty: pass `k`
/// emits exactly the matchings adding `k` repeats and cuts every branch
/// that already adds more. Within a pass, matchings come in lexicographic
/// order (the lowest free participant is always paired first). Matchings
/// that would push a pair past the ledger's meeting cap are skipped. At most
/// `limit` matchings are produced (0 = unlimited); when the limit cuts
/// enumeration short, the kept matchings are still the cheapest ones.
pub fn round_candidates(active: &[ParticipantId], ledger: &PairingLedger, limit: usize) -> Candidates {
    let mut pool = active.to_vec();
    pool.sort_unstable();

    let mut walk = Walk {
        used: vec![false; pool.len()],
        games: Vec::with_capacity(pool.len() / 2),
        pool,
        ledger,
        limit,
        threshold: 0,
        over_threshold: false,
        out: Candidates::default(),
    };
    loop {
        walk.over_threshold = false;
        walk.extend(0);
        if walk.out.truncated || !walk.over_threshold {
            break;
        }
        walk.threshold += 1;
    }
    walk.out
}

/// Depth-first matching enumeration restricted to one penalty level.
struct Walk<'a> {
    pool: Vec<ParticipantId>,
    used: Vec<bool>,
    games: Vec<Game>,
    ledger: &'a PairingLedger,
    limit: usize,
    /// Added penalty emitted by the current pass.
    threshold: u32,
    /// Some branch was cut for exceeding the threshold, so another pass
    /// has work to do.
    over_threshold: bool,
    out: Candidates,
}

impl Walk<'_> {
    fn extend(&mut self, added: u32) {
        let Some(first) = self.used.iter().position(|&u| !u) else {
            // cheaper matchings were emitted by earlier passes
            if added < self.threshold {
                return;
            }
            if self.limit > 0 && self.out.rounds.len() >= self.limit {
                self.out.truncated = true;
                return;
            }
            self.out.rounds.push(Candidate {
                games: self.games.clone(),
                added_penalty: added,
            });
            return;
        };

        self.used[first] = true;
        for second in (first + 1)..self.pool.len() {
            if self.used[second] {
                continue;
            }
            let pair = Pair::ordered(self.pool[first], self.pool[second]);
            if self.ledger.exceeds_cap(pair) {
                continue;
            }
            let next = added + self.ledger.added_penalty(pair);
            if next > self.threshold {
                self.over_threshold = true;
                continue;
            }
            self.used[second] = true;
            self.games.push(pair);
            self.extend(next);
            self.games.pop();
            self.used[second] = false;
            if self.out.truncated {
                break;
            }
        }
        self.used[first] = false;
    }
}

/// The game set pairing neighbours in ascending id order: `(a0, a1), (a2, a3), ...`.
pub fn canonical_round(active: &[ParticipantId]) -> Vec<Game> {
    let mut sorted = active.to_vec();
    sorted.sort_unstable();
    sorted
        .chunks_exact(2)
        .map(|c| Pair::ordered(c[0], c[1]))
        .collect()
}
