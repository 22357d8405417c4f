//! Journaled pair-count ledger.

use crate::error::ScheduleError;
use crate::schedule::{Pair, ParticipantId, Round};

/// Objective contribution of a pair that met `count` times.
///
/// The first meeting is free; every later one costs 1.
#[inline]
pub fn penalty(count: u32) -> u32 {
    count.saturating_sub(1)
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Recorded(Pair),
    Retracted(Pair),
    Bye(ParticipantId),
    ByeRetracted(ParticipantId),
}

/// Marker returned by [`PairingLedger::snapshot`].
///
/// Restoring undoes every change made after the snapshot, in
/// O(changes since the snapshot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    mark: usize,
    epoch: u64,
}

/// Symmetric meeting-count matrix plus per-participant bye and game totals.
///
/// Every mutation is journaled so that search can checkpoint and roll back
/// without copying the O(P²) matrix. The ledger only tracks history; round
/// legality is the feasibility layer's concern.
///
/// An optional meeting cap makes the ledger also track *cap excess*: the
/// sum over pairs of `max(count - cap, 0)`.
#[derive(Debug, Clone)]
pub struct PairingLedger {
    num_participants: usize,
    counts: Vec<u32>,
    byes: Vec<u32>,
    games: Vec<u32>,
    opponents: Vec<u32>,
    total_games: usize,
    distinct_pairs: usize,
    penalty: u64,
    meeting_cap: Option<u32>,
    cap_excess: u64,
    journal: Vec<Entry>,
    epoch: u64,
}

impl PairingLedger {
    /// Creates an empty ledger for `num_participants` participants.
    pub fn new(num_participants: usize) -> Self {
        Self {
            num_participants,
            counts: vec![0; num_participants * num_participants.saturating_sub(1) / 2],
            byes: vec![0; num_participants],
            games: vec![0; num_participants],
            opponents: vec![0; num_participants],
            total_games: 0,
            distinct_pairs: 0,
            penalty: 0,
            meeting_cap: None,
            cap_excess: 0,
            journal: Vec::new(),
            epoch: 0,
        }
    }

    /// Tracks how far pair counts exceed `cap`.
    pub fn with_meeting_cap(mut self, cap: Option<u32>) -> Self {
        self.meeting_cap = cap;
        self.cap_excess = match cap {
            Some(cap) => self.counts.iter().map(|&c| u64::from(c.saturating_sub(cap))).sum(),
            None => 0,
        };
        self
    }

    /// Rebuilds a ledger from finished rounds.
    pub fn from_rounds(num_participants: usize, rounds: &[Round]) -> Result<Self, ScheduleError> {
        let mut ledger = Self::new(num_participants);
        for round in rounds {
            ledger.record_round(round)?;
        }
        ledger.commit();
        Ok(ledger)
    }

    pub fn num_participants(&self) -> usize {
        self.num_participants
    }

    fn checked_pair(&self, a: ParticipantId, b: ParticipantId) -> Result<Pair, ScheduleError> {
        if a >= self.num_participants || b >= self.num_participants {
            return Err(ScheduleError::InvalidPair {
                a,
                b,
                reason: "participant id out of range",
            });
        }
        Pair::new(a, b)
    }

    /// Records one game between `a` and `b`, returning the new meeting count.
    pub fn record(&mut self, a: ParticipantId, b: ParticipantId) -> Result<u32, ScheduleError> {
        let pair = self.checked_pair(a, b)?;
        self.journal.push(Entry::Recorded(pair));
        Ok(self.bump(pair))
    }

    /// Removes one previously recorded game between `a` and `b`.
    ///
    /// Used by local search when a move rewrites a round.
    pub fn retract(&mut self, a: ParticipantId, b: ParticipantId) -> Result<u32, ScheduleError> {
        let pair = self.checked_pair(a, b)?;
        if self.counts[pair.index()] == 0 {
            return Err(ScheduleError::InvalidPair {
                a,
                b,
                reason: "retracting a game that was never recorded",
            });
        }
        self.journal.push(Entry::Retracted(pair));
        Ok(self.drop_game(pair))
    }

    /// Records that `p` rests for one round.
    pub fn record_bye(&mut self, p: ParticipantId) {
        self.byes[p] += 1;
        self.journal.push(Entry::Bye(p));
    }

    /// Removes one bye of `p`.
    pub fn retract_bye(&mut self, p: ParticipantId) {
        debug_assert!(self.byes[p] > 0);
        self.byes[p] -= 1;
        self.journal.push(Entry::ByeRetracted(p));
    }

    /// Records every game and bye of a round.
    pub fn record_round(&mut self, round: &Round) -> Result<(), ScheduleError> {
        for game in round.games() {
            self.record(game.lo(), game.hi())?;
        }
        for &p in round.resting() {
            self.record_bye(p);
        }
        Ok(())
    }

    fn bump(&mut self, pair: Pair) -> u32 {
        let slot = &mut self.counts[pair.index()];
        *slot += 1;
        let count = *slot;
        if count == 1 {
            self.distinct_pairs += 1;
            self.opponents[pair.lo()] += 1;
            self.opponents[pair.hi()] += 1;
        } else {
            self.penalty += 1;
        }
        if matches!(self.meeting_cap, Some(cap) if count > cap) {
            self.cap_excess += 1;
        }
        self.games[pair.lo()] += 1;
        self.games[pair.hi()] += 1;
        self.total_games += 1;
        count
    }

    fn drop_game(&mut self, pair: Pair) -> u32 {
        let slot = &mut self.counts[pair.index()];
        let before = *slot;
        *slot -= 1;
        if before == 1 {
            self.distinct_pairs -= 1;
            self.opponents[pair.lo()] -= 1;
            self.opponents[pair.hi()] -= 1;
        } else {
            self.penalty -= 1;
        }
        if matches!(self.meeting_cap, Some(cap) if before > cap) {
            self.cap_excess -= 1;
        }
        self.games[pair.lo()] -= 1;
        self.games[pair.hi()] -= 1;
        self.total_games -= 1;
        before - 1
    }

    /// Meeting count of `pair` (0 if never played).
    #[inline]
    pub fn count_of(&self, pair: Pair) -> u32 {
        self.counts[pair.index()]
    }

    /// Meeting count by participant ids; a participant never meets itself.
    #[inline]
    pub fn count_between(&self, a: ParticipantId, b: ParticipantId) -> u32 {
        if a == b {
            0
        } else {
            self.counts[Pair::ordered(a, b).index()]
        }
    }

    /// Current objective contribution of `pair`.
    pub fn penalty(&self, pair: Pair) -> u32 {
        penalty(self.count_of(pair))
    }

    /// Penalty added by playing `pair` once more.
    #[inline]
    pub fn added_penalty(&self, pair: Pair) -> u32 {
        u32::from(self.count_of(pair) > 0)
    }

    /// Whether playing `pair` once more would exceed the meeting cap.
    #[inline]
    pub fn exceeds_cap(&self, pair: Pair) -> bool {
        matches!(self.meeting_cap, Some(cap) if self.count_of(pair) >= cap)
    }

    /// Sum of [`penalty`] over all pairs, maintained incrementally.
    pub fn total_penalty(&self) -> u64 {
        self.penalty
    }

    /// Sum over pairs of `max(count - cap, 0)`; always 0 without a cap.
    pub fn cap_excess(&self) -> u64 {
        self.cap_excess
    }

    pub fn meeting_cap(&self) -> Option<u32> {
        self.meeting_cap
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }

    /// Number of pairs that met at least once.
    pub fn distinct_pairs(&self) -> usize {
        self.distinct_pairs
    }

    /// Pairs that never met.
    pub fn fresh_pairs(&self) -> usize {
        self.counts.len() - self.distinct_pairs
    }

    /// Participants `p` has never met.
    pub fn fresh_opponents(&self, p: ParticipantId) -> usize {
        self.num_participants.saturating_sub(1) - self.opponents[p] as usize
    }

    pub fn bye_count(&self, p: ParticipantId) -> u32 {
        self.byes[p]
    }

    pub fn games_played(&self, p: ParticipantId) -> u32 {
        self.games[p]
    }

    /// Every pair with a nonzero count.
    pub fn pairs(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        (1..self.num_participants).flat_map(move |hi| {
            (0..hi).filter_map(move |lo| {
                let pair = Pair::ordered(lo, hi);
                let c = self.counts[pair.index()];
                (c > 0).then_some((pair, c))
            })
        })
    }

    /// Marks the current state for a later [`restore`](Self::restore).
    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint {
            mark: self.journal.len(),
            epoch: self.epoch,
        }
    }

    /// Rolls back every change made since `checkpoint`.
    ///
    /// Fails with [`ScheduleError::StaleCheckpoint`] if a [`commit`](Self::commit)
    /// happened after the checkpoint was taken; the ledger is left untouched.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), ScheduleError> {
        if checkpoint.epoch != self.epoch {
            return Err(ScheduleError::StaleCheckpoint {
                taken: checkpoint.epoch,
                current: self.epoch,
            });
        }
        while self.journal.len() > checkpoint.mark {
            match self.journal.pop() {
                Some(Entry::Recorded(pair)) => {
                    self.drop_game(pair);
                }
                Some(Entry::Retracted(pair)) => {
                    self.bump(pair);
                }
                Some(Entry::Bye(p)) => self.byes[p] -= 1,
                Some(Entry::ByeRetracted(p)) => self.byes[p] += 1,
                None => break,
            }
        }
        Ok(())
    }

    /// Forgets the journal, invalidating all outstanding checkpoints.
    pub fn commit(&mut self) {
        self.journal.clear();
        self.epoch += 1;
    }
}
