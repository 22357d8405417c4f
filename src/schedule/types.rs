//! Event data model: pairs, rounds, and full schedules.

use crate::error::ScheduleError;
use std::collections::BTreeMap;
use std::fmt;

/// Participant identifier in `[0, P)`.
pub type ParticipantId = usize;

/// Dimensions of an event: `P` participants, `R` rounds, `G` games per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventShape {
    /// Number of participants (`P`).
    pub participants: usize,
    /// Number of rounds (`R`).
    pub rounds: usize,
    /// Simultaneous two-participant games per round (`G`).
    pub games_per_round: usize,
}

impl EventShape {
    pub fn new(participants: usize, rounds: usize, games_per_round: usize) -> Self {
        Self {
            participants,
            rounds,
            games_per_round,
        }
    }

    /// Participants sitting out each round (`P - 2G`).
    pub fn resting_per_round(&self) -> usize {
        self.participants
            .saturating_sub(self.games_per_round.saturating_mul(2))
    }

    /// Total games over the whole event (`R * G`).
    pub fn total_games(&self) -> usize {
        self.rounds.saturating_mul(self.games_per_round)
    }

    /// Number of distinct unordered pairs, `C(P, 2)`.
    pub fn distinct_pairs(&self) -> usize {
        self.participants * self.participants.saturating_sub(1) / 2
    }

    /// Checks the dimensions.
    ///
    /// `G = 0` is allowed and produces all-bye rounds.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.participants == 0 {
            return Err(ScheduleError::InvalidConfig(
                "participants must be positive".into(),
            ));
        }
        if self.rounds == 0 {
            return Err(ScheduleError::InvalidConfig("rounds must be positive".into()));
        }
        if exceeds_seats(self.games_per_round, self.participants) {
            return Err(ScheduleError::InvalidConfig(format!(
                "{} games per round need more than the {} participants available",
                self.games_per_round, self.participants
            )));
        }
        Ok(())
    }
}

/// Whether `games_per_round` games need more seats than `participants`,
/// including when `2G` does not fit in a `usize`.
pub(crate) fn exceeds_seats(games_per_round: usize, participants: usize) -> bool {
    games_per_round
        .checked_mul(2)
        .is_none_or(|seats| seats > participants)
}

/// An unordered pair of distinct participants.
///
/// Stored canonically with `lo < hi`, so `Pair::new(3, 1) == Pair::new(1, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair {
    lo: ParticipantId,
    hi: ParticipantId,
}

/// A game is a pair scoped to one round.
pub type Game = Pair;

impl Pair {
    /// Creates a pair, failing if both ids are the same participant.
    pub fn new(a: ParticipantId, b: ParticipantId) -> Result<Self, ScheduleError> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Ok(Self { lo: b, hi: a }),
            std::cmp::Ordering::Equal => Err(ScheduleError::InvalidPair {
                a,
                b,
                reason: "participant paired with itself",
            }),
        }
    }

    /// Builds a pair from ids already known to differ.
    pub(crate) fn ordered(a: ParticipantId, b: ParticipantId) -> Self {
        debug_assert_ne!(a, b);
        if a < b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> ParticipantId {
        self.lo
    }

    pub fn hi(&self) -> ParticipantId {
        self.hi
    }

    pub fn participants(&self) -> [ParticipantId; 2] {
        [self.lo, self.hi]
    }

    pub fn contains(&self, p: ParticipantId) -> bool {
        self.lo == p || self.hi == p
    }

    /// Returns the opponent of `p` in this pair.
    pub fn opponent(&self, p: ParticipantId) -> Option<ParticipantId> {
        if p == self.lo {
            Some(self.hi)
        } else if p == self.hi {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Index into a strictly lower-triangular matrix.
    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.hi * (self.hi - 1) / 2 + self.lo
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

/// One round: `G` games plus the participants resting this round.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round {
    games: Vec<Game>,
    resting: Vec<ParticipantId>,
}

impl Round {
    pub fn new(games: Vec<Game>, mut resting: Vec<ParticipantId>) -> Self {
        resting.sort_unstable();
        Self { games, resting }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn resting(&self) -> &[ParticipantId] {
        &self.resting
    }

    /// Participants in play this round, in game order.
    pub fn players(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.games.iter().flat_map(|g| g.participants())
    }

    pub fn is_resting(&self, p: ParticipantId) -> bool {
        self.resting.contains(&p)
    }

    pub(crate) fn games_mut(&mut self) -> &mut Vec<Game> {
        &mut self.games
    }

    pub(crate) fn resting_mut(&mut self) -> &mut Vec<ParticipantId> {
        &mut self.resting
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, game) in self.games.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{game}")?;
        }
        if !self.resting.is_empty() {
            f.write_str(" | rest:")?;
            for p in &self.resting {
                write!(f, " {p}")?;
            }
        }
        Ok(())
    }
}

/// A complete event: an ordered sequence of rounds.
///
/// Schedules handed out by the solver are never mutated; search engines
/// work on their own copies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    shape: EventShape,
    rounds: Vec<Round>,
}

impl Schedule {
    /// Creates a schedule from finished rounds.
    pub fn new(shape: EventShape, rounds: Vec<Round>) -> Self {
        Self { shape, rounds }
    }

    pub fn shape(&self) -> EventShape {
        self.shape
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Iterates over every game of the event, round by round.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.rounds.iter().flat_map(|r| r.games().iter())
    }

    /// Meeting count of every pair that played at least once, recomputed
    /// from the raw game list.
    pub fn pair_counts(&self) -> BTreeMap<Pair, u32> {
        let mut counts = BTreeMap::new();
        for game in self.games() {
            *counts.entry(*game).or_insert(0) += 1;
        }
        counts
    }

    /// Sum over pairs of `max(count - 1, 0)`, recomputed from the raw games.
    pub fn total_penalty(&self) -> u64 {
        self.pair_counts()
            .values()
            .map(|&c| u64::from(c.saturating_sub(1)))
            .sum()
    }

    /// Number of rounds in which `p` rests.
    pub fn byes_of(&self, p: ParticipantId) -> usize {
        self.rounds.iter().filter(|r| r.is_resting(p)).count()
    }

    /// Number of games `p` plays.
    pub fn games_of(&self, p: ParticipantId) -> usize {
        self.games().filter(|g| g.contains(p)).count()
    }

    /// Checks every structural invariant of a finished schedule.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.rounds.len() != self.shape.rounds {
            return Err(ScheduleError::IllegalRound {
                round: self.rounds.len(),
                reason: format!(
                    "schedule has {} rounds, expected {}",
                    self.rounds.len(),
                    self.shape.rounds
                ),
            });
        }
        for (i, round) in self.rounds.iter().enumerate() {
            crate::feasibility::check_round(round, &self.shape)
                .map_err(|reason| ScheduleError::IllegalRound { round: i, reason })?;
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, round) in self.rounds.iter().enumerate() {
            writeln!(f, "Round {}: {round}", i + 1)?;
        }
        Ok(())
    }
}
