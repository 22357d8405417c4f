//! Per-pair meeting histogram of a finished schedule.

use super::types::{Pair, Schedule};
use std::collections::BTreeMap;

/// Meeting counts of every pair that played at least once.
///
/// Kept as a list sorted by pair so it serializes as a plain sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairHistogram {
    counts: Vec<(Pair, u32)>,
}

impl PairHistogram {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            counts: schedule.pair_counts().into_iter().collect(),
        }
    }

    /// Meeting count of `pair` (0 if they never met).
    pub fn count(&self, pair: Pair) -> u32 {
        self.counts
            .binary_search_by_key(&pair, |&(p, _)| p)
            .map_or(0, |i| self.counts[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Pairs that met more than once.
    pub fn repeats(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.iter().filter(|&(_, c)| c > 1)
    }

    /// Number of distinct pairings realized.
    pub fn distinct_pairs(&self) -> usize {
        self.counts.len()
    }

    pub fn max_meetings(&self) -> u32 {
        self.counts.iter().map(|&(_, c)| c).max().unwrap_or(0)
    }

    /// Meeting count -> number of pairs with that count.
    pub fn distribution(&self) -> BTreeMap<u32, usize> {
        let mut dist = BTreeMap::new();
        for &(_, c) in &self.counts {
            *dist.entry(c).or_insert(0) += 1;
        }
        dist
    }

    pub fn total_penalty(&self) -> u64 {
        self.counts
            .iter()
            .map(|&(_, c)| u64::from(c.saturating_sub(1)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EventShape, Round};

    #[test]
    fn test_histogram_distribution() {
        let p = |a, b| Pair::new(a, b).unwrap();
        let schedule = Schedule::new(
            EventShape::new(4, 3, 2),
            vec![
                Round::new(vec![p(0, 1), p(2, 3)], vec![]),
                Round::new(vec![p(0, 1), p(2, 3)], vec![]),
                Round::new(vec![p(0, 1), p(2, 3)], vec![]),
            ],
        );
        let hist = PairHistogram::from_schedule(&schedule);

        assert_eq!(hist.count(p(0, 1)), 3);
        assert_eq!(hist.count(p(1, 3)), 0);
        assert_eq!(hist.max_meetings(), 3);
        assert_eq!(hist.repeats().count(), 2);
        assert_eq!(hist.total_penalty(), schedule.total_penalty());
        assert_eq!(hist.distribution().get(&3), Some(&2));
        assert_eq!(hist.distinct_pairs(), 2);
    }
}
