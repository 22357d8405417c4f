//! First-round symmetry breaking.

use crate::feasibility::{ByePolicy, Candidate, SearchSpace};
use crate::schedule::ParticipantId;
use std::collections::HashSet;

/// Groups participants that any relabeling may exchange.
///
/// Under [`ByePolicy::Equalize`] the set of allowed schedules is closed
/// under every relabeling, so all participants form one class; the caller
/// must then also fix the first round's bye set. Under
/// [`ByePolicy::Fixed`] participants are grouped by their bye pattern over
/// the plan, since relabeling within a class maps the plan onto itself.
pub(crate) fn participant_classes(space: &SearchSpace) -> Vec<usize> {
    let n = space.shape.participants;
    if space.policy == ByePolicy::Equalize {
        return vec![0; n];
    }
    let patterns: Vec<Vec<bool>> = (0..n)
        .map(|p| space.plan.iter().map(|set| set.resting.contains(&p)).collect())
        .collect();

    let mut classes = vec![0; n];
    let mut seen: Vec<&Vec<bool>> = Vec::new();
    for (p, pattern) in patterns.iter().enumerate() {
        classes[p] = match seen.iter().position(|s| *s == pattern) {
            Some(i) => i,
            None => {
                seen.push(pattern);
                seen.len() - 1
            }
        };
    }
    classes
}

/// Keeps one first-round candidate per multiset of class pairs.
///
/// Two game sets with the same class-pair multiset differ only by a
/// within-class relabeling. Input order is preserved, so the cheapest and
/// lexicographically first representative survives.
pub(crate) fn first_round_representatives(
    candidates: Vec<Candidate>,
    classes: &[usize],
) -> Vec<Candidate> {
    let class_of = |p: ParticipantId| classes[p];
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|cand| {
            let mut signature: Vec<(usize, usize)> = cand
                .games
                .iter()
                .map(|g| {
                    let (a, b) = (class_of(g.lo()), class_of(g.hi()));
                    (a.min(b), a.max(b))
                })
                .collect();
            signature.sort_unstable();
            seen.insert(signature)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::round_candidates;
    use crate::schedule::EventShape;

    #[test]
    fn test_single_class_without_byes() {
        let space = SearchSpace::new(EventShape::new(6, 4, 3), ByePolicy::Equalize, None).unwrap();
        let classes = participant_classes(&space);
        assert!(classes.iter().all(|&c| c == 0));

        let cands = round_candidates(&space.plan[0].active, &space.empty_ledger(), 0);
        let reps = first_round_representatives(cands.rounds, &classes);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].games, crate::feasibility::canonical_round(&space.plan[0].active));
    }

    #[test]
    fn test_classes_follow_bye_pattern() {
        // 7 participants, 2 games: 4, 5 and 6 always rest
        let space = SearchSpace::new(EventShape::new(7, 3, 2), ByePolicy::Fixed, None).unwrap();
        let classes = participant_classes(&space);
        assert!(classes[..4].iter().all(|&c| c == classes[0]));
        assert!(classes[4..].iter().all(|&c| c == classes[4]));
        assert_ne!(classes[0], classes[4]);

        // round 0 active {0,1,2,3} is a single class: one representative
        let cands = round_candidates(&space.plan[0].active, &space.empty_ledger(), 0);
        let reps = first_round_representatives(cands.rounds, &classes);
        assert_eq!(reps.len(), 1);
    }

    #[test]
    fn test_equalize_is_one_class() {
        let space = SearchSpace::new(EventShape::new(5, 2, 2), ByePolicy::Equalize, None).unwrap();
        assert_eq!(participant_classes(&space), vec![0; 5]);
    }
}
