//! Round legality checks.

use crate::schedule::{EventShape, ParticipantId, Round};

/// Whether `round` has exactly `games_per_round` games drawn from `active`
/// with no participant appearing twice.
pub fn is_legal_round(round: &Round, active: &[ParticipantId], games_per_round: usize) -> bool {
    if round.games().len() != games_per_round {
        return false;
    }
    let Some(&max_id) = active.iter().max() else {
        return games_per_round == 0;
    };
    let mut allowed = vec![false; max_id + 1];
    for &p in active {
        allowed[p] = true;
    }
    let mut seen = vec![false; max_id + 1];
    for p in round.players() {
        if p > max_id || !allowed[p] || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// Full structural check of a finished round against the event shape.
///
/// Every participant must appear exactly once, either in a game or
/// resting.
pub(crate) fn check_round(round: &Round, shape: &EventShape) -> Result<(), String> {
    if round.games().len() != shape.games_per_round {
        return Err(format!(
            "{} games, expected {}",
            round.games().len(),
            shape.games_per_round
        ));
    }
    if round.resting().len() != shape.resting_per_round() {
        return Err(format!(
            "{} resting, expected {}",
            round.resting().len(),
            shape.resting_per_round()
        ));
    }
    let mut seen = vec![false; shape.participants];
    for p in round.players().chain(round.resting().iter().copied()) {
        if p >= shape.participants {
            return Err(format!("unknown participant {p}"));
        }
        if seen[p] {
            return Err(format!("participant {p} appears twice"));
        }
        seen[p] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Pair;

    fn pair(a: usize, b: usize) -> Pair {
        Pair::new(a, b).unwrap()
    }

    #[test]
    fn test_legal_round() {
        let round = Round::new(vec![pair(0, 1), pair(2, 3)], vec![4]);
        assert!(is_legal_round(&round, &[0, 1, 2, 3], 2));
        assert!(check_round(&round, &EventShape::new(5, 1, 2)).is_ok());
    }

    #[test]
    fn test_duplicate_participant() {
        let round = Round::new(vec![pair(0, 1), pair(1, 3)], vec![]);
        assert!(!is_legal_round(&round, &[0, 1, 2, 3], 2));
        assert!(check_round(&round, &EventShape::new(4, 1, 2)).is_err());
    }

    #[test]
    fn test_wrong_game_count() {
        let round = Round::new(vec![pair(0, 1)], vec![2, 3]);
        assert!(!is_legal_round(&round, &[0, 1, 2, 3], 2));
    }

    #[test]
    fn test_inactive_participant() {
        let round = Round::new(vec![pair(0, 4)], vec![]);
        assert!(!is_legal_round(&round, &[0, 1], 1));
    }

    #[test]
    fn test_missing_participant() {
        let round = Round::new(vec![pair(0, 1)], vec![2]);
        assert_eq!(
            check_round(&round, &EventShape::new(4, 1, 1)),
            Err("1 resting, expected 2".to_string())
        );
    }

    #[test]
    fn test_empty_round() {
        let round = Round::new(vec![], vec![0, 1]);
        assert!(is_legal_round(&round, &[], 0));
        assert!(check_round(&round, &EventShape::new(2, 1, 0)).is_ok());
    }
}
