//! Feasibility layer.
//!
//! Round-local construction and validation, independent of search history
//! except for the tie-breaking counts read from the ledger.
//!
//! - [`enumerate_bye_set`] / [`plan_byes`]: who rests each round;
//!   [`bye_choices`]: every fair alternative when bye totals tie
//! - [`build_round_greedy`]: cheapest-pair-first round construction, used
//!   for the initial schedule and for local-search repair
//! - [`round_candidates`]: every legal game set of a round, cheapest first,
//!   for exact search
//! - [`is_legal_round`]: sanity check after any mutation
//! - [`SearchSpace`]: shape, bye policy and meeting cap shared by the engines

mod byes;
mod greedy;
mod legality;
mod matching;
mod space;

pub use byes::{bye_choices, bye_window, enumerate_bye_set, plan_byes, ByePolicy, ByeSet};
pub use greedy::{build_round_greedy, build_schedule_greedy};
pub(crate) use legality::check_round;
pub use legality::is_legal_round;
pub use matching::{canonical_round, round_candidates, Candidate, Candidates};
pub use space::SearchSpace;
