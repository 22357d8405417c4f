//! The fixed frame every search explores.

use super::byes::{plan_byes, ByePolicy, ByeSet};
use super::greedy::build_schedule_greedy;
use crate::error::ScheduleError;
use crate::ledger::PairingLedger;
use crate::schedule::{EventShape, Schedule};

/// Event shape, bye policy with its starting per-round plan, and optional
/// meeting cap.
///
/// The plan seeds greedy construction and local search. Exact search
/// branches over every bye set the policy allows instead.
///
/// Shared read-only by every search worker.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    pub shape: EventShape,
    pub policy: ByePolicy,
    pub plan: Vec<ByeSet>,
    pub meeting_cap: Option<u32>,
}

impl SearchSpace {
    /// Plans the byes of every round under `policy`.
    pub fn new(
        shape: EventShape,
        policy: ByePolicy,
        meeting_cap: Option<u32>,
    ) -> Result<Self, ScheduleError> {
        let plan = plan_byes(&shape, policy)?;
        Ok(Self {
            shape,
            policy,
            plan,
            meeting_cap,
        })
    }

    /// An empty ledger tracking this space's meeting cap.
    pub fn empty_ledger(&self) -> PairingLedger {
        PairingLedger::new(self.shape.participants).with_meeting_cap(self.meeting_cap)
    }

    /// Rebuilds the ledger of a complete schedule.
    pub fn ledger_of(&self, schedule: &Schedule) -> Result<PairingLedger, ScheduleError> {
        Ok(PairingLedger::from_rounds(self.shape.participants, schedule.rounds())?
            .with_meeting_cap(self.meeting_cap))
    }

    /// Greedy round-by-round schedule over the bye plan.
    pub fn greedy_schedule(&self) -> Result<Schedule, ScheduleError> {
        build_schedule_greedy(&self.shape, &self.plan, self.meeting_cap).map(|(s, _)| s)
    }

    /// Weight of one unit of cap excess in a combined cost, larger than
    /// any achievable penalty.
    pub fn cap_weight(&self) -> u64 {
        self.shape.total_games() as u64 + 1
    }
}
