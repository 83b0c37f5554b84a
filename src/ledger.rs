//! Step-to-treat bookkeeping.
//!
//! `Ledger` owns the persisted [`LedgerState`] plus the summary computed by the
//! most recent refresh. Operations are pure; the ones that change persisted
//! state return a flag so the caller knows when to write it out.

use crate::models::{Conversion, LedgerState, StepSummary};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Ledger {
    state: LedgerState,
    steps_per_treat: u64,
    last_summary: Option<StepSummary>,
}

impl Ledger {
    pub fn new(state: LedgerState, steps_per_treat: u64) -> Self {
        Self {
            state,
            steps_per_treat: steps_per_treat.max(1),
            last_summary: None,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn steps_per_treat(&self) -> u64 {
        self.steps_per_treat
    }

    pub fn last_summary(&self) -> Option<StepSummary> {
        self.last_summary
    }

    /// Resets the converted-step counter when `today` differs from the stored date.
    ///
    /// Returns `true` when a rollover happened.
    pub fn check_and_rollover_day(&mut self, today: NaiveDate) -> bool {
        if self.state.last_update_date == Some(today) {
            return false;
        }

        self.state.last_update_date = Some(today);
        self.state.converted_steps = 0;
        self.last_summary = None;
        true
    }

    pub fn refresh_steps_today(&mut self, raw_total: u64) -> StepSummary {
        let available_steps = raw_total.saturating_sub(self.state.converted_steps);
        let summary = StepSummary {
            total_steps: raw_total,
            available_steps,
            available_treats: available_steps / self.steps_per_treat,
        };
        self.last_summary = Some(summary);
        summary
    }

    /// Turns the treats found by the last refresh into owned treats.
    ///
    /// `None` means there was nothing to convert and no state changed.
    pub fn convert(&mut self) -> Option<Conversion> {
        let summary = self.last_summary?;
        if summary.available_treats == 0 {
            return None;
        }

        let treats = summary.available_treats;
        let steps_converted = treats * self.steps_per_treat;
        let remaining_steps = summary.available_steps - steps_converted;

        self.state.converted_steps = self.state.converted_steps.saturating_add(steps_converted);
        self.state.total_treats = self.state.total_treats.saturating_add(treats);
        self.last_summary = Some(StepSummary {
            total_steps: summary.total_steps,
            available_steps: remaining_steps,
            available_treats: 0,
        });

        Some(Conversion {
            treats_minted: treats,
            steps_converted,
            remaining_steps,
        })
    }

    /// Spends one treat. Returns `false` when there was none to spend.
    pub fn consume_treat(&mut self) -> bool {
        if self.state.total_treats == 0 {
            return false;
        }
        self.state.total_treats -= 1;
        true
    }
}
