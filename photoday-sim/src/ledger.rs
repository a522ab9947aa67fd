use serde::{Deserialize, Serialize};

use crate::constants::GLUCOSE_USED_PER_DAY;
use crate::light::LightState;
use crate::trial::TrialStore;

/// Running glucose totals after a recorded day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayTotals {
    pub day: u32,
    pub created: i32,
    pub used: i32,
    pub stored: i32,
}

/// Cumulative created/used/stored glucose for the current trial.
#[derive(Debug, Clone)]
pub struct GlucoseLedger {
    store: TrialStore,
    initial_stored: i32,
    created_total: i32,
    used_total: i32,
}

impl GlucoseLedger {
    #[must_use]
    pub const fn new(store: TrialStore, initial_stored: i32) -> Self {
        Self {
            store,
            initial_stored,
            created_total: initial_stored,
            used_total: 0,
        }
    }

    /// Record one completed day and append the totals to the current trial.
    ///
    /// `created` credits the light's yield, `used` debits one day of
    /// respiration. Death days pass `false` for both.
    pub fn record_day(
        &mut self,
        day: u32,
        light: LightState,
        created: bool,
        used: bool,
    ) -> DayTotals {
        if created {
            debug_assert!(light.is_lit(), "glucose created without light on day {day}");
            self.created_total = self.created_total.saturating_add(light.glucose_yield());
        }
        if used {
            self.used_total = self.used_total.saturating_add(GLUCOSE_USED_PER_DAY);
        }

        let totals = self.totals(day);
        let written = self
            .store
            .with_current_mut(|trial| trial.push_day(day, totals.created, totals.used));
        debug_assert!(written.is_some(), "day {day} recorded without a trial");
        log::debug!(
            "day {day}: created {} used {} stored {}",
            totals.created,
            totals.used,
            totals.stored
        );
        totals
    }

    /// Rewind to the seeded day-0 totals.
    pub const fn reset(&mut self) {
        self.created_total = self.initial_stored;
        self.used_total = 0;
    }

    #[must_use]
    pub const fn created_total(&self) -> i32 {
        self.created_total
    }

    #[must_use]
    pub const fn used_total(&self) -> i32 {
        self.used_total
    }

    #[must_use]
    pub const fn stored_total(&self) -> i32 {
        self.created_total - self.used_total
    }

    /// Whether storage can cover one day of respiration without light.
    #[must_use]
    pub const fn can_cover_respiration(&self) -> bool {
        self.stored_total() >= GLUCOSE_USED_PER_DAY
    }

    const fn totals(&self, day: u32) -> DayTotals {
        DayTotals {
            day,
            created: self.created_total,
            used: self.used_total,
            stored: self.stored_total(),
        }
    }
}
