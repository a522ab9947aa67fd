use crate::Clock;
use crate::trial::{Event, EventKind, Trial, TrialStore};

/// Appends trials and timestamped events to the shared store.
#[derive(Debug, Clone)]
pub struct TrialRecorder {
    store: TrialStore,
    initial_stored: i32,
}

impl TrialRecorder {
    #[must_use]
    pub const fn new(store: TrialStore, initial_stored: i32) -> Self {
        Self {
            store,
            initial_stored,
        }
    }

    /// Append a fresh trial seeded at day 0 and make it current.
    pub fn start_trial(&self) {
        self.store.push(Trial::seeded(self.initial_stored));
        log::debug!("trial {} started", self.store.len());
    }

    /// Append `kind` to the current trial, stamped with the clock's time.
    pub fn record_event(&self, kind: EventKind, clock: &impl Clock) {
        let event = Event {
            kind,
            timestamp: clock.now_ms(),
        };
        let recorded = self.store.with_current_mut(|trial| trial.push_event(event));
        debug_assert!(recorded.is_some(), "event {kind:?} recorded without a trial");
    }

    #[must_use]
    pub const fn store(&self) -> &TrialStore {
        &self.store
    }
}
