//! Trial records and the shared append-only trial store.
//!
//! A trial is one run from start (or reset) to its end. The serialized shape is
//! consumed by host pages, so field names follow their camelCase contract:
//!
//! ```json
//! { "glucoseCreatedData": [[0, 0], [1, 4]],
//!   "glucoseUsedData":    [[0, 0], [1, 2]],
//!   "glucoseStoredData":  [[0, 0], [1, 2]],
//!   "events": [{ "name": "startClicked", "timestamp": 12.5 }] }
//! ```
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// `(day, running total)` pair; serialized as a two-element array.
pub type SeriesPoint = (u32, i32);

/// Student interaction or simulation outcome recorded on a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    StartClicked,
    PauseClicked,
    ResumeClicked,
    ResetClicked,
    LightOn,
    LightOff,
    LightHalf,
    PlantDied,
    SimulationEnded,
}

impl EventKind {
    /// Events after which the simulation is no longer running.
    #[must_use]
    pub const fn stops_running(self) -> bool {
        matches!(
            self,
            Self::PauseClicked | Self::ResetClicked | Self::PlantDied | Self::SimulationEnded
        )
    }

    /// Events after which the simulation is running.
    #[must_use]
    pub const fn starts_running(self) -> bool {
        matches!(self, Self::StartClicked | Self::ResumeClicked)
    }
}

/// Timestamped entry in a trial's event log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "name")]
    pub kind: EventKind,
    /// Monotonic milliseconds from the controller clock.
    pub timestamp: f64,
}

/// One complete run with its glucose series and event log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trial {
    #[serde(rename = "glucoseCreatedData")]
    created: Vec<SeriesPoint>,
    #[serde(rename = "glucoseUsedData")]
    used: Vec<SeriesPoint>,
    #[serde(rename = "glucoseStoredData")]
    stored: Vec<SeriesPoint>,
    #[serde(default)]
    events: Vec<Event>,
}

impl Trial {
    /// Fresh trial with every series seeded at day 0.
    #[must_use]
    pub fn seeded(initial_stored: i32) -> Self {
        Self {
            created: vec![(0, initial_stored)],
            used: vec![(0, 0)],
            stored: vec![(0, initial_stored)],
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn created(&self) -> &[SeriesPoint] {
        &self.created
    }

    #[must_use]
    pub fn used(&self) -> &[SeriesPoint] {
        &self.used
    }

    #[must_use]
    pub fn stored(&self) -> &[SeriesPoint] {
        &self.stored
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn created_on(&self, day: u32) -> Option<i32> {
        lookup(&self.created, day)
    }

    #[must_use]
    pub fn used_on(&self, day: u32) -> Option<i32> {
        lookup(&self.used, day)
    }

    #[must_use]
    pub fn stored_on(&self, day: u32) -> Option<i32> {
        lookup(&self.stored, day)
    }

    /// Last day written to the ledger (0 when no day completed).
    #[must_use]
    pub fn last_day(&self) -> u32 {
        self.created.last().map_or(0, |&(day, _)| day)
    }

    /// Whether the student ever pressed start on this trial.
    #[must_use]
    pub fn was_started(&self) -> bool {
        self.has_event(EventKind::StartClicked)
    }

    #[must_use]
    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.iter().any(|event| event.kind == kind)
    }

    pub(crate) fn push_day(&mut self, day: u32, created: i32, used: i32) {
        debug_assert!(
            self.created.last().is_none_or(|&(last, _)| last < day),
            "day {day} written out of order"
        );
        self.created.push((day, created));
        self.used.push((day, used));
        self.stored.push((day, created - used));
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

fn lookup(series: &[SeriesPoint], day: u32) -> Option<i32> {
    series
        .binary_search_by_key(&day, |&(d, _)| d)
        .ok()
        .and_then(|idx| series.get(idx))
        .map(|&(_, total)| total)
}

/// Shared handle over the append-only list of trials.
///
/// The controller writes through the recorder and ledger while the feedback
/// engine reads, all on one thread; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct TrialStore {
    trials: Rc<RefCell<Vec<Trial>>>,
}

impl TrialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trials.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.borrow().is_empty()
    }

    /// Borrow all retained trials for the duration of `f`.
    pub fn with_trials<R>(&self, f: impl FnOnce(&[Trial]) -> R) -> R {
        f(&self.trials.borrow())
    }

    /// Clone of every retained trial, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Trial> {
        self.trials.borrow().clone()
    }

    /// Clone of the trial currently being written.
    #[must_use]
    pub fn current(&self) -> Option<Trial> {
        self.trials.borrow().last().cloned()
    }

    /// Serialize all trials in the host-page export shape.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.trials.borrow())
    }

    pub(crate) fn push(&self, trial: Trial) {
        self.trials.borrow_mut().push(trial);
    }

    pub(crate) fn with_current_mut<R>(&self, f: impl FnOnce(&mut Trial) -> R) -> Option<R> {
        self.trials.borrow_mut().last_mut().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_shape_matches_host_contract() {
        let mut trial = Trial::seeded(0);
        trial.push_day(1, 4, 2);
        trial.push_event(Event {
            kind: EventKind::StartClicked,
            timestamp: 12.5,
        });

        let value = serde_json::to_value(&trial).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "glucoseCreatedData": [[0, 0], [1, 4]],
                "glucoseUsedData": [[0, 0], [1, 2]],
                "glucoseStoredData": [[0, 0], [1, 2]],
                "events": [{ "name": "startClicked", "timestamp": 12.5 }]
            })
        );

        let restored: Trial = serde_json::from_value(value).unwrap();
        assert_eq!(restored, trial);
    }

    #[test]
    fn lookups_find_days_and_report_gaps() {
        let mut trial = Trial::seeded(6);
        trial.push_day(1, 6, 2);
        assert_eq!(trial.created_on(0), Some(6));
        assert_eq!(trial.stored_on(1), Some(4));
        assert_eq!(trial.used_on(2), None);
        assert_eq!(trial.last_day(), 1);
    }

    #[test]
    fn store_clones_share_one_list() {
        let store = TrialStore::new();
        let reader = store.clone();
        store.push(Trial::seeded(0));
        store.with_current_mut(|trial| {
            trial.push_event(Event {
                kind: EventKind::LightOff,
                timestamp: 1.0,
            });
        });

        assert_eq!(reader.len(), 1);
        assert!(reader.current().unwrap().has_event(EventKind::LightOff));
        assert!(reader.to_json().unwrap().contains("lightOff"));
    }
}
