use crate::light::LightState;
use crate::trial::{EventKind, Trial};

use super::template::FeedbackTemplate;

/// Aggregate facts about a student's trials, derived in one pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrialFacts {
    /// Trials the student actually started.
    pub started_trials: usize,
    pub ever_light_off_while_running: bool,
    /// Longest uninterrupted running stretch across all trials.
    pub longest_running_ms: f64,
    /// Days simulated, summed over every trial.
    pub total_days: u32,
    pub ever_died: bool,
    /// Started-trial ordinal (0-based) of the first trial matching a target.
    pub first_target_match: Option<usize>,
}

impl TrialFacts {
    /// Walk every trial's events and series once.
    ///
    /// The light switch keeps its position across resets, so light state is
    /// carried from one trial into the next, beginning at `initial_light`.
    #[must_use]
    pub fn derive(
        trials: &[Trial],
        initial_light: LightState,
        targets: &[&FeedbackTemplate],
    ) -> Self {
        let mut facts = Self::default();
        let mut light = initial_light;

        for trial in trials {
            let mut run_started: Option<f64> = None;
            for event in trial.events() {
                match event.kind {
                    EventKind::LightOff => light = LightState::Off,
                    EventKind::LightHalf => light = LightState::Half,
                    EventKind::LightOn => light = LightState::On,
                    EventKind::PlantDied => facts.ever_died = true,
                    _ => {}
                }
                if event.kind.starts_running() {
                    run_started = Some(event.timestamp);
                } else if event.kind.stops_running() {
                    if let Some(start) = run_started.take() {
                        facts.longest_running_ms =
                            facts.longest_running_ms.max(event.timestamp - start);
                    }
                }
                if run_started.is_some() && light == LightState::Off {
                    facts.ever_light_off_while_running = true;
                }
            }
            if let (Some(start), Some(last)) = (run_started, trial.events().last()) {
                facts.longest_running_ms = facts.longest_running_ms.max(last.timestamp - start);
            }

            facts.total_days = facts.total_days.saturating_add(trial.last_day());
            if !trial.was_started() {
                continue;
            }
            if facts.first_target_match.is_none()
                && targets.iter().any(|template| template.matches(trial))
            {
                facts.first_target_match = Some(facts.started_trials);
            }
            facts.started_trials += 1;
        }
        facts
    }
}
