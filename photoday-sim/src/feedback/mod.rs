//! Guidance decided from a student's interaction history.
//!
//! The engine looks at every retained trial, derives a handful of aggregate
//! facts, and maps them through the session's [`FeedbackPolicy`] to at most
//! one canned message.
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{
    FEEDBACK_LONG_RUN_DAYS, FEEDBACK_MIN_TRIAL_INTERVAL, FEEDBACK_MIN_TRIALS,
    FEEDBACK_SHORT_TRIAL_MS,
};
use crate::light::LightState;
use crate::trial::Trial;

pub mod facts;
pub mod template;

pub use facts::TrialFacts;
pub use template::{DayFlag, FeedbackTemplate};

/// Why a piece of feedback was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    NeverLightOff,
    AllShortTrials,
    PlantNeverDied,
    CumulativeDaysExceeded,
    MoveOn,
}

impl FeedbackReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NeverLightOff => {
                "Try turning the light off while the simulation is running. What happens to the glucose the plant has stored?"
            }
            Self::AllShortTrials => {
                "Let the simulation run for several days before pausing or resetting so you can see how glucose changes over time."
            }
            Self::PlantNeverDied => {
                "What would happen if the plant could not make glucose for many days in a row? Test your prediction."
            }
            Self::CumulativeDaysExceeded => {
                "You have simulated many days. Compare your graphs: how are glucose created, used and stored related?"
            }
            Self::MoveOn => "Nice work exploring this scenario. You are ready to move on to the next activity.",
        }
    }
}

/// Guidance text to interrupt the student with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub reason: FeedbackReason,
    pub message: String,
}

impl From<FeedbackReason> for Feedback {
    fn from(reason: FeedbackReason) -> Self {
        Self {
            reason,
            message: reason.message().to_string(),
        }
    }
}

/// Host-facing policy identifier chosen at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPolicyId {
    #[default]
    None,
    Aggregate,
    Templates,
}

/// Gating and cut-off values shared by every policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackThresholds {
    /// Started trials required before any feedback.
    #[serde(default = "FeedbackThresholds::default_min_trials")]
    pub min_trials: usize,
    /// Started trials required between two presentations.
    #[serde(default = "FeedbackThresholds::default_min_trial_interval")]
    pub min_trial_interval: usize,
    /// Running stretches shorter than this count as short trials.
    #[serde(default = "FeedbackThresholds::default_short_trial_ms")]
    pub short_trial_ms: f64,
    /// Cumulative simulated days considered a long investigation.
    #[serde(default = "FeedbackThresholds::default_long_run_days")]
    pub long_run_days: u32,
}

impl FeedbackThresholds {
    const fn default_min_trials() -> usize {
        FEEDBACK_MIN_TRIALS
    }

    const fn default_min_trial_interval() -> usize {
        FEEDBACK_MIN_TRIAL_INTERVAL
    }

    const fn default_short_trial_ms() -> f64 {
        FEEDBACK_SHORT_TRIAL_MS
    }

    const fn default_long_run_days() -> u32 {
        FEEDBACK_LONG_RUN_DAYS
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.min_trials == 0 {
            return Err(ConfigError::MinViolation {
                field: "feedback_thresholds.min_trials",
                min: 1.0,
                value: 0.0,
            });
        }
        if self.min_trial_interval == 0 {
            return Err(ConfigError::MinViolation {
                field: "feedback_thresholds.min_trial_interval",
                min: 1.0,
                value: 0.0,
            });
        }
        if !self.short_trial_ms.is_finite() || self.short_trial_ms < 0.0 {
            return Err(ConfigError::MinViolation {
                field: "feedback_thresholds.short_trial_ms",
                min: 0.0,
                value: self.short_trial_ms,
            });
        }
        Ok(())
    }
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            min_trials: Self::default_min_trials(),
            min_trial_interval: Self::default_min_trial_interval(),
            short_trial_ms: Self::default_short_trial_ms(),
            long_run_days: Self::default_long_run_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatePolicy {
    #[serde(default)]
    pub thresholds: FeedbackThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePolicy {
    #[serde(default)]
    pub thresholds: FeedbackThresholds,
    pub templates: Vec<FeedbackTemplate>,
    /// Names of templates whose completion unlocks the move-on message.
    pub targets: Vec<String>,
}

impl TemplatePolicy {
    /// Standard scenarios for a trial of `max_days` days.
    #[must_use]
    pub fn standard(max_days: u32) -> Self {
        let len = usize::try_from(max_days).map_or(usize::MAX, |days| days.saturating_add(1));
        let templates = vec![
            FeedbackTemplate::lit_then_dark("four_days_light", 4, len),
            FeedbackTemplate::starved("starved_from_start", len),
        ];
        let targets = templates.iter().map(|t| t.name.clone()).collect();
        Self {
            thresholds: FeedbackThresholds::default(),
            templates,
            targets,
        }
    }

    fn target_templates(&self) -> Vec<&FeedbackTemplate> {
        self.templates
            .iter()
            .filter(|template| self.targets.iter().any(|name| name == &template.name))
            .collect()
    }
}

/// When and what canned guidance to show; immutable for a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackPolicy {
    #[default]
    None,
    Aggregate(AggregatePolicy),
    Templates(TemplatePolicy),
}

impl FeedbackPolicy {
    #[must_use]
    pub fn from_id(id: FeedbackPolicyId, max_days: u32) -> Self {
        match id {
            FeedbackPolicyId::None => Self::None,
            FeedbackPolicyId::Aggregate => Self::Aggregate(AggregatePolicy::default()),
            FeedbackPolicyId::Templates => Self::Templates(TemplatePolicy::standard(max_days)),
        }
    }

    #[must_use]
    pub fn with_thresholds(self, thresholds: FeedbackThresholds) -> Self {
        match self {
            Self::None => Self::None,
            Self::Aggregate(_) => Self::Aggregate(AggregatePolicy { thresholds }),
            Self::Templates(policy) => Self::Templates(TemplatePolicy {
                thresholds,
                ..policy
            }),
        }
    }

    #[must_use]
    pub const fn thresholds(&self) -> Option<&FeedbackThresholds> {
        match self {
            Self::None => None,
            Self::Aggregate(policy) => Some(&policy.thresholds),
            Self::Templates(policy) => Some(&policy.thresholds),
        }
    }
}

/// Decides feedback and remembers when it last interrupted the student.
#[derive(Debug, Clone)]
pub struct FeedbackEngine {
    initial_light: LightState,
    presented_at: Option<usize>,
}

impl FeedbackEngine {
    #[must_use]
    pub const fn new(initial_light: LightState) -> Self {
        Self {
            initial_light,
            presented_at: None,
        }
    }

    /// Decide whether to show feedback given every retained trial.
    pub fn evaluate(&mut self, trials: &[Trial], policy: &FeedbackPolicy) -> Option<Feedback> {
        let thresholds = policy.thresholds()?;
        let targets = match policy {
            FeedbackPolicy::Templates(templates) => templates.target_templates(),
            FeedbackPolicy::None | FeedbackPolicy::Aggregate(_) => Vec::new(),
        };
        let facts = TrialFacts::derive(trials, self.initial_light, &targets);

        if facts.started_trials < thresholds.min_trials {
            return None;
        }
        if let Some(presented) = self.presented_at {
            if facts.started_trials.saturating_sub(presented) < thresholds.min_trial_interval {
                return None;
            }
        }

        let reason = match policy {
            FeedbackPolicy::None => None,
            FeedbackPolicy::Aggregate(_) => aggregate_reason(&facts, thresholds),
            FeedbackPolicy::Templates(_) => template_reason(&facts),
        }?;
        self.presented_at = Some(facts.started_trials);
        log::info!(
            "feedback {reason:?} after {} started trials",
            facts.started_trials
        );
        Some(Feedback::from(reason))
    }

    /// Started-trial count at the last presentation, if any.
    #[must_use]
    pub const fn presented_at(&self) -> Option<usize> {
        self.presented_at
    }
}

fn aggregate_reason(facts: &TrialFacts, thresholds: &FeedbackThresholds) -> Option<FeedbackReason> {
    if !facts.ever_light_off_while_running {
        Some(FeedbackReason::NeverLightOff)
    } else if facts.longest_running_ms < thresholds.short_trial_ms {
        Some(FeedbackReason::AllShortTrials)
    } else if !facts.ever_died {
        Some(FeedbackReason::PlantNeverDied)
    } else if facts.total_days > thresholds.long_run_days {
        Some(FeedbackReason::CumulativeDaysExceeded)
    } else {
        None
    }
}

fn template_reason(facts: &TrialFacts) -> Option<FeedbackReason> {
    let matched = facts.first_target_match?;
    (facts.started_trials > matched + 1).then_some(FeedbackReason::MoveOn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::{Event, EventKind};

    fn trial(events: &[(EventKind, f64)], days: &[(i32, i32)]) -> Trial {
        let mut trial = Trial::seeded(0);
        for (idx, &(created, used)) in days.iter().enumerate() {
            trial.push_day(u32::try_from(idx + 1).unwrap(), created, used);
        }
        for &(kind, timestamp) in events {
            trial.push_event(Event { kind, timestamp });
        }
        trial
    }

    fn started(duration_ms: f64) -> Trial {
        trial(
            &[
                (EventKind::StartClicked, 0.0),
                (EventKind::PauseClicked, duration_ms),
            ],
            &[(4, 2)],
        )
    }

    fn permissive_aggregate() -> FeedbackPolicy {
        FeedbackPolicy::Aggregate(AggregatePolicy {
            thresholds: FeedbackThresholds {
                min_trials: 2,
                min_trial_interval: 1,
                ..FeedbackThresholds::default()
            },
        })
    }

    #[test]
    fn none_policy_never_speaks() {
        let trials: Vec<_> = (0..10).map(|_| started(60_000.0)).collect();
        let mut engine = FeedbackEngine::new(LightState::On);
        assert_eq!(engine.evaluate(&trials, &FeedbackPolicy::None), None);
    }

    #[test]
    fn minimum_trial_count_gates_everything() {
        let mut engine = FeedbackEngine::new(LightState::On);
        let policy = FeedbackPolicy::from_id(FeedbackPolicyId::Aggregate, 21);
        let trials = vec![started(1.0), started(1.0)];
        assert_eq!(engine.evaluate(&trials, &policy), None);

        let unstarted = vec![Trial::seeded(0); 5];
        assert_eq!(engine.evaluate(&unstarted, &policy), None);
    }

    #[test]
    fn aggregate_checks_follow_priority() {
        let policy = permissive_aggregate();

        let mut engine = FeedbackEngine::new(LightState::On);
        let never_off = vec![started(60_000.0), started(60_000.0)];
        assert_eq!(
            engine.evaluate(&never_off, &policy).map(|f| f.reason),
            Some(FeedbackReason::NeverLightOff)
        );

        let mut engine = FeedbackEngine::new(LightState::Off);
        let short = vec![started(500.0), started(900.0)];
        assert_eq!(
            engine.evaluate(&short, &policy).map(|f| f.reason),
            Some(FeedbackReason::AllShortTrials)
        );

        let mut engine = FeedbackEngine::new(LightState::Off);
        let long_alive = vec![started(500.0), started(30_000.0)];
        assert_eq!(
            engine.evaluate(&long_alive, &policy).map(|f| f.reason),
            Some(FeedbackReason::PlantNeverDied)
        );

        let mut engine = FeedbackEngine::new(LightState::Off);
        let died = trial(
            &[
                (EventKind::StartClicked, 0.0),
                (EventKind::PlantDied, 30_000.0),
            ],
            &[(0, 0)],
        );
        let many_days = trial(
            &[(EventKind::StartClicked, 0.0)],
            &vec![(4, 2); 70],
        );
        assert_eq!(
            engine.evaluate(&[died.clone(), many_days], &policy).map(|f| f.reason),
            Some(FeedbackReason::CumulativeDaysExceeded)
        );

        let mut engine = FeedbackEngine::new(LightState::Off);
        assert_eq!(engine.evaluate(&[died.clone(), died], &policy), None);
    }

    #[test]
    fn repeat_presentations_wait_for_the_interval() {
        let policy = FeedbackPolicy::Aggregate(AggregatePolicy {
            thresholds: FeedbackThresholds {
                min_trials: 1,
                min_trial_interval: 2,
                ..FeedbackThresholds::default()
            },
        });
        let mut engine = FeedbackEngine::new(LightState::On);
        let mut trials = vec![started(60_000.0)];
        assert!(engine.evaluate(&trials, &policy).is_some());
        assert_eq!(engine.presented_at(), Some(1));

        trials.push(started(60_000.0));
        assert!(engine.evaluate(&trials, &policy).is_none());
        trials.push(started(60_000.0));
        assert!(engine.evaluate(&trials, &policy).is_some());
    }

    #[test]
    fn template_policy_moves_on_one_trial_after_a_match() {
        let mut policy = TemplatePolicy::standard(21);
        policy.thresholds.min_trials = 1;
        policy.thresholds.min_trial_interval = 1;
        let policy = FeedbackPolicy::Templates(policy);

        let starved = trial(
            &[
                (EventKind::StartClicked, 0.0),
                (EventKind::PlantDied, 5_000.0),
            ],
            &[(0, 0)],
        );
        let mut engine = FeedbackEngine::new(LightState::Off);
        assert_eq!(engine.evaluate(&[starved.clone()], &policy), None);

        let follow_up = started(1_000.0);
        let feedback = engine.evaluate(&[starved, follow_up], &policy).unwrap();
        assert_eq!(feedback.reason, FeedbackReason::MoveOn);
        assert_eq!(feedback.message, FeedbackReason::MoveOn.message());
    }

    #[test]
    fn policy_round_trips_with_kind_tag() {
        let policy = FeedbackPolicy::from_id(FeedbackPolicyId::Templates, 21);
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains(r#""kind":"templates""#));
        let restored: FeedbackPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, policy);
    }
}
