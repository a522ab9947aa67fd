//! Named scenario catalog. Each scenario pairs a configuration and a script
//! with an expectation checked against the finished run.
use anyhow::{Result, ensure};
use rand_chacha::ChaCha8Rng;

use photoday_sim::{
    EndReason, EventKind, FeedbackPolicyId, FeedbackReason, FeedbackThresholds, LightState,
    SimConfig, SimulationPhase,
};

use super::harness::{Action, Harness, RunSummary, day_length_ms};
use super::student::random_script;

pub type Expectation = fn(&RunSummary) -> Result<()>;

#[derive(Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    config: fn() -> SimConfig,
    script: fn(&mut ChaCha8Rng) -> Vec<Action>,
    expectation: Expectation,
}

impl Scenario {
    #[must_use]
    pub fn config(&self) -> SimConfig {
        (self.config)()
    }

    #[must_use]
    pub fn script(&self, rng: &mut ChaCha8Rng) -> Vec<Action> {
        (self.script)(rng)
    }

    /// Run-wide invariants first, then the scenario's own expectation.
    pub fn check(&self, summary: &RunSummary) -> Result<()> {
        series_are_consistent(summary)?;
        energy_in_range(summary)?;
        (self.expectation)(summary)
    }
}

fn lit_day() -> f64 {
    day_length_ms(LightState::On, false)
}

fn series_are_consistent(summary: &RunSummary) -> Result<()> {
    for (idx, trial) in summary.trials.iter().enumerate() {
        for day in 0..=trial.last_day() {
            let (Some(created), Some(used), Some(stored)) =
                (trial.created_on(day), trial.used_on(day), trial.stored_on(day))
            else {
                anyhow::bail!("trial {idx} is missing day {day}");
            };
            ensure!(
                stored == created - used,
                "trial {idx} day {day}: stored {stored} != {created} - {used}"
            );
        }
    }
    Ok(())
}

fn energy_in_range(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.energy_min >= 0.0 && summary.energy_max <= 100.0,
        "energy left [0, 100]: min {} max {}",
        summary.energy_min,
        summary.energy_max
    );
    Ok(())
}

fn default_config() -> SimConfig {
    SimConfig::default()
}

fn dark_config() -> SimConfig {
    SimConfig {
        initial_light: LightState::Off,
        ..SimConfig::default()
    }
}

fn short_config() -> SimConfig {
    SimConfig {
        max_days: 5,
        ..SimConfig::default()
    }
}

fn aggregate_config() -> SimConfig {
    SimConfig {
        feedback_policy: FeedbackPolicyId::Aggregate,
        ..SimConfig::default()
    }
}

fn template_config() -> SimConfig {
    SimConfig {
        initial_light: LightState::Off,
        feedback_policy: FeedbackPolicyId::Templates,
        feedback_thresholds: Some(FeedbackThresholds {
            min_trials: 1,
            min_trial_interval: 1,
            ..FeedbackThresholds::default()
        }),
        ..SimConfig::default()
    }
}

const PAUSE_AT_MS: f64 = 2_550.0;
const PAUSE_GAP_MS: f64 = 5_000.0;

fn pause_resume_animated_ms() -> f64 {
    2.0 * lit_day() + 3_000.0
}

fn full_light(summary: &RunSummary) -> Result<()> {
    let trial = summary.current_trial().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    ensure!(trial.created_on(5) == Some(20), "created after 5 days: {:?}", trial.created_on(5));
    ensure!(trial.used_on(5) == Some(10), "used after 5 days: {:?}", trial.used_on(5));
    ensure!(summary.phase == SimulationPhase::Running, "phase {:?}", summary.phase);
    ensure!(!trial.has_event(EventKind::PlantDied), "plant died in full light");
    Ok(())
}

fn dies_on_day_one(summary: &RunSummary) -> Result<()> {
    let trial = summary.current_trial().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    ensure!(
        summary.phase == SimulationPhase::Ended(EndReason::PlantDied),
        "phase {:?}",
        summary.phase
    );
    ensure!(trial.last_day() == 1, "last recorded day {}", trial.last_day());
    ensure!(trial.created_on(1) == Some(0), "glucose created in darkness");
    Ok(())
}

fn storage_runs_out(summary: &RunSummary) -> Result<()> {
    let trial = summary.current_trial().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    ensure!(trial.has_event(EventKind::PlantDied), "plant survived darkness");
    ensure!(trial.last_day() == 7, "died on day {}", trial.last_day());
    ensure!(trial.stored_on(6) == Some(0), "stored before death {:?}", trial.stored_on(6));
    Ok(())
}

fn matches_uninterrupted_run(summary: &RunSummary) -> Result<()> {
    let reference = Harness::new(SimConfig::default(), 50.0)?.run(&[
        Action::Start,
        Action::Wait(pause_resume_animated_ms()),
    ]);
    let (Some(paused), Some(steady)) = (summary.current_trial(), reference.current_trial()) else {
        anyhow::bail!("missing trial");
    };
    ensure!(summary.day == reference.day, "day {} vs {}", summary.day, reference.day);
    ensure!(paused.created() == steady.created(), "created series diverged");
    ensure!(paused.stored() == steady.stored(), "stored series diverged");
    Ok(())
}

fn reset_opens_fresh_trial(summary: &RunSummary) -> Result<()> {
    ensure!(summary.trials.len() == 2, "{} trials", summary.trials.len());
    let outgoing = &summary.trials[0];
    ensure!(
        outgoing.events().last().map(|event| event.kind) == Some(EventKind::ResetClicked),
        "outgoing trial not closed by reset"
    );
    let fresh = &summary.trials[1];
    ensure!(fresh.events().is_empty(), "fresh trial has events");
    ensure!(fresh.created() == [(0, 0)], "fresh trial series {:?}", fresh.created());
    ensure!(summary.phase == SimulationPhase::Stopped, "phase {:?}", summary.phase);
    Ok(())
}

fn ends_at_max_days(summary: &RunSummary) -> Result<()> {
    let trial = summary.current_trial().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    ensure!(
        summary.phase == SimulationPhase::Ended(EndReason::MaxDaysReached),
        "phase {:?}",
        summary.phase
    );
    ensure!(trial.last_day() == 5, "last day {}", trial.last_day());
    ensure!(trial.has_event(EventKind::SimulationEnded), "no end event");
    Ok(())
}

fn no_feedback(summary: &RunSummary) -> Result<()> {
    ensure!(summary.feedback.is_empty(), "feedback {:?}", summary.feedback);
    Ok(())
}

fn nudged_to_turn_light_off(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.feedback == [FeedbackReason::NeverLightOff],
        "feedback {:?}",
        summary.feedback
    );
    Ok(())
}

fn told_to_move_on(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.feedback == [FeedbackReason::MoveOn],
        "feedback {:?}",
        summary.feedback
    );
    Ok(())
}

fn doubled_day_length(summary: &RunSummary) -> Result<()> {
    let trial = summary.current_trial().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    ensure!(summary.day == 2, "day {}", summary.day);
    ensure!(trial.last_day() == 1, "last day {}", trial.last_day());
    Ok(())
}

#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            key: "full-light",
            description: "Five untouched days in full light",
            config: default_config,
            script: |_| vec![Action::Start, Action::Wait(5.0 * lit_day())],
            expectation: full_light,
        },
        Scenario {
            key: "dark-start",
            description: "Light off with nothing stored",
            config: dark_config,
            script: |_| vec![Action::Start, Action::RunToEnd],
            expectation: dies_on_day_one,
        },
        Scenario {
            key: "stored-dark-days",
            description: "Three lit days, then darkness until storage runs out",
            config: default_config,
            script: |_| {
                vec![
                    Action::Start,
                    Action::Wait(3.0 * lit_day() - 500.0),
                    Action::Light(0),
                    Action::RunToEnd,
                ]
            },
            expectation: storage_runs_out,
        },
        Scenario {
            key: "pause-resume",
            description: "Pausing mid-step changes nothing but wall time",
            config: default_config,
            script: |_| {
                vec![
                    Action::Start,
                    Action::Wait(PAUSE_AT_MS),
                    Action::Pause,
                    Action::Wait(PAUSE_GAP_MS),
                    Action::Resume,
                    Action::Wait(pause_resume_animated_ms() - PAUSE_AT_MS),
                ]
            },
            expectation: matches_uninterrupted_run,
        },
        Scenario {
            key: "reset-mid-trial",
            description: "Reset during day two",
            config: default_config,
            script: |_| vec![Action::Start, Action::Wait(10_000.0), Action::Reset],
            expectation: reset_opens_fresh_trial,
        },
        Scenario {
            key: "max-days",
            description: "Short trial runs to its day limit",
            config: short_config,
            script: |_| vec![Action::Start, Action::RunToEnd],
            expectation: ends_at_max_days,
        },
        Scenario {
            key: "speed-ratio",
            description: "Half speed doubles the length of a day",
            config: default_config,
            script: |_| vec![Action::Speed(2.0), Action::Start, Action::Wait(2.0 * lit_day())],
            expectation: doubled_day_length,
        },
        Scenario {
            key: "aggregate-feedback",
            description: "Three short trials with the light always on",
            config: aggregate_config,
            script: |_| [Action::Start, Action::FastForward, Action::Reset].repeat(3),
            expectation: nudged_to_turn_light_off,
        },
        Scenario {
            key: "template-feedback",
            description: "Starve the plant, then run one more trial",
            config: template_config,
            script: |_| {
                vec![
                    Action::Start,
                    Action::RunToEnd,
                    Action::Reset,
                    Action::Light(100),
                    Action::Start,
                    Action::FastForward,
                    Action::Reset,
                ]
            },
            expectation: told_to_move_on,
        },
        Scenario {
            key: "random-student",
            description: "Seeded random button presses keep every invariant",
            config: default_config,
            script: |rng| random_script(rng, 60),
            expectation: no_feedback,
        },
    ]
}

#[must_use]
pub fn find_scenario(key: &str) -> Option<Scenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}
