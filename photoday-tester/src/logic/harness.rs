//! Drives a controller with a manual clock from a scripted action list.
use anyhow::{Context, Result};
use serde::Serialize;

use photoday_sim::{
    Clock, DayPlan, FeedbackReason, LightState, ManualClock, RecordingSink, SimConfig,
    SimulationController, SimulationPhase, Trial, TrialStore, new_session,
};

/// Upper bound for `RunToEnd`, well past any 365-day trial.
const RUN_TO_END_LIMIT_MS: f64 = 4_000_000.0;

/// One thing a scripted student does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    Start,
    Pause,
    Resume,
    Reset,
    Light(u8),
    Speed(f64),
    /// Let simulated time pass, ticking at the harness rate.
    Wait(f64),
    FastForward,
    RunToEnd,
}

/// What a finished script left behind.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub phase: SimulationPhase,
    pub day: u32,
    pub trials: Vec<Trial>,
    pub energy_min: f64,
    pub energy_max: f64,
    pub feedback: Vec<FeedbackReason>,
    pub render_calls: usize,
    pub elapsed_ms: f64,
}

impl RunSummary {
    #[must_use]
    pub fn current_trial(&self) -> Option<&Trial> {
        self.trials.last()
    }
}

pub struct Harness {
    sim: SimulationController<RecordingSink, ManualClock>,
    clock: ManualClock,
    store: TrialStore,
    tick_ms: f64,
}

impl Harness {
    pub fn new(config: SimConfig, tick_ms: f64) -> Result<Self> {
        anyhow::ensure!(
            tick_ms.is_finite() && tick_ms > 0.0,
            "tick interval must be positive (got {tick_ms})"
        );
        let clock = ManualClock::new();
        let (sim, store) = new_session(config, RecordingSink::default(), clock.clone())
            .context("invalid scenario configuration")?;
        Ok(Self {
            sim,
            clock,
            store,
            tick_ms,
        })
    }

    pub fn run(mut self, script: &[Action]) -> RunSummary {
        for action in script {
            self.apply(*action);
        }
        self.finish()
    }

    pub fn apply(&mut self, action: Action) {
        log::trace!("apply {action:?}");
        match action {
            Action::Start => self.sim.start(),
            Action::Pause => self.sim.pause(),
            Action::Resume => self.sim.resume(),
            Action::Reset => self.sim.reset(),
            Action::Light(percent) => self.sim.request_light_change(percent),
            Action::Speed(ratio) => {
                self.sim.set_animation_speed_ratio(ratio);
            }
            Action::Wait(ms) => self.wait(ms),
            Action::FastForward => self.sim.fast_forward_day(),
            Action::RunToEnd => {
                let mut waited = 0.0;
                while self.sim.phase().has_cycle_in_flight() && waited < RUN_TO_END_LIMIT_MS {
                    if self.sim.phase() == SimulationPhase::Paused {
                        self.sim.resume();
                    }
                    self.wait(self.tick_ms);
                    waited += self.tick_ms;
                }
            }
        }
    }

    fn wait(&mut self, ms: f64) {
        let mut elapsed = 0.0;
        while elapsed < ms {
            let step = self.tick_ms.min(ms - elapsed);
            self.clock.advance(step);
            elapsed += step;
            self.sim.tick();
        }
    }

    pub fn finish(self) -> RunSummary {
        let readings = self.sim.sink().energy_readings();
        let energy_min = readings.iter().copied().fold(f64::INFINITY, f64::min);
        let energy_max = readings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        RunSummary {
            phase: self.sim.phase(),
            day: self.sim.day(),
            trials: self.store.snapshot(),
            energy_min,
            energy_max,
            feedback: self
                .sim
                .sink()
                .feedback()
                .into_iter()
                .map(|feedback| feedback.reason)
                .collect(),
            render_calls: self.sim.sink().calls.len(),
            elapsed_ms: self.clock.now_ms(),
        }
    }
}

/// Animated length of one day at speed ratio 1.0.
#[must_use]
pub fn day_length_ms(light: LightState, can_cover_respiration: bool) -> f64 {
    DayPlan::build(light, can_cover_respiration)
        .steps
        .iter()
        .map(|step| step.duration_ms)
        .sum()
}
