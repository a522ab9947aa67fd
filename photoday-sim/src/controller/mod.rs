//! Day-cycle state machine tying the sequencer to the energy and glucose models.
//!
//! Work only happens inside UI calls and [`SimulationController::tick`]; the
//! controller never blocks. Each day is loaded into the sequencer as an
//! explicit step plan, and progress/completion signals are applied here in
//! order, so a day's ledger entry and events are written before the next day
//! is loaded.
use crate::clock::Clock;
use crate::config::{ConfigError, SimConfig};
use crate::constants::{
    ENERGY_MAX, ENERGY_MIN, GLUCOSE_USED_PER_DAY, MAX_SPEED_RATIO, PLOT_BAND_LIGHT_HALF,
    PLOT_BAND_LIGHT_OFF,
};
use crate::energy::EnergyModel;
use crate::feedback::{FeedbackEngine, FeedbackPolicy};
use crate::ledger::GlucoseLedger;
use crate::light::LightState;
use crate::recorder::TrialRecorder;
use crate::render::{ChartSeries, GlucoseStage, GlucoseVisual, LeafVariant, PlotBand, RenderSink};
use crate::sequencer::{AnimationSequencer, StepSignal};
use crate::trial::{EventKind, TrialStore};

pub mod day;
pub mod phase;

pub use day::{DayKind, DayPlan, DayStep, surplus_units};
pub use phase::{EndReason, SimulationPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlightDay {
    kind: DayKind,
    light: LightState,
}

/// Drives one trial at a time through its simulated days.
pub struct SimulationController<R, C>
where
    R: RenderSink,
    C: Clock,
{
    config: SimConfig,
    policy: FeedbackPolicy,
    sink: R,
    clock: C,
    phase: SimulationPhase,
    day: u32,
    light: LightState,
    queued_light: Option<LightState>,
    in_flight: Option<InFlightDay>,
    energy: EnergyModel,
    ledger: GlucoseLedger,
    recorder: TrialRecorder,
    sequencer: AnimationSequencer<DayStep>,
    feedback: FeedbackEngine,
}

impl<R, C> SimulationController<R, C>
where
    R: RenderSink,
    C: Clock,
{
    /// Validate `config`, open the first trial in `store`, and draw the
    /// initial scene.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration is invalid.
    pub fn new(
        config: SimConfig,
        store: TrialStore,
        sink: R,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial_stored = config.initial_stored_glucose;
        let recorder = TrialRecorder::new(store.clone(), initial_stored);
        recorder.start_trial();

        let mut controller = Self {
            policy: config.feedback_policy(),
            sink,
            clock,
            phase: SimulationPhase::Stopped,
            day: 0,
            light: config.initial_light,
            queued_light: None,
            in_flight: None,
            energy: EnergyModel::new(),
            ledger: GlucoseLedger::new(store, initial_stored),
            recorder,
            sequencer: AnimationSequencer::new(config.speed_ratio),
            feedback: FeedbackEngine::new(config.initial_light),
            config,
        };
        controller.render_fresh_trial();
        Ok(controller)
    }

    /// Stopped → Running; day 1 begins.
    pub fn start(&mut self) {
        if self.phase != SimulationPhase::Stopped {
            log::debug!("start ignored while {:?}", self.phase);
            return;
        }
        self.phase = SimulationPhase::Running;
        self.recorder.record_event(EventKind::StartClicked, &self.clock);
        let now = self.clock.now_ms();
        self.begin_day(now);
    }

    /// Running → Paused, freezing the in-flight step where it is now.
    pub fn pause(&mut self) {
        if !self.phase.is_running() {
            log::debug!("pause ignored while {:?}", self.phase);
            return;
        }
        self.tick();
        if !self.phase.is_running() {
            return;
        }
        self.sequencer.pause(self.clock.now_ms());
        self.phase = SimulationPhase::Paused;
        self.recorder.record_event(EventKind::PauseClicked, &self.clock);
    }

    /// Paused → Running, continuing from the frozen fraction.
    pub fn resume(&mut self) {
        if self.phase != SimulationPhase::Paused {
            log::debug!("resume ignored while {:?}", self.phase);
            return;
        }
        self.sequencer.resume(self.clock.now_ms());
        self.phase = SimulationPhase::Running;
        self.recorder.record_event(EventKind::ResumeClicked, &self.clock);
    }

    /// Any phase → Stopped with a fresh trial.
    ///
    /// In-flight steps are cancelled without completion. The outgoing trial is
    /// closed with a reset event and stays untouched in the store afterwards.
    pub fn reset(&mut self) {
        let _cancelled = self.sequencer.stop(false);
        let outgoing_started = self
            .recorder
            .store()
            .current()
            .is_some_and(|trial| trial.was_started());
        self.recorder.record_event(EventKind::ResetClicked, &self.clock);
        if outgoing_started {
            self.present_feedback();
        }

        self.phase = SimulationPhase::Stopped;
        self.day = 0;
        self.in_flight = None;
        self.energy.reset_full();
        self.ledger.reset();
        if let Some(light) = self.queued_light.take() {
            self.apply_light(light);
        }
        self.recorder.start_trial();
        self.render_fresh_trial();
    }

    /// Select a light level by switch percentage (0, 50 or 100).
    ///
    /// While a day is in flight the change waits for the next day boundary;
    /// otherwise it applies at once. Unknown or redundant requests are ignored.
    pub fn request_light_change(&mut self, percent: u8) {
        let Some(requested) = LightState::from_percent(percent, self.config.light_mode) else {
            log::debug!("light request {percent}% not offered in {:?}", self.config.light_mode);
            return;
        };
        if requested == self.queued_light.unwrap_or(self.light) {
            return;
        }
        self.recorder.record_event(requested.event_kind(), &self.clock);
        if self.phase.has_cycle_in_flight() {
            self.queued_light = (requested != self.light).then_some(requested);
        } else {
            self.apply_light(requested);
        }
    }

    /// Scale the duration of steps that start after this call.
    pub fn set_animation_speed_ratio(&mut self, ratio: f64) -> bool {
        if ratio > MAX_SPEED_RATIO || !self.sequencer.set_speed_ratio(ratio) {
            log::debug!("speed ratio {ratio} rejected");
            return false;
        }
        true
    }

    /// Apply every step signal due up to the clock's current time.
    pub fn tick(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        let now = self.clock.now_ms();
        loop {
            let signals = self.sequencer.advance(now);
            if signals.is_empty() {
                break;
            }
            for signal in signals {
                self.handle(signal);
            }
            if !self.phase.is_running() {
                break;
            }
        }
    }

    /// Finish the in-flight day immediately; the next day starts now.
    pub fn fast_forward_day(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        self.tick();
        if !self.phase.is_running() {
            return;
        }
        for signal in self.sequencer.stop(true) {
            self.handle(signal);
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Current day; 0 before the first day of a trial.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub const fn energy_level(&self) -> f64 {
        self.energy.level()
    }

    /// Light applied to the current day.
    #[must_use]
    pub const fn light(&self) -> LightState {
        self.light
    }

    #[must_use]
    pub const fn queued_light(&self) -> Option<LightState> {
        self.queued_light
    }

    #[must_use]
    pub const fn ledger(&self) -> &GlucoseLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn store(&self) -> &TrialStore {
        self.recorder.store()
    }

    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub const fn policy(&self) -> &FeedbackPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn speed_ratio(&self) -> f64 {
        self.sequencer.speed_ratio()
    }

    #[must_use]
    pub fn active_step(&self) -> Option<DayStep> {
        self.sequencer.active_step().copied()
    }

    #[must_use]
    pub const fn sink(&self) -> &R {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn begin_day(&mut self, start_ms: f64) {
        let next = self.day.saturating_add(1);
        if next > self.config.max_days {
            self.finish(EndReason::MaxDaysReached);
            return;
        }
        self.day = next;
        if let Some(light) = self.queued_light.take() {
            self.apply_light(light);
        }

        let plan = DayPlan::build(self.light, self.ledger.can_cover_respiration());
        log::debug!("day {} begins: {:?} under {:?}", self.day, plan.kind, plan.light);
        self.sink.update_day_text(self.day);
        self.sink.update_day_color(plan.light);
        self.in_flight = Some(InFlightDay {
            kind: plan.kind,
            light: plan.light,
        });
        self.sequencer.load(plan.steps, start_ms);
    }

    fn handle(&mut self, signal: StepSignal<DayStep>) {
        match signal {
            StepSignal::Progress { step, ratio } => self.on_progress(step, ratio),
            StepSignal::Completed { step } => self.on_completed(step),
        }
    }

    fn on_progress(&mut self, step: DayStep, ratio: f64) {
        if let Some((from, to)) = step.energy_band() {
            let level = self.energy.drain(from, to, ratio);
            self.sink.update_energy_display(level);
        }
        let light = self.in_flight.map_or(self.light, |day| day.light);
        let visual = match step {
            DayStep::StoreSurplus => {
                Some((GlucoseStage::Storing, surplus_units(light), 1.0 - ratio))
            }
            DayStep::GrowStored => Some((GlucoseStage::Growing, GLUCOSE_USED_PER_DAY, ratio)),
            DayStep::ConsumeStored => {
                Some((GlucoseStage::Consuming, GLUCOSE_USED_PER_DAY, 1.0 - ratio))
            }
            _ => None,
        };
        if let Some((stage, units, scale)) = visual {
            self.sink
                .update_glucose_visual(GlucoseVisual { stage, units, scale });
        }
    }

    fn on_completed(&mut self, step: DayStep) {
        debug_assert!(
            (ENERGY_MIN..=ENERGY_MAX).contains(&self.energy.level()),
            "energy {} out of range after {step:?}",
            self.energy.level()
        );
        match step {
            DayStep::Production => {
                let light = self.in_flight.map_or(self.light, |day| day.light);
                self.sink.update_glucose_visual(GlucoseVisual {
                    stage: GlucoseStage::Produced,
                    units: light.glucose_yield(),
                    scale: 1.0,
                });
            }
            DayStep::Decay(window) => self.sink.show_leaf(LeafVariant::for_decay_window(window)),
            DayStep::Commit => self.commit_day(),
            DayStep::Rest => {
                let start = self
                    .sequencer
                    .finished_at()
                    .unwrap_or_else(|| self.clock.now_ms());
                self.begin_day(start);
            }
            _ => {}
        }
    }

    fn commit_day(&mut self) {
        let Some(day) = self.in_flight else {
            debug_assert!(false, "commit without a day in flight");
            return;
        };
        let (created, used) = day.kind.ledger_flags();
        self.ledger.record_day(self.day, day.light, created, used);

        if self.config.show_chart {
            self.push_series();
            let color = match day.light {
                LightState::Off => Some(PLOT_BAND_LIGHT_OFF),
                LightState::Half => Some(PLOT_BAND_LIGHT_HALF),
                LightState::On => None,
            };
            if let Some(color) = color {
                self.sink.add_plot_band(PlotBand {
                    from: f64::from(self.day - 1),
                    to: f64::from(self.day),
                    color,
                });
            }
        }

        if day.kind.is_terminal() {
            self.finish(EndReason::PlantDied);
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.phase = SimulationPhase::Ended(reason);
        self.in_flight = None;
        log::info!("trial ended on day {}: {reason:?}", self.day);
        match reason {
            EndReason::MaxDaysReached => {
                self.recorder.record_event(EventKind::SimulationEnded, &self.clock);
                self.sink.show_simulation_ended();
            }
            EndReason::PlantDied => {
                self.recorder.record_event(EventKind::PlantDied, &self.clock);
                self.sink.show_plant_died();
            }
        }
        self.present_feedback();
    }

    fn apply_light(&mut self, light: LightState) {
        self.light = light;
        self.sink.turn_light_visual(light);
    }

    fn present_feedback(&mut self) {
        let feedback = self
            .recorder
            .store()
            .with_trials(|trials| self.feedback.evaluate(trials, &self.policy));
        if let Some(feedback) = feedback {
            self.sink.show_feedback(&feedback);
        }
    }

    fn push_series(&mut self) {
        let Some(trial) = self.recorder.store().current() else {
            return;
        };
        for series in ChartSeries::ALL {
            let points = match series {
                ChartSeries::Created => trial.created(),
                ChartSeries::Used => trial.used(),
                ChartSeries::Stored => trial.stored(),
            };
            self.sink.set_series_data(series, points);
        }
    }

    fn render_fresh_trial(&mut self) {
        self.sink.update_day_text(self.day);
        self.sink.update_day_color(self.light);
        self.sink.show_leaf(LeafVariant::Healthy);
        self.sink.turn_light_visual(self.light);
        self.sink.update_energy_display(self.energy.level());
        self.sink.update_glucose_visual(GlucoseVisual {
            stage: GlucoseStage::Produced,
            units: 0,
            scale: 1.0,
        });
        if self.config.show_chart {
            self.sink.clear_plot_bands();
            self.push_series();
        }
    }
}
