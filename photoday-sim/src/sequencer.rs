//! Ordered, timed animation steps driven by an external tick.
//!
//! The sequencer never owns callbacks. `advance` reports what happened since
//! the last tick as an ordered list of [`StepSignal`]s and the caller applies
//! them, which keeps pause/resume continuity testable without a renderer.
use std::collections::VecDeque;

/// A single timed transition in a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub label: T,
    /// Duration at speed ratio 1.0.
    pub duration_ms: f64,
}

impl<T> Step<T> {
    #[must_use]
    pub const fn new(label: T, duration_ms: f64) -> Self {
        Self { label, duration_ms }
    }

    /// Step that completes on the first tick after it activates.
    #[must_use]
    pub const fn instant(label: T) -> Self {
        Self::new(label, 0.0)
    }
}

/// Progress or completion reported by [`AnimationSequencer::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepSignal<T> {
    /// Monotonic progress ratio in `[0, 1]`.
    Progress { step: T, ratio: f64 },
    Completed { step: T },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Playback {
    Idle,
    Running,
    Paused { ratio: f64 },
}

#[derive(Debug, Clone)]
struct ActiveStep<T> {
    label: T,
    started_at: f64,
    /// Scaled duration fixed when the step activated.
    duration: f64,
    last_ratio: Option<f64>,
}

impl<T> ActiveStep<T> {
    fn ratio_at(&self, now_ms: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at) / self.duration).clamp(0.0, 1.0)
    }
}

/// Small owned state machine running one sequence of steps at a time.
#[derive(Debug, Clone)]
pub struct AnimationSequencer<T> {
    queue: VecDeque<Step<T>>,
    active: Option<ActiveStep<T>>,
    playback: Playback,
    speed_ratio: f64,
    finished_at: Option<f64>,
}

impl<T: Clone> AnimationSequencer<T> {
    #[must_use]
    pub const fn new(speed_ratio: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            active: None,
            playback: Playback::Idle,
            speed_ratio,
            finished_at: None,
        }
    }

    /// Replace any pending work with `steps`, the first starting at `start_ms`.
    pub fn load(&mut self, steps: impl IntoIterator<Item = Step<T>>, start_ms: f64) {
        self.queue = steps.into_iter().collect();
        self.active = None;
        self.finished_at = None;
        self.playback = Playback::Running;
        self.activate_next(start_ms);
    }

    /// Report progress and completions up to `now_ms`.
    ///
    /// Steps that finished between ticks complete in order, and each following
    /// step starts at its predecessor's scheduled end rather than at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> Vec<StepSignal<T>> {
        let mut signals = Vec::new();
        if self.playback != Playback::Running {
            return signals;
        }

        while let Some(active) = self.active.as_mut() {
            let ratio = active.ratio_at(now_ms);
            if active.last_ratio.is_none_or(|last| ratio > last) {
                active.last_ratio = Some(ratio);
                signals.push(StepSignal::Progress {
                    step: active.label.clone(),
                    ratio,
                });
            }
            if ratio < 1.0 {
                break;
            }
            let ended_at = active.started_at + active.duration;
            let label = active.label.clone();
            signals.push(StepSignal::Completed { step: label });
            self.activate_next(ended_at);
        }
        signals
    }

    /// Freeze the in-flight step at its current fraction.
    pub fn pause(&mut self, now_ms: f64) -> bool {
        if self.playback != Playback::Running {
            return false;
        }
        let Some(active) = self.active.as_ref() else {
            return false;
        };
        self.playback = Playback::Paused {
            ratio: active.ratio_at(now_ms),
        };
        true
    }

    /// Continue from the frozen fraction, shifting the step's start time so the
    /// remaining duration is unchanged by the length of the pause.
    pub fn resume(&mut self, now_ms: f64) -> bool {
        let Playback::Paused { ratio } = self.playback else {
            return false;
        };
        if let Some(active) = self.active.as_mut() {
            active.started_at = now_ms - ratio * active.duration;
        }
        self.playback = Playback::Running;
        true
    }

    /// Cancel the rest of the sequence.
    ///
    /// With `jump_to_end`, the in-flight and queued steps first report
    /// progress 1.0 and completion, in order.
    pub fn stop(&mut self, jump_to_end: bool) -> Vec<StepSignal<T>> {
        let mut signals = Vec::new();
        let active = self.active.take();
        let queued = std::mem::take(&mut self.queue);
        self.playback = Playback::Idle;
        self.finished_at = None;

        if jump_to_end {
            if let Some(active) = active {
                if active.last_ratio.is_none_or(|last| last < 1.0) {
                    signals.push(StepSignal::Progress {
                        step: active.label.clone(),
                        ratio: 1.0,
                    });
                }
                signals.push(StepSignal::Completed { step: active.label });
            }
            for step in queued {
                signals.push(StepSignal::Progress {
                    step: step.label.clone(),
                    ratio: 1.0,
                });
                signals.push(StepSignal::Completed { step: step.label });
            }
        }
        signals
    }

    /// Scale durations of steps that activate from now on.
    pub fn set_speed_ratio(&mut self, ratio: f64) -> bool {
        if !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }
        self.speed_ratio = ratio;
        true
    }

    #[must_use]
    pub const fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.playback == Playback::Idle
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self.playback, Playback::Paused { .. })
    }

    #[must_use]
    pub fn active_step(&self) -> Option<&T> {
        self.active.as_ref().map(|active| &active.label)
    }

    /// Scheduled end of the last completed sequence, if it ran to completion.
    #[must_use]
    pub const fn finished_at(&self) -> Option<f64> {
        self.finished_at
    }

    fn activate_next(&mut self, start_ms: f64) {
        match self.queue.pop_front() {
            Some(step) => {
                self.active = Some(ActiveStep {
                    label: step.label,
                    started_at: start_ms,
                    duration: (step.duration_ms * self.speed_ratio).max(0.0),
                    last_ratio: None,
                });
            }
            None => {
                self.active = None;
                self.playback = Playback::Idle;
                self.finished_at = Some(start_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(signals: &[StepSignal<&'static str>]) -> Vec<(&'static str, f64)> {
        signals
            .iter()
            .filter_map(|signal| match signal {
                StepSignal::Progress { step, ratio } => Some((*step, *ratio)),
                StepSignal::Completed { .. } => None,
            })
            .collect()
    }

    fn completed(signals: &[StepSignal<&'static str>]) -> Vec<&'static str> {
        signals
            .iter()
            .filter_map(|signal| match signal {
                StepSignal::Completed { step } => Some(*step),
                StepSignal::Progress { .. } => None,
            })
            .collect()
    }

    #[test]
    fn steps_run_in_order_and_carry_overshoot() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::new("a", 100.0), Step::new("b", 100.0)], 0.0);

        let first = seq.advance(50.0);
        assert_eq!(ratios(&first), vec![("a", 0.5)]);

        let second = seq.advance(150.0);
        assert_eq!(completed(&second), vec!["a"]);
        assert_eq!(ratios(&second), vec![("a", 1.0), ("b", 0.5)]);

        let last = seq.advance(200.0);
        assert_eq!(completed(&last), vec!["b"]);
        assert!(seq.is_idle());
        assert_eq!(seq.finished_at(), Some(200.0));
    }

    #[test]
    fn pause_preserves_fraction_across_any_gap() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::new("a", 100.0)], 0.0);
        seq.advance(40.0);
        assert!(seq.pause(40.0));
        assert!(!seq.pause(41.0));
        assert!(seq.advance(5_000.0).is_empty());

        assert!(seq.resume(10_000.0));
        assert!(!seq.resume(10_000.0));
        let signals = seq.advance(10_030.0);
        assert_eq!(ratios(&signals), vec![("a", 0.7)]);
        let signals = seq.advance(10_060.0);
        assert_eq!(completed(&signals), vec!["a"]);
        assert_eq!(seq.finished_at(), Some(10_060.0));
    }

    #[test]
    fn speed_ratio_only_scales_future_steps() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::new("a", 100.0), Step::new("b", 100.0)], 0.0);
        seq.advance(10.0);
        assert!(seq.set_speed_ratio(0.5));
        assert!(!seq.set_speed_ratio(f64::NAN));
        assert!(!seq.set_speed_ratio(0.0));

        let signals = seq.advance(100.0);
        assert_eq!(completed(&signals), vec!["a"]);
        let signals = seq.advance(150.0);
        assert_eq!(completed(&signals), vec!["b"]);
    }

    #[test]
    fn stop_without_jump_cancels_silently() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::new("a", 100.0), Step::new("b", 100.0)], 0.0);
        seq.advance(10.0);
        assert!(seq.stop(false).is_empty());
        assert!(seq.is_idle());
        assert!(seq.advance(500.0).is_empty());
        assert_eq!(seq.finished_at(), None);
    }

    #[test]
    fn stop_with_jump_fires_remaining_callbacks_at_full_ratio() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::new("a", 100.0), Step::new("b", 100.0)], 0.0);
        seq.advance(10.0);
        let signals = seq.stop(true);
        assert_eq!(ratios(&signals), vec![("a", 1.0), ("b", 1.0)]);
        assert_eq!(completed(&signals), vec!["a", "b"]);
    }

    #[test]
    fn instant_steps_complete_on_next_tick() {
        let mut seq = AnimationSequencer::new(1.0);
        seq.load([Step::instant("commit"), Step::new("rest", 10.0)], 0.0);
        let signals = seq.advance(0.0);
        assert_eq!(completed(&signals), vec!["commit"]);
        assert_eq!(seq.active_step(), Some(&"rest"));
    }
}
