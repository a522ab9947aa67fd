//! Photoday Simulation Engine
//!
//! Platform-agnostic core of the Photoday photosynthesis and respiration
//! simulation. This crate owns the day-cycle state machine, energy and glucose
//! accounting, trial history, and feedback decisions without any UI or
//! platform-specific dependencies. Views plug in through [`RenderSink`] and
//! time through [`Clock`].

pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod energy;
pub mod feedback;
pub mod ledger;
pub mod light;
pub mod recorder;
pub mod render;
pub mod sequencer;
pub mod trial;

// Re-export commonly used types
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use config::{ConfigError, SimConfig};
pub use controller::{
    DayKind, DayPlan, DayStep, EndReason, SimulationController, SimulationPhase, surplus_units,
};
pub use energy::EnergyModel;
pub use feedback::{
    AggregatePolicy, DayFlag, Feedback, FeedbackEngine, FeedbackPolicy, FeedbackPolicyId,
    FeedbackReason, FeedbackTemplate, FeedbackThresholds, TemplatePolicy, TrialFacts,
};
pub use ledger::{DayTotals, GlucoseLedger};
pub use light::{LightMode, LightState};
pub use recorder::TrialRecorder;
pub use render::{
    ChartSeries, GlucoseStage, GlucoseVisual, LeafVariant, NullSink, PlotBand, RecordingSink,
    RenderCall, RenderSink,
};
pub use sequencer::{AnimationSequencer, Step, StepSignal};
pub use trial::{Event, EventKind, SeriesPoint, Trial, TrialStore};

/// Build a controller over a fresh trial store.
///
/// # Errors
///
/// Returns `ConfigError` when the configuration is invalid.
pub fn new_session<R, C>(
    config: SimConfig,
    sink: R,
    clock: C,
) -> Result<(SimulationController<R, C>, TrialStore), ConfigError>
where
    R: RenderSink,
    C: Clock,
{
    let store = TrialStore::new();
    let controller = SimulationController::new(config, store.clone(), sink, clock)?;
    Ok((controller, store))
}
