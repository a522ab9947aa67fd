//! Render calls flattened into named, serializable messages for the host page.
use serde::Serialize;

use photoday_sim::{
    ChartSeries, EndReason, Feedback, GlucoseVisual, LeafVariant, LightState, PlotBand,
    RenderSink, SeriesPoint, SimulationPhase,
};

/// One render call as delivered to JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderMessage {
    DayText {
        day: u32,
    },
    DayColor {
        light: LightState,
    },
    Leaf {
        variant: LeafVariant,
    },
    Light {
        light: LightState,
        percent: u8,
    },
    Energy {
        percent: f64,
    },
    Series {
        series: ChartSeries,
        index: usize,
        points: Vec<SeriesPoint>,
    },
    PlotBand {
        band: PlotBand,
    },
    ClearPlotBands,
    SimulationEnded,
    PlantDied,
    Glucose {
        visual: GlucoseVisual,
    },
    Feedback {
        feedback: Feedback,
    },
}

impl RenderMessage {
    /// Callback name the host page dispatches on.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DayText { .. } => "updateDayText",
            Self::DayColor { .. } => "updateDayColor",
            Self::Leaf { .. } => "showLeaf",
            Self::Light { .. } => "turnLightVisual",
            Self::Energy { .. } => "updateEnergyDisplay",
            Self::Series { .. } => "setSeriesData",
            Self::PlotBand { .. } => "addPlotBand",
            Self::ClearPlotBands => "clearPlotBands",
            Self::SimulationEnded => "showSimulationEnded",
            Self::PlantDied => "showPlantDied",
            Self::Glucose { .. } => "updateGlucoseVisual",
            Self::Feedback { .. } => "showFeedback",
        }
    }
}

/// [`RenderSink`] that hands every call to `emit` as a [`RenderMessage`].
pub struct MessageSink<F>
where
    F: FnMut(RenderMessage),
{
    emit: F,
}

impl<F> MessageSink<F>
where
    F: FnMut(RenderMessage),
{
    pub const fn new(emit: F) -> Self {
        Self { emit }
    }
}

impl<F> RenderSink for MessageSink<F>
where
    F: FnMut(RenderMessage),
{
    fn update_day_text(&mut self, day: u32) {
        (self.emit)(RenderMessage::DayText { day });
    }

    fn update_day_color(&mut self, light: LightState) {
        (self.emit)(RenderMessage::DayColor { light });
    }

    fn show_leaf(&mut self, variant: LeafVariant) {
        (self.emit)(RenderMessage::Leaf { variant });
    }

    fn turn_light_visual(&mut self, light: LightState) {
        (self.emit)(RenderMessage::Light {
            light,
            percent: light.percent(),
        });
    }

    fn update_energy_display(&mut self, percent: f64) {
        (self.emit)(RenderMessage::Energy { percent });
    }

    fn set_series_data(&mut self, series: ChartSeries, points: &[SeriesPoint]) {
        (self.emit)(RenderMessage::Series {
            series,
            index: series.index(),
            points: points.to_vec(),
        });
    }

    fn add_plot_band(&mut self, band: PlotBand) {
        (self.emit)(RenderMessage::PlotBand { band });
    }

    fn show_simulation_ended(&mut self) {
        (self.emit)(RenderMessage::SimulationEnded);
    }

    fn show_plant_died(&mut self) {
        (self.emit)(RenderMessage::PlantDied);
    }

    fn update_glucose_visual(&mut self, visual: GlucoseVisual) {
        (self.emit)(RenderMessage::Glucose { visual });
    }

    fn clear_plot_bands(&mut self) {
        (self.emit)(RenderMessage::ClearPlotBands);
    }

    fn show_feedback(&mut self, feedback: &Feedback) {
        (self.emit)(RenderMessage::Feedback {
            feedback: feedback.clone(),
        });
    }
}

/// Short phase label exposed to the host page.
#[must_use]
pub const fn phase_label(phase: SimulationPhase) -> &'static str {
    match phase {
        SimulationPhase::Stopped => "stopped",
        SimulationPhase::Running => "running",
        SimulationPhase::Paused => "paused",
        SimulationPhase::Ended(EndReason::MaxDaysReached) => "ended",
        SimulationPhase::Ended(EndReason::PlantDied) => "died",
    }
}
