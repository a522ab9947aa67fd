//! One-way render calls from the simulation core to the view layer.
use serde::{Deserialize, Serialize};

use crate::feedback::Feedback;
use crate::light::LightState;
use crate::trial::SeriesPoint;

/// Leaf artwork shown by the leaf widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafVariant {
    Healthy,
    Yellowing,
    Browning,
    Dead,
}

impl LeafVariant {
    /// Variant shown at the end of decay window `window` (1-based).
    #[must_use]
    pub const fn for_decay_window(window: u8) -> Self {
        match window {
            0 => Self::Healthy,
            1 => Self::Yellowing,
            2 => Self::Browning,
            _ => Self::Dead,
        }
    }
}

/// Chart series index, in the order the chart declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSeries {
    Created = 0,
    Used = 1,
    Stored = 2,
}

impl ChartSeries {
    pub const ALL: [Self; 3] = [Self::Created, Self::Used, Self::Stored];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Shaded x-range on the chart marking a dim or dark day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotBand {
    pub from: f64,
    pub to: f64,
    pub color: &'static str,
}

/// What the glucose units in the leaf are doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseStage {
    Produced,
    Storing,
    Growing,
    Consuming,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseVisual {
    pub stage: GlucoseStage,
    pub units: i32,
    /// Visual scale of the moving units, 0.0–1.0.
    pub scale: f64,
}

/// View collaborator driven by the controller. Calls are never read back.
pub trait RenderSink {
    fn update_day_text(&mut self, day: u32);

    fn update_day_color(&mut self, light: LightState);

    fn show_leaf(&mut self, variant: LeafVariant);

    fn turn_light_visual(&mut self, light: LightState);

    fn update_energy_display(&mut self, percent: f64);

    fn set_series_data(&mut self, series: ChartSeries, points: &[SeriesPoint]);

    fn add_plot_band(&mut self, band: PlotBand);

    fn show_simulation_ended(&mut self);

    fn show_plant_died(&mut self);

    fn update_glucose_visual(&mut self, _visual: GlucoseVisual) {}

    /// Remove every plot band; called when a new trial starts.
    fn clear_plot_bands(&mut self) {}

    fn show_feedback(&mut self, _feedback: &Feedback) {}
}

/// Sink that discards every call, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn update_day_text(&mut self, _day: u32) {}
    fn update_day_color(&mut self, _light: LightState) {}
    fn show_leaf(&mut self, _variant: LeafVariant) {}
    fn turn_light_visual(&mut self, _light: LightState) {}
    fn update_energy_display(&mut self, _percent: f64) {}
    fn set_series_data(&mut self, _series: ChartSeries, _points: &[SeriesPoint]) {}
    fn add_plot_band(&mut self, _band: PlotBand) {}
    fn show_simulation_ended(&mut self) {}
    fn show_plant_died(&mut self) {}
}

/// A render call captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    DayText(u32),
    DayColor(LightState),
    Leaf(LeafVariant),
    LightVisual(LightState),
    Energy(f64),
    Series(ChartSeries, Vec<SeriesPoint>),
    PlotBand(PlotBand),
    ClearPlotBands,
    SimulationEnded,
    PlantDied,
    Glucose(GlucoseVisual),
    Feedback(Feedback),
}

/// Sink that keeps every call, used by tests and the headless tester.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<RenderCall>,
}

impl RecordingSink {
    #[must_use]
    pub fn energy_readings(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Energy(percent) => Some(*percent),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<LeafVariant> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Leaf(variant) => Some(*variant),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn feedback(&self) -> Vec<&Feedback> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Feedback(feedback) => Some(feedback),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl RenderSink for RecordingSink {
    fn update_day_text(&mut self, day: u32) {
        self.calls.push(RenderCall::DayText(day));
    }

    fn update_day_color(&mut self, light: LightState) {
        self.calls.push(RenderCall::DayColor(light));
    }

    fn show_leaf(&mut self, variant: LeafVariant) {
        self.calls.push(RenderCall::Leaf(variant));
    }

    fn turn_light_visual(&mut self, light: LightState) {
        self.calls.push(RenderCall::LightVisual(light));
    }

    fn update_energy_display(&mut self, percent: f64) {
        self.calls.push(RenderCall::Energy(percent));
    }

    fn set_series_data(&mut self, series: ChartSeries, points: &[SeriesPoint]) {
        self.calls.push(RenderCall::Series(series, points.to_vec()));
    }

    fn add_plot_band(&mut self, band: PlotBand) {
        self.calls.push(RenderCall::PlotBand(band));
    }

    fn show_simulation_ended(&mut self) {
        self.calls.push(RenderCall::SimulationEnded);
    }

    fn show_plant_died(&mut self) {
        self.calls.push(RenderCall::PlantDied);
    }

    fn update_glucose_visual(&mut self, visual: GlucoseVisual) {
        self.calls.push(RenderCall::Glucose(visual));
    }

    fn clear_plot_bands(&mut self) {
        self.calls.push(RenderCall::ClearPlotBands);
    }

    fn show_feedback(&mut self, feedback: &Feedback) {
        self.calls.push(RenderCall::Feedback(feedback.clone()));
    }
}
