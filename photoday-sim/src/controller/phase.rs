use serde::{Deserialize, Serialize};

/// Why a trial reached its terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    MaxDaysReached,
    PlantDied,
}

/// Playback phase owned by the simulation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum SimulationPhase {
    #[default]
    Stopped,
    Running,
    Paused,
    /// Terminal until the next reset.
    Ended(EndReason),
}

impl SimulationPhase {
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended(_))
    }

    /// Phases in which a day cycle is in flight.
    #[must_use]
    pub const fn has_cycle_in_flight(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}
