//! Light switch states and the two-way/three-way switch modes.
use serde::{Deserialize, Serialize};

use crate::constants::{GLUCOSE_CREATED_FULL_LIGHT, GLUCOSE_CREATED_HALF_LIGHT};
use crate::trial::EventKind;

/// Which positions the light switch offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightMode {
    /// Off / on only.
    #[default]
    TwoWay,
    /// Off / half / on.
    ThreeWay,
}

/// Effective light reaching the plant for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    Off,
    Half,
    #[default]
    On,
}

impl LightState {
    /// Map a switch percentage onto a state available in `mode`.
    #[must_use]
    pub const fn from_percent(percent: u8, mode: LightMode) -> Option<Self> {
        match (percent, mode) {
            (0, _) => Some(Self::Off),
            (50, LightMode::ThreeWay) => Some(Self::Half),
            (100, _) => Some(Self::On),
            _ => None,
        }
    }

    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Half => 50,
            Self::On => 100,
        }
    }

    #[must_use]
    pub const fn is_lit(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Glucose units produced by photosynthesis on a day in this light.
    #[must_use]
    pub const fn glucose_yield(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::Half => GLUCOSE_CREATED_HALF_LIGHT,
            Self::On => GLUCOSE_CREATED_FULL_LIGHT,
        }
    }

    /// Interaction event recorded when the student selects this state.
    #[must_use]
    pub const fn event_kind(self) -> EventKind {
        match self {
            Self::Off => EventKind::LightOff,
            Self::Half => EventKind::LightHalf,
            Self::On => EventKind::LightOn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_light_only_exists_in_three_way_mode() {
        assert_eq!(LightState::from_percent(50, LightMode::TwoWay), None);
        assert_eq!(
            LightState::from_percent(50, LightMode::ThreeWay),
            Some(LightState::Half)
        );
        assert_eq!(
            LightState::from_percent(0, LightMode::TwoWay),
            Some(LightState::Off)
        );
        assert_eq!(LightState::from_percent(75, LightMode::ThreeWay), None);
    }

    #[test]
    fn yields_follow_intensity() {
        assert_eq!(LightState::On.glucose_yield(), 4);
        assert_eq!(LightState::Half.glucose_yield(), 2);
        assert_eq!(LightState::Off.glucose_yield(), 0);
        assert_eq!(LightState::Half.event_kind(), EventKind::LightHalf);
        assert_eq!(LightState::On.percent(), 100);
    }
}
