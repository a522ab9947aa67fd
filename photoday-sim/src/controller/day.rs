//! Step plans for the three kinds of simulated day.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    ABSORPTION_MS, CONSUME_STORED_MS, DECAY_TOTAL_MS, DECAY_WINDOWS, ENERGY_AFTER_ABSORPTION,
    ENERGY_AFTER_FIRST_MIGRATION, ENERGY_AFTER_PRODUCTION, ENERGY_AFTER_SECOND_MIGRATION,
    ENERGY_AFTER_TRAVEL, ENERGY_MAX, ENERGY_MIN, EXHAUSTION_MS, GLUCOSE_USED_PER_DAY,
    GROW_STORED_MS, MIGRATION_MS, PHOTON_TRAVEL_MS, PRODUCTION_MS, REFILL_MS,
    RELEASE_STORED_MS, REST_BETWEEN_DAYS_MS, STORE_SURPLUS_MS,
};
use crate::light::LightState;
use crate::sequencer::Step;

/// One animated stage of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStep {
    PhotonTravel,
    Absorption,
    /// Energy migrating through the leaf; 1 then 2.
    Migration(u8),
    Production,
    Refill,
    StoreSurplus,
    GrowStored,
    ConsumeStored,
    ReleaseStored,
    Exhaustion,
    /// Leaf discoloring window; 1 through 3.
    Decay(u8),
    /// Writes the day to the ledger.
    Commit,
    /// Pause before the next day.
    Rest,
}

impl DayStep {
    /// Energy bounds interpolated while this step runs.
    #[must_use]
    pub const fn energy_band(self) -> Option<(f64, f64)> {
        match self {
            Self::PhotonTravel | Self::GrowStored => Some((ENERGY_MAX, ENERGY_AFTER_TRAVEL)),
            Self::Absorption | Self::ConsumeStored => {
                Some((ENERGY_AFTER_TRAVEL, ENERGY_AFTER_ABSORPTION))
            }
            Self::Migration(1) => Some((ENERGY_AFTER_ABSORPTION, ENERGY_AFTER_FIRST_MIGRATION)),
            Self::Migration(_) => Some((
                ENERGY_AFTER_FIRST_MIGRATION,
                ENERGY_AFTER_SECOND_MIGRATION,
            )),
            Self::Production => Some((ENERGY_AFTER_SECOND_MIGRATION, ENERGY_AFTER_PRODUCTION)),
            Self::ReleaseStored => Some((ENERGY_AFTER_ABSORPTION, ENERGY_AFTER_PRODUCTION)),
            Self::Refill => Some((ENERGY_AFTER_PRODUCTION, ENERGY_MAX)),
            Self::Exhaustion => Some((ENERGY_MAX, ENERGY_MIN)),
            Self::StoreSurplus | Self::Decay(_) | Self::Commit | Self::Rest => None,
        }
    }

    /// Duration at speed ratio 1.0.
    #[must_use]
    pub fn base_duration_ms(self) -> f64 {
        match self {
            Self::PhotonTravel => PHOTON_TRAVEL_MS,
            Self::Absorption => ABSORPTION_MS,
            Self::Migration(_) => MIGRATION_MS,
            Self::Production => PRODUCTION_MS,
            Self::Refill => REFILL_MS,
            Self::StoreSurplus => STORE_SURPLUS_MS,
            Self::GrowStored => GROW_STORED_MS,
            Self::ConsumeStored => CONSUME_STORED_MS,
            Self::ReleaseStored => RELEASE_STORED_MS,
            Self::Exhaustion => EXHAUSTION_MS,
            Self::Decay(_) => DECAY_TOTAL_MS / f64::from(DECAY_WINDOWS),
            Self::Commit => 0.0,
            Self::Rest => REST_BETWEEN_DAYS_MS,
        }
    }

    fn step(self) -> Step<Self> {
        Step::new(self, self.base_duration_ms())
    }
}

/// Which mutually exclusive sequence a day runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Light reaches the plant; glucose is created and burned.
    Photosynthesis,
    /// Dark day paid for from storage.
    StoredRespiration,
    /// Dark day with nothing stored; the plant dies.
    Starvation,
}

impl DayKind {
    #[must_use]
    pub const fn resolve(light: LightState, can_cover_respiration: bool) -> Self {
        if light.is_lit() {
            Self::Photosynthesis
        } else if can_cover_respiration {
            Self::StoredRespiration
        } else {
            Self::Starvation
        }
    }

    /// `(created, used)` flags written to the ledger on commit.
    #[must_use]
    pub const fn ledger_flags(self) -> (bool, bool) {
        match self {
            Self::Photosynthesis => (true, true),
            Self::StoredRespiration => (false, true),
            Self::Starvation => (false, false),
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Starvation)
    }
}

pub type DaySteps = SmallVec<[Step<DayStep>; 10]>;

/// Resolved day: its kind and the ordered steps to animate.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub kind: DayKind,
    pub light: LightState,
    pub steps: DaySteps,
}

impl DayPlan {
    #[must_use]
    pub fn build(light: LightState, can_cover_respiration: bool) -> Self {
        let kind = DayKind::resolve(light, can_cover_respiration);
        let mut steps = DaySteps::new();
        match kind {
            DayKind::Photosynthesis => {
                steps.extend(
                    [
                        DayStep::PhotonTravel,
                        DayStep::Absorption,
                        DayStep::Migration(1),
                        DayStep::Migration(2),
                        DayStep::Production,
                        DayStep::Refill,
                    ]
                    .map(DayStep::step),
                );
                if surplus_units(light) > 0 {
                    steps.push(DayStep::StoreSurplus.step());
                }
            }
            DayKind::StoredRespiration => {
                steps.extend(
                    [
                        DayStep::GrowStored,
                        DayStep::ConsumeStored,
                        DayStep::ReleaseStored,
                        DayStep::Refill,
                    ]
                    .map(DayStep::step),
                );
            }
            DayKind::Starvation => {
                steps.push(DayStep::Exhaustion.step());
                steps.extend((1..=DECAY_WINDOWS).map(|window| DayStep::Decay(window).step()));
            }
        }
        steps.push(Step::instant(DayStep::Commit));
        if !kind.is_terminal() {
            steps.push(DayStep::Rest.step());
        }
        Self { kind, light, steps }
    }

    #[must_use]
    pub fn labels(&self) -> Vec<DayStep> {
        self.steps.iter().map(|step| step.label).collect()
    }
}

/// Glucose left over after respiration on a lit day.
#[must_use]
pub const fn surplus_units(light: LightState) -> i32 {
    let surplus = light.glucose_yield() - GLUCOSE_USED_PER_DAY;
    if surplus > 0 { surplus } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_light_day_stores_surplus() {
        let plan = DayPlan::build(LightState::On, false);
        assert_eq!(plan.kind, DayKind::Photosynthesis);
        assert_eq!(
            plan.labels(),
            vec![
                DayStep::PhotonTravel,
                DayStep::Absorption,
                DayStep::Migration(1),
                DayStep::Migration(2),
                DayStep::Production,
                DayStep::Refill,
                DayStep::StoreSurplus,
                DayStep::Commit,
                DayStep::Rest,
            ]
        );
    }

    #[test]
    fn half_light_day_has_no_surplus() {
        let plan = DayPlan::build(LightState::Half, false);
        assert!(!plan.labels().contains(&DayStep::StoreSurplus));
        assert_eq!(surplus_units(LightState::Half), 0);
    }

    #[test]
    fn dark_days_depend_on_storage() {
        let fed = DayPlan::build(LightState::Off, true);
        assert_eq!(fed.kind, DayKind::StoredRespiration);
        assert_eq!(fed.labels().last(), Some(&DayStep::Rest));

        let starved = DayPlan::build(LightState::Off, false);
        assert_eq!(starved.kind, DayKind::Starvation);
        assert_eq!(
            starved.labels(),
            vec![
                DayStep::Exhaustion,
                DayStep::Decay(1),
                DayStep::Decay(2),
                DayStep::Decay(3),
                DayStep::Commit,
            ]
        );
    }

    #[test]
    fn energy_bands_chain_and_stay_in_range() {
        for light in [LightState::On, LightState::Off] {
            for stored in [true, false] {
                let plan = DayPlan::build(light, stored);
                let bands: Vec<_> = plan
                    .steps
                    .iter()
                    .filter_map(|step| step.label.energy_band())
                    .collect();
                assert_eq!(bands.first().map(|band| band.0), Some(ENERGY_MAX));
                for pair in bands.windows(2) {
                    assert!((pair[0].1 - pair[1].0).abs() < f64::EPSILON);
                }
                for (from, to) in bands {
                    assert!((ENERGY_MIN..=ENERGY_MAX).contains(&from));
                    assert!((ENERGY_MIN..=ENERGY_MAX).contains(&to));
                }
            }
        }
    }

    #[test]
    fn decay_windows_split_evenly() {
        let total: f64 = (1..=DECAY_WINDOWS)
            .map(|window| DayStep::Decay(window).base_duration_ms())
            .sum();
        assert!((total - DECAY_TOTAL_MS).abs() < 1e-9);
    }
}
