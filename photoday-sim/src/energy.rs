//! Plant energy gauge driven by animated drains and refills.
use serde::{Deserialize, Serialize};

use crate::constants::ENERGY_MAX;

/// Single 0–100 energy value interpolated by progress callbacks.
///
/// The model trusts its callers: bounds and ratios are not clamped, so every
/// band used by the day sequences must stay inside `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    level: f64,
}

impl EnergyModel {
    #[must_use]
    pub const fn new() -> Self {
        Self { level: ENERGY_MAX }
    }

    /// Current energy level.
    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// Interpolate between `from` and `to` by `ratio`.
    ///
    /// Works in both directions, so refills are expressed as drains with
    /// `to > from`.
    pub fn drain(&mut self, from: f64, to: f64, ratio: f64) -> f64 {
        self.level = from - (from - to) * ratio;
        self.level
    }

    pub const fn reset_full(&mut self) {
        self.level = ENERGY_MAX;
    }
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    #[test]
    fn drain_interpolates_between_bounds() {
        let mut energy = EnergyModel::new();
        assert!(close(energy.drain(100.0, 75.0, 0.0), 100.0));
        assert!(close(energy.drain(100.0, 75.0, 0.5), 87.5));
        assert!(close(energy.drain(100.0, 75.0, 1.0), 75.0));
        assert!(close(energy.level(), 75.0));
    }

    #[test]
    fn drain_with_rising_bounds_refills() {
        let mut energy = EnergyModel::new();
        energy.drain(20.0, 5.0, 1.0);
        assert!(close(energy.drain(5.0, 100.0, 0.2), 24.0));
        energy.reset_full();
        assert!(close(energy.level(), ENERGY_MAX));
    }
}
