//! Centralized timing and balance constants for the Photoday simulation.
//!
//! These values define the deterministic day-cycle math. Host pages can tune
//! day limits and speed through `SimConfig`, never the bands or durations.

// Energy bands --------------------------------------------------------------
pub const ENERGY_MAX: f64 = 100.0;
pub const ENERGY_MIN: f64 = 0.0;
pub(crate) const ENERGY_AFTER_TRAVEL: f64 = 75.0;
pub(crate) const ENERGY_AFTER_ABSORPTION: f64 = 50.0;
pub(crate) const ENERGY_AFTER_FIRST_MIGRATION: f64 = 35.0;
pub(crate) const ENERGY_AFTER_SECOND_MIGRATION: f64 = 20.0;
pub(crate) const ENERGY_AFTER_PRODUCTION: f64 = 5.0;

// Glucose accounting --------------------------------------------------------
/// Units created on a full-light day (four-unit mode).
pub const GLUCOSE_CREATED_FULL_LIGHT: i32 = 4;
/// Units created on a half-light day.
pub const GLUCOSE_CREATED_HALF_LIGHT: i32 = 2;
/// Units burned by respiration on every living day.
pub const GLUCOSE_USED_PER_DAY: i32 = 2;

// Step durations (milliseconds at speed ratio 1.0) --------------------------
pub(crate) const PHOTON_TRAVEL_MS: f64 = 1_500.0;
pub(crate) const ABSORPTION_MS: f64 = 1_000.0;
pub(crate) const MIGRATION_MS: f64 = 800.0;
pub(crate) const PRODUCTION_MS: f64 = 1_200.0;
pub(crate) const REFILL_MS: f64 = 600.0;
pub(crate) const STORE_SURPLUS_MS: f64 = 800.0;
pub(crate) const GROW_STORED_MS: f64 = 700.0;
pub(crate) const CONSUME_STORED_MS: f64 = 900.0;
pub(crate) const RELEASE_STORED_MS: f64 = 1_200.0;
pub(crate) const EXHAUSTION_MS: f64 = 3_000.0;
/// Total leaf decay time, split into three equal discoloring windows.
pub(crate) const DECAY_TOTAL_MS: f64 = 3_000.0;
pub(crate) const DECAY_WINDOWS: u8 = 3;
/// Pause between the end of one day and the start of the next.
pub(crate) const REST_BETWEEN_DAYS_MS: f64 = 1_000.0;

// Defaults ------------------------------------------------------------------
pub(crate) const DEFAULT_MAX_DAYS: u32 = 21;
pub(crate) const DEFAULT_SPEED_RATIO: f64 = 1.0;
pub(crate) const MAX_SPEED_RATIO: f64 = 20.0;

// Feedback defaults ---------------------------------------------------------
pub(crate) const FEEDBACK_MIN_TRIALS: usize = 3;
pub(crate) const FEEDBACK_MIN_TRIAL_INTERVAL: usize = 2;
pub(crate) const FEEDBACK_SHORT_TRIAL_MS: f64 = 10_000.0;
pub(crate) const FEEDBACK_LONG_RUN_DAYS: u32 = 60;

// Chart presentation --------------------------------------------------------
pub(crate) const PLOT_BAND_LIGHT_OFF: &str = "rgba(90, 90, 90, 0.35)";
pub(crate) const PLOT_BAND_LIGHT_HALF: &str = "rgba(90, 90, 90, 0.15)";
