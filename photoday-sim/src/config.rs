//! Start-up configuration supplied by the host page.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_MAX_DAYS, DEFAULT_SPEED_RATIO, GLUCOSE_USED_PER_DAY, MAX_SPEED_RATIO,
};
use crate::feedback::{FeedbackPolicy, FeedbackPolicyId, FeedbackThresholds};
use crate::light::{LightMode, LightState};

/// Session configuration, fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub light_mode: LightMode,
    #[serde(default)]
    pub initial_light: LightState,
    #[serde(default = "SimConfig::default_max_days")]
    pub max_days: u32,
    #[serde(default = "SimConfig::default_speed_ratio")]
    pub speed_ratio: f64,
    /// Glucose already stored when a trial begins.
    #[serde(default)]
    pub initial_stored_glucose: i32,
    #[serde(default = "SimConfig::default_show_chart")]
    pub show_chart: bool,
    #[serde(default)]
    pub feedback_policy: FeedbackPolicyId,
    /// Overrides for the policy's built-in thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_thresholds: Option<FeedbackThresholds>,
}

impl SimConfig {
    const fn default_max_days() -> u32 {
        DEFAULT_MAX_DAYS
    }

    const fn default_speed_ratio() -> f64 {
        DEFAULT_SPEED_RATIO
    }

    const fn default_show_chart() -> bool {
        true
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and the matching
    /// validation error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=365).contains(&self.max_days) {
            return Err(ConfigError::RangeViolation {
                field: "max_days",
                min: 1.0,
                max: 365.0,
                value: f64::from(self.max_days),
            });
        }
        if !self.speed_ratio.is_finite()
            || self.speed_ratio <= 0.0
            || self.speed_ratio > MAX_SPEED_RATIO
        {
            return Err(ConfigError::RangeViolation {
                field: "speed_ratio",
                min: 0.0,
                max: MAX_SPEED_RATIO,
                value: self.speed_ratio,
            });
        }
        if self.initial_stored_glucose < 0 {
            return Err(ConfigError::MinViolation {
                field: "initial_stored_glucose",
                min: 0.0,
                value: f64::from(self.initial_stored_glucose),
            });
        }
        if self.initial_stored_glucose % GLUCOSE_USED_PER_DAY != 0 {
            return Err(ConfigError::PartialDayStored {
                value: self.initial_stored_glucose,
                per_day: GLUCOSE_USED_PER_DAY,
            });
        }
        if self.initial_light == LightState::Half && self.light_mode == LightMode::TwoWay {
            return Err(ConfigError::HalfLightUnavailable);
        }
        if let Some(thresholds) = &self.feedback_thresholds {
            thresholds.validate()?;
        }
        Ok(())
    }

    /// Resolve the configured policy identifier into a full policy.
    #[must_use]
    pub fn feedback_policy(&self) -> FeedbackPolicy {
        let policy = FeedbackPolicy::from_id(self.feedback_policy, self.max_days);
        match &self.feedback_thresholds {
            Some(thresholds) => policy.with_thresholds(thresholds.clone()),
            None => policy,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            light_mode: LightMode::default(),
            initial_light: LightState::default(),
            max_days: Self::default_max_days(),
            speed_ratio: Self::default_speed_ratio(),
            initial_stored_glucose: 0,
            show_chart: Self::default_show_chart(),
            feedback_policy: FeedbackPolicyId::default(),
            feedback_thresholds: None,
        }
    }
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("initial_stored_glucose must be a multiple of {per_day} (got {value})")]
    PartialDayStored { value: i32, per_day: i32 },
    #[error("half light requires the three-way light mode")]
    HalfLightUnavailable,
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = SimConfig::from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.max_days, 21);
        assert!(config.show_chart);
        assert_eq!(config.feedback_policy(), FeedbackPolicy::None);
    }

    #[test]
    fn parses_host_start_up_options() {
        let config = SimConfig::from_json(
            r#"{ "light_mode": "three_way", "feedback_policy": "aggregate", "show_chart": false }"#,
        )
        .unwrap();
        assert_eq!(config.light_mode, LightMode::ThreeWay);
        assert!(!config.show_chart);
        assert!(matches!(config.feedback_policy(), FeedbackPolicy::Aggregate(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = SimConfig {
            speed_ratio: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeViolation { field: "speed_ratio", .. })
        ));

        let config = SimConfig {
            initial_light: LightState::Half,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HalfLightUnavailable)
        ));

        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn threshold_overrides_replace_policy_defaults() {
        let config = SimConfig::from_json(
            r#"{ "feedback_policy": "aggregate",
                 "feedback_thresholds": { "min_trials": 1, "min_trial_interval": 1 } }"#,
        )
        .unwrap();
        let FeedbackPolicy::Aggregate(policy) = config.feedback_policy() else {
            panic!("expected aggregate policy");
        };
        assert_eq!(policy.thresholds.min_trials, 1);
        assert_eq!(policy.thresholds.min_trial_interval, 1);
    }
}
