use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Tunables of the homeland scheduler.
///
/// Every field falls back to its [`crate::constants`] default when missing
/// from a serialized config.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomelandConfig {
    pub flavor_dampening: f32,
    pub defensive_move_turns: u32,
    pub estimate_turns_distance: u32,
    pub max_failed_paths: u32,
    pub early_out_failed_path_distance: u32,
    pub sentry_city_radius: u32,
    pub capital_threat_weight_percent: i32,
    pub high_priority_sight: u32,
    pub max_air_damage: u32,
    pub rng_seed: u64,
}

impl Default for HomelandConfig {
    fn default() -> Self {
        Self {
            flavor_dampening: FLAVOR_DAMPENING,
            defensive_move_turns: DEFENSIVE_MOVE_TURNS,
            estimate_turns_distance: ESTIMATE_TURNS_DISTANCE,
            max_failed_paths: MAX_FAILED_PATHS,
            early_out_failed_path_distance: EARLY_OUT_FAILED_PATH_DISTANCE,
            sentry_city_radius: SENTRY_CITY_RADIUS,
            capital_threat_weight_percent: CAPITAL_THREAT_WEIGHT_PERCENT,
            high_priority_sight: HIGH_PRIORITY_SIGHT,
            max_air_damage: MAX_AIR_REPOSITION_DAMAGE,
            rng_seed: RNG_BASE_SEED,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("flavor dampening must lie in [0, 1], got {0}")]
    Dampening(f32),
    #[error("max_failed_paths must be at least 1")]
    NoFailedPathBudget,
    #[error("estimate_turns_distance must be at least 1")]
    ZeroEstimateDistance,
}

impl HomelandConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.flavor_dampening) {
            return Err(ConfigError::Dampening(self.flavor_dampening));
        }
        if self.max_failed_paths == 0 {
            return Err(ConfigError::NoFailedPathBudget);
        }
        if self.estimate_turns_distance == 0 {
            return Err(ConfigError::ZeroEstimateDistance);
        }
        Ok(())
    }

    /// Scale a flavor value by the configured dampening, truncating toward zero.
    pub fn dampen(&self, flavor: i32) -> i32 {
        (flavor as f32 * self.flavor_dampening) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(HomelandConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_failed_path_budget() {
        let config = HomelandConfig {
            max_failed_paths: 0,
            ..default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoFailedPathBudget));
    }

    #[test]
    fn rejects_out_of_range_dampening() {
        let config = HomelandConfig {
            flavor_dampening: 1.5,
            ..default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Dampening(1.5)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: HomelandConfig =
            serde_json::from_str(r#"{ "defensive_move_turns": 6 }"#).unwrap();
        assert_eq!(config.defensive_move_turns, 6);
        assert_eq!(config.estimate_turns_distance, ESTIMATE_TURNS_DISTANCE);
        assert_eq!(config.max_failed_paths, MAX_FAILED_PATHS);
    }

    #[test]
    fn dampening_truncates() {
        let config = HomelandConfig::default();
        assert_eq!(config.dampen(7), 2);
        assert_eq!(config.dampen(10), 3);
        assert_eq!(config.dampen(0), 0);
    }
}
