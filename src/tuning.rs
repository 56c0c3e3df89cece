//! Data-driven game balance
//!
//! Defaults reproduce the shipped feel. A JSON document may override any subset
//! of fields (missing fields keep their default).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to read a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Gameplay balance knobs. Durations are in simulation ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Added to speed every tick until `max_speed`
    pub speed_increment: f32,
    /// Speed gain between "speed up" sound cues
    pub speed_milestone_step: f32,

    // === Spawning ===
    /// Spawn interval at `initial_speed`
    pub spawn_rate_initial: f32,
    /// Spawn interval floor
    pub min_spawn_rate: f32,
    /// Interval shrink per unit of speed gained
    pub spawn_rate_slope: f32,
    /// A roll above this spawns a collectible
    pub collectible_threshold: f32,
    /// Minimum depth gap between a new spawn and anything in its lane
    pub min_spawn_gap: f32,

    // === Scoring ===
    pub max_lives: u8,
    /// Consecutive pickups per multiplier step
    pub items_per_combo: u32,
    pub max_multiplier: u32,

    // === Power modes ===
    /// Charges granted by the jump collectible
    pub jump_charges: u32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub bonus_min_ticks: f32,
    pub bonus_extra_ticks: f32,

    // === Weather ===
    pub clear_min_ticks: f32,
    pub clear_extra_ticks: f32,
    pub storm_min_ticks: f32,
    pub storm_extra_ticks: f32,
    /// Per-tick chance of a lightning strike once the cooldown has elapsed
    pub lightning_chance: f32,
    pub lightning_cooldown_min: f32,
    pub lightning_cooldown_extra: f32,

    // === Cash particles ===
    pub cash_base_chance: f32,
    pub cash_max_chance: f32,
    /// Score at which the chance has grown by `cash_score_gain`
    pub cash_score_scale: f32,
    pub cash_score_gain: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: 16.0,
            max_speed: 45.0,
            speed_increment: 0.01,
            speed_milestone_step: 5.0,

            spawn_rate_initial: 50.0,
            min_spawn_rate: 18.0,
            spawn_rate_slope: 1.5,
            collectible_threshold: 0.55,
            min_spawn_gap: 400.0,

            max_lives: 3,
            items_per_combo: 5,
            max_multiplier: 10,

            jump_charges: 3,
            jump_velocity: 25.0,
            gravity: 1.5,
            bonus_min_ticks: 600.0,
            bonus_extra_ticks: 300.0,

            clear_min_ticks: 600.0,
            clear_extra_ticks: 1200.0,
            storm_min_ticks: 300.0,
            storm_extra_ticks: 600.0,
            lightning_chance: 0.005,
            lightning_cooldown_min: 60.0,
            lightning_cooldown_extra: 180.0,

            cash_base_chance: 0.05,
            cash_max_chance: 0.5,
            cash_score_scale: 5000.0,
            cash_score_gain: 0.4,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse an override document, keeping the defaults if it is unusable
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning override: {e}");
                Self::default()
            }
        }
    }

    /// LocalStorage key for a balance override
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "recycle_rush_tuning";

    /// Load a balance override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded tuning override from LocalStorage");
                return Self::from_json_or_default(&json);
            }
        }
        Self::default()
    }

    /// Load a balance override from a JSON file, if one is given
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded tuning override from {path}");
                Self::from_json_or_default(&json)
            }
            Err(e) => {
                log::warn!("Cannot read tuning file {path}: {e}");
                Self::default()
            }
        }
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.max_speed < self.initial_speed {
            return Err(TuningError::Invalid("max_speed below initial_speed"));
        }
        if self.speed_increment < 0.0 {
            return Err(TuningError::Invalid("speed_increment must be non-negative"));
        }
        if self.max_lives == 0 {
            return Err(TuningError::Invalid("max_lives must be at least 1"));
        }
        if self.items_per_combo == 0 {
            return Err(TuningError::Invalid("items_per_combo must be at least 1"));
        }
        if self.max_multiplier == 0 {
            return Err(TuningError::Invalid("max_multiplier must be at least 1"));
        }
        if self.min_spawn_rate < 1.0 {
            return Err(TuningError::Invalid("min_spawn_rate must be at least one tick"));
        }
        Ok(())
    }

    /// Ticks until the next spawn attempt at the given speed
    pub fn spawn_interval(&self, speed: f32) -> f32 {
        (self.spawn_rate_initial - (speed - self.initial_speed) * self.spawn_rate_slope)
            .max(self.min_spawn_rate)
    }

    /// Per-tick chance of emitting a cash bill at the given score
    pub fn cash_chance(&self, score: u64) -> f32 {
        (self.cash_base_chance + (score as f32 / self.cash_score_scale) * self.cash_score_gain)
            .min(self.cash_max_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_lives": 5, "items_per_combo": 3 }"#).unwrap();
        assert_eq!(tuning.max_lives, 5);
        assert_eq!(tuning.items_per_combo, 3);
        assert_eq!(tuning.max_speed, Tuning::default().max_speed);
    }

    #[test]
    fn test_rejects_bad_json_and_bad_values() {
        assert!(matches!(Tuning::from_json("{"), Err(TuningError::Parse(_))));
        assert!(matches!(
            Tuning::from_json(r#"{ "max_speed": 1.0 }"#),
            Err(TuningError::Invalid(_))
        ));
    }

    #[test]
    fn test_unusable_override_falls_back_to_defaults() {
        assert_eq!(Tuning::from_json_or_default("not json"), Tuning::default());
        assert_eq!(
            Tuning::from_json_or_default(r#"{ "max_lives": 0 }"#),
            Tuning::default()
        );
        assert_eq!(Tuning::from_json_or_default(r#"{ "max_lives": 4 }"#).max_lives, 4);
    }

    #[test]
    fn test_missing_tuning_file_keeps_defaults() {
        assert_eq!(Tuning::load_file(None), Tuning::default());
        assert_eq!(
            Tuning::load_file(Some("/nonexistent/recycle-rush-tuning.json")),
            Tuning::default()
        );
    }

    #[test]
    fn test_spawn_interval_shrinks_to_floor() {
        let t = Tuning::default();
        assert_eq!(t.spawn_interval(t.initial_speed), 50.0);
        assert_eq!(t.spawn_interval(t.initial_speed + 10.0), 35.0);
        assert_eq!(t.spawn_interval(t.max_speed), t.min_spawn_rate);
    }

    #[test]
    fn test_cash_chance_scales_with_score_and_caps() {
        let t = Tuning::default();
        assert!((t.cash_chance(0) - 0.05).abs() < 1e-6);
        assert!((t.cash_chance(5000) - 0.45).abs() < 1e-6);
        assert_eq!(t.cash_chance(1_000_000), 0.5);
    }
}
