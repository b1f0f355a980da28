//! Level and session configuration
//!
//! The outer game builds these at session start and hands them in whole;
//! ambient registry state (selected vehicle, assists, volume) never leaks
//! into the core. Every field carries a serde default so a malformed or
//! partial config blob degrades to documented defaults instead of failing
//! the session.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What ends the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Reach a target forward distance
    #[default]
    Distance,
    /// Survive until the time limit expires
    Survival,
    /// No terminal goal; the track extends forever
    Endless,
}

fn default_target() -> f32 {
    5000.0
}

/// Race goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default)]
    pub kind: GoalKind,
    /// Target forward distance (distance goals)
    #[serde(default = "default_target")]
    pub target: f32,
    /// Time limit in seconds. Required for survival goals (defaults to 60s
    /// there); optional deadline for distance goals; ignored in endless mode.
    #[serde(default)]
    pub time_limit: Option<f32>,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            kind: GoalKind::Distance,
            target: default_target(),
            time_limit: None,
        }
    }
}

impl GoalConfig {
    /// Fallback limit when a survival goal arrives without one
    pub const DEFAULT_SURVIVAL_LIMIT: f32 = 60.0;

    /// Effective time limit, applying the survival fallback
    pub fn effective_time_limit(&self) -> Option<f32> {
        match self.kind {
            GoalKind::Survival => Some(self.time_limit.unwrap_or(Self::DEFAULT_SURVIVAL_LIMIT)),
            GoalKind::Distance => self.time_limit,
            GoalKind::Endless => None,
        }
    }
}

fn default_track_width() -> f32 {
    TRACK_WIDTH
}

fn default_obstacle_density() -> f32 {
    1.5
}

fn default_powerup_density() -> f32 {
    0.25
}

fn default_checkpoint_every() -> u32 {
    8
}

fn default_max_rotation() -> f32 {
    0.6
}

/// Track layout parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Full track width; lane offsets span ±width/2
    #[serde(default = "default_track_width")]
    pub width: f32,
    /// Expected obstacles per segment
    #[serde(default = "default_obstacle_density")]
    pub obstacle_density: f32,
    /// Expected powerups per segment
    #[serde(default = "default_powerup_density")]
    pub powerup_density: f32,
    /// A checkpoint every N segments (0 disables checkpoints)
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: u32,
    /// Largest gravity-shift angle a segment may carry (radians)
    #[serde(default = "default_max_rotation")]
    pub max_rotation: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            width: default_track_width(),
            obstacle_density: default_obstacle_density(),
            powerup_density: default_powerup_density(),
            checkpoint_every: default_checkpoint_every(),
            max_rotation: default_max_rotation(),
        }
    }
}

/// A level as handed in by the mission/scene layer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LevelConfig {
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub track: TrackConfig,
    /// Cosmetic theme identifier, passed through to the presentation layer
    #[serde(default)]
    pub theme: String,
}

fn default_max_speed() -> f32 {
    MAX_SPEED
}

fn default_acceleration() -> f32 {
    ACCELERATION
}

fn default_brake_force() -> f32 {
    BRAKE_FORCE
}

fn default_steer_speed() -> f32 {
    STEER_SPEED
}

fn default_grip() -> f32 {
    GRIP_FACTOR
}

fn default_drift_grip() -> f32 {
    DRIFT_GRIP_FACTOR
}

fn default_nitro_max() -> f32 {
    NITRO_MAX
}

fn default_boost_multiplier() -> f32 {
    BOOST_MULTIPLIER
}

/// Per-vehicle tuning profile (the shop's vehicle stats resolve to one of these)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTuning {
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    #[serde(default = "default_brake_force")]
    pub brake_force: f32,
    #[serde(default = "default_steer_speed")]
    pub steer_speed: f32,
    #[serde(default = "default_grip")]
    pub grip: f32,
    #[serde(default = "default_drift_grip")]
    pub drift_grip: f32,
    #[serde(default = "default_nitro_max")]
    pub nitro_max: f32,
    #[serde(default = "default_boost_multiplier")]
    pub boost_multiplier: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            brake_force: BRAKE_FORCE,
            steer_speed: STEER_SPEED,
            grip: GRIP_FACTOR,
            drift_grip: DRIFT_GRIP_FACTOR,
            nitro_max: NITRO_MAX,
            boost_multiplier: BOOST_MULTIPLIER,
        }
    }
}

impl VehicleTuning {
    /// Hard ceiling on forward speed for this tuning
    #[inline]
    pub fn speed_cap(&self) -> f32 {
        self.max_speed * self.boost_multiplier
    }
}

/// Everything a race session needs at start
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default)]
    pub tuning: VehicleTuning,
}

impl SessionConfig {
    /// Parse a config blob, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Malformed session config ({err}), using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let config = SessionConfig::from_json("{not json");
        assert_eq!(config.level.goal.kind, GoalKind::Distance);
        assert_eq!(config.level.goal.target, 5000.0);
        assert_eq!(config.level.track.width, TRACK_WIDTH);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config =
            SessionConfig::from_json(r#"{"level":{"goal":{"kind":"endless"}}}"#);
        assert_eq!(config.level.goal.kind, GoalKind::Endless);
        assert_eq!(config.level.goal.target, 5000.0);
        assert_eq!(config.tuning.max_speed, MAX_SPEED);
    }

    #[test]
    fn test_survival_goal_gets_fallback_limit() {
        let goal = GoalConfig {
            kind: GoalKind::Survival,
            time_limit: None,
            ..Default::default()
        };
        assert_eq!(
            goal.effective_time_limit(),
            Some(GoalConfig::DEFAULT_SURVIVAL_LIMIT)
        );
    }

    #[test]
    fn test_endless_ignores_time_limit() {
        let goal = GoalConfig {
            kind: GoalKind::Endless,
            time_limit: Some(30.0),
            ..Default::default()
        };
        assert_eq!(goal.effective_time_limit(), None);
    }
}
