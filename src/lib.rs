//! GRAVSHIFT core - a deterministic vehicle & track simulation
//!
//! Core modules:
//! - `sim`: deterministic simulation (integrator, track model, classifier, scoring)
//! - `config`: level/session configuration handed in by the outer game
//! - `highscores`: end-of-race leaderboard
//!
//! The crate is headless by design: rendering, input devices and persistence
//! live in the surrounding game and talk to this core through `TickInput`,
//! the per-frame event queue and `RaceStats`.

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::{GoalKind, LevelConfig, SessionConfig, VehicleTuning};
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    /// Reference fixed timestep (60 Hz); callers may pass a variable dt
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest dt integrated in a single sub-step; bigger frames are split
    /// so a hitch cannot tunnel the vehicle through an obstacle
    pub const MAX_STEP_DT: f32 = 1.0 / 30.0;
    /// Hard cap on sub-steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Vehicle defaults (units/s, units/s²)
    pub const MAX_SPEED: f32 = 240.0;
    pub const ACCELERATION: f32 = 160.0;
    pub const BRAKE_FORCE: f32 = 320.0;
    /// Lateral speed at full steer deflection
    pub const STEER_SPEED: f32 = 90.0;
    /// Exp-decay rate of lateral velocity toward the steer target (grippy)
    pub const GRIP_FACTOR: f32 = 10.0;
    /// Same rate while sliding - low value means the vehicle keeps drifting
    pub const DRIFT_GRIP_FACTOR: f32 = 2.5;
    /// Lateral slip (units/s) beyond which the vehicle counts as drifting
    pub const DRIFT_SLIP_THRESHOLD: f32 = 25.0;
    /// Blend rate toward the segment's gravity-shift rotation
    pub const ROTATION_BLEND: f32 = 4.0;
    /// Sideways pull from the current gravity-shift angle (units/s²)
    pub const GRAVITY_LATERAL_PULL: f32 = 40.0;

    /// Nitro/boost
    pub const BOOST_MULTIPLIER: f32 = 1.5;
    pub const NITRO_MAX: f32 = 100.0;
    /// Nitro drain per second while boosting
    pub const NITRO_DRAIN: f32 = 35.0;
    /// Passive nitro regeneration per second
    pub const NITRO_REGEN: f32 = 8.0;

    /// Collision footprints
    pub const VEHICLE_HALF_WIDTH: f32 = 14.0;
    pub const VEHICLE_HALF_LENGTH: f32 = 24.0;
    /// Extra lateral margin around an obstacle that counts as a near miss
    pub const NEAR_MISS_BAND: f32 = 22.0;
    pub const POWERUP_RADIUS: f32 = 18.0;

    /// Hit response
    pub const HIT_INVINCIBILITY: f32 = 1.0;
    /// Speed multiplier applied on a damaging hit
    pub const HIT_SPEED_CUT: f32 = 0.45;
    /// Off-track drag rate (exponential, per second)
    pub const BOUNDS_DRAG: f32 = 5.0;
    /// Corrective push back toward the track center (units/s²)
    pub const BOUNDS_PUSH: f32 = 160.0;
    /// Soft shoulder inside the hard track edge
    pub const SHOULDER_WIDTH: f32 = 20.0;

    /// Track layout
    pub const SEGMENT_LENGTH: f32 = 200.0;
    pub const DRAW_DISTANCE: f32 = 1200.0;
    /// Remaining generated track below which endless mode extends
    pub const EXTEND_THRESHOLD: f32 = 1600.0;
    pub const EXTEND_BATCH: usize = 20;
    pub const TRACK_WIDTH: f32 = 400.0;

    /// Scoring
    pub const SCORE_DISTANCE_RATE: f32 = 0.1;
    pub const SCORE_DRIFT_RATE: f32 = 40.0;
    pub const SCORE_NEAR_MISS: u64 = 50;
    pub const SCORE_CHECKPOINT: u64 = 200;
    pub const SCORE_POWERUP: u64 = 25;
    pub const COMBO_NEAR_MISS: u32 = 1;
    pub const COMBO_CHECKPOINT: u32 = 2;
    pub const COMBO_POWERUP: u32 = 1;
    /// Combo increments per multiplier tier
    pub const COMBO_PER_TIER: u32 = 5;
    pub const MAX_MULTIPLIER: u32 = 8;

    /// Powerup effect durations (seconds)
    pub const SLOWMO_DURATION: f32 = 4.0;
    pub const GHOST_DURATION: f32 = 3.0;
    /// Speed cap factor while slow-mo is active
    pub const SLOWMO_FACTOR: f32 = 0.6;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate-normalized exponential blend toward a target.
///
/// Equivalent to `lerp(current, target, 1 - e^(-rate·dt))`, so two half-dt
/// steps converge exactly like one full step.
#[inline]
pub fn exp_decay(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

/// Move a value toward a target by at most `max_delta`
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    current + (target - current).clamp(-max_delta, max_delta)
}
