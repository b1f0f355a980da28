//! Session state and core simulation types
//!
//! Everything that must survive a save/restore for determinism lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::score::ScoreBoard;
use super::track::Track;
use crate::config::SessionConfig;

/// Current phase of a race session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Active gameplay
    Running,
    /// Session is paused
    Paused,
    /// Race ended; see [`Session::outcome`]
    Complete,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceOutcome {
    /// Goal reached
    Victory,
    /// Time limit expired before the goal
    TimeUp,
    /// Vehicle destroyed (reserved for a future lives system)
    Wrecked,
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Barrier,
    Spike,
    Debris,
}

impl ObstacleKind {
    /// Half extents of the collision footprint (lateral, longitudinal)
    pub fn half_extents(&self) -> Vec2 {
        match self {
            ObstacleKind::Barrier => Vec2::new(28.0, 10.0),
            ObstacleKind::Spike => Vec2::new(12.0, 12.0),
            ObstacleKind::Debris => Vec2::new(16.0, 16.0),
        }
    }
}

/// A fixed hazard placed on a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Lane offset from track center
    pub x: f32,
    /// Forward distance from track origin
    pub distance: f32,
    pub kind: ObstacleKind,
    /// Cleared once the obstacle can no longer affect the vehicle
    pub active: bool,
    /// Near-miss already awarded for this instance (scored at most once)
    pub near_miss_scored: bool,
}

/// Powerup variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Refills the nitro tank
    Boost,
    /// Absorbs the next damaging hit
    Shield,
    /// Timed speed-cap relief on hazard pressure
    SlowMo,
    /// Timed pass-through-obstacles window
    Ghost,
}

/// A collectible placed on a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub x: f32,
    pub distance: f32,
    pub kind: PowerupKind,
    /// Transitions false → true exactly once
    pub collected: bool,
}

/// A checkpoint line across the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub distance: f32,
    /// Transitions false → true exactly once, never re-evaluated after
    pub passed: bool,
}

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Lane offset, clamped to [min_x, max_x]
    pub x: f32,
    /// Forward distance from track origin
    pub distance: f32,
    /// Scalar forward speed
    pub speed: f32,
    /// Lateral velocity (positive = right)
    pub lateral_vel: f32,
    /// Current heading, blending toward the segment's gravity-shift angle
    pub rotation: f32,
    /// Lateral slip currently exceeds the drift threshold
    pub drifting: bool,
    /// Magnitude of the current lateral slip
    pub drift_magnitude: f32,
    /// Boost resource, 0..tuning.nitro_max
    pub nitro: f32,
    /// Damage cooldown; classifier skips hit checks while positive
    pub invincible_timer: f32,
    pub min_x: f32,
    pub max_x: f32,
}

impl Vehicle {
    pub fn new(track_width: f32, nitro_max: f32) -> Self {
        let half = track_width / 2.0;
        Self {
            x: 0.0,
            distance: 0.0,
            speed: 0.0,
            lateral_vel: 0.0,
            rotation: 0.0,
            drifting: false,
            drift_magnitude: 0.0,
            nitro: nitro_max,
            invincible_timer: 0.0,
            min_x: -half,
            max_x: half,
        }
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    /// Position in (lane, forward-distance) space
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.distance)
    }
}

/// Timed powerup effects currently active on the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// One-hit shield
    pub shield: bool,
    pub slowmo_timer: f32,
    pub ghost_timer: f32,
}

impl ActiveEffects {
    #[inline]
    pub fn slowmo_active(&self) -> bool {
        self.slowmo_timer > 0.0
    }

    #[inline]
    pub fn ghost_active(&self) -> bool {
        self.ghost_timer > 0.0
    }

    /// Count down timed effects
    pub fn decay(&mut self, dt: f32) {
        self.slowmo_timer = (self.slowmo_timer - dt).max(0.0);
        self.ghost_timer = (self.ghost_timer - dt).max(0.0);
    }
}

/// Gameplay events produced during a tick, drained once per frame by the
/// presentation layer (particles, camera shake, audio). Purely informational;
/// all state changes have already been applied when an event is queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Drift { dt: f32 },
    NearMiss { obstacle_id: u32 },
    Hit { obstacle_id: u32 },
    ShieldBlocked { obstacle_id: u32 },
    PowerupCollected { kind: PowerupKind },
    CheckpointPassed { id: u32 },
    ComboTier { multiplier: u32 },
    OffTrack,
    SessionEnded { outcome: RaceOutcome },
}

/// End-of-race snapshot handed to the victory/game-over screens and to
/// highscore persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceStats {
    pub score: u64,
    pub distance: f32,
    pub max_combo: u32,
    pub time: f32,
    pub near_misses: u32,
    pub hits: u32,
    pub outcome: Option<RaceOutcome>,
}

/// Complete race session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: SessionConfig,
    pub phase: SessionPhase,
    pub outcome: Option<RaceOutcome>,
    /// Wall-clock gameplay time accumulated from dt
    pub elapsed: f32,
    pub vehicle: Vehicle,
    pub track: Track,
    pub score: ScoreBoard,
    pub effects: ActiveEffects,
    /// Event queue for this frame, drained by the caller
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Session {
    /// Start a new race from a config and seed
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let track = Track::build(&config.level, seed);
        let vehicle = Vehicle::new(config.level.track.width, config.tuning.nitro_max);
        log::info!(
            "Session start: seed={seed} goal={:?} segments={}",
            config.level.goal.kind,
            track.len()
        );
        Self {
            seed,
            config,
            phase: SessionPhase::Running,
            outcome: None,
            elapsed: 0.0,
            vehicle,
            track,
            score: ScoreBoard::new(),
            effects: ActiveEffects::default(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Take this frame's events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for HUD and end-of-race screens
    pub fn stats(&self) -> RaceStats {
        RaceStats {
            score: self.score.score,
            distance: self.vehicle.distance,
            max_combo: self.score.max_combo,
            time: self.elapsed,
            near_misses: self.score.near_misses,
            hits: self.score.hits,
            outcome: self.outcome,
        }
    }

    /// Mark the session complete with the given outcome (idempotent; the
    /// first outcome wins)
    pub fn finish(&mut self, outcome: RaceOutcome) {
        if self.phase == SessionPhase::Complete {
            return;
        }
        self.phase = SessionPhase::Complete;
        self.outcome = Some(outcome);
        self.events.push(GameEvent::SessionEnded { outcome });
        log::info!(
            "Session over: {:?} score={} distance={:.0} time={:.1}s",
            outcome,
            self.score.score,
            self.vehicle.distance,
            self.elapsed
        );
    }
}
