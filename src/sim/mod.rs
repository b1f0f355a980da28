//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (track layout is a function of seed and segment index)
//! - Variable dt, sub-stepped and frame-rate normalized
//! - Fixed per-frame order: integrate → classify → score
//! - No rendering or platform dependencies

pub mod classifier;
pub mod integrator;
pub mod score;
pub mod state;
pub mod tick;
pub mod track;

pub use classifier::{BoundsStatus, FrameResult, classify};
pub use integrator::integrate;
pub use score::ScoreBoard;
pub use state::{
    ActiveEffects, Checkpoint, GameEvent, Obstacle, ObstacleKind, Powerup, PowerupKind,
    RaceOutcome, RaceStats, Session, SessionPhase, Vehicle,
};
pub use tick::{TickInput, tick};
pub use track::{Segment, Track};
