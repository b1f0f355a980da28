//! Collision & proximity classifier
//!
//! Per step, checks the vehicle against the camera-local segment window and
//! produces one [`FrameResult`]: at most one damaging hit, near-misses scored
//! once per obstacle, newly collected powerups, newly passed checkpoints and
//! the track-bounds status. Entity flags (`active`, `collected`, `passed`,
//! `near_miss_scored`) make every transition fire exactly once no matter how
//! many frames re-examine the same instance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{PowerupKind, Vehicle};
use super::track::Track;
use crate::consts::*;

/// Which track edge, if any, the vehicle is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundsStatus {
    #[default]
    Inside,
    Left,
    Right,
}

/// Classification result for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameResult {
    /// Obstacle id of the first damaging hit, if any
    pub hit: Option<u32>,
    /// Obstacles that registered a near miss this frame
    pub near_misses: Vec<u32>,
    /// Powerups collected this frame
    pub collected: Vec<(u32, PowerupKind)>,
    /// Checkpoints passed this frame
    pub checkpoints: Vec<u32>,
    pub bounds: BoundsStatus,
}

impl FrameResult {
    /// Fold a sub-step result into the frame total. A single hit per frame
    /// is kept (the first); the entity flags already de-duplicate the rest.
    pub fn merge(&mut self, other: FrameResult) {
        if self.hit.is_none() {
            self.hit = other.hit;
        }
        self.near_misses.extend(other.near_misses);
        self.collected.extend(other.collected);
        self.checkpoints.extend(other.checkpoints);
        if other.bounds != BoundsStatus::Inside {
            self.bounds = other.bounds;
        }
    }
}

/// Classify the vehicle against the visible window of the track.
///
/// `ghost` skips damage checks (the ghost powerup); the vehicle's own
/// invincibility cooldown does the same. Mutates entity flags in place.
pub fn classify(vehicle: &Vehicle, track: &mut Track, ghost: bool) -> FrameResult {
    let mut result = FrameResult::default();

    let drivable = track.drivable_half_width();
    if vehicle.x < -drivable {
        result.bounds = BoundsStatus::Left;
    } else if vehicle.x > drivable {
        result.bounds = BoundsStatus::Right;
    }

    let damage_checks = !ghost && !vehicle.is_invincible();
    let pos = vehicle.pos();

    for segment in track.visible_segments_mut(vehicle.distance, DRAW_DISTANCE) {
        for obstacle in &mut segment.obstacles {
            if !obstacle.active {
                continue;
            }

            let delta = pos - Vec2::new(obstacle.x, obstacle.distance);
            let half = obstacle.kind.half_extents();
            let lateral_gap = delta.x.abs() - (VEHICLE_HALF_WIDTH + half.x);
            let forward_gap = delta.y.abs() - (VEHICLE_HALF_LENGTH + half.y);
            let overlapping = lateral_gap < 0.0 && forward_gap < 0.0;

            if overlapping {
                if damage_checks && result.hit.is_none() {
                    // One hit event per frame; the obstacle is spent
                    result.hit = Some(obstacle.id);
                    obstacle.active = false;
                }
                continue;
            }

            // Alongside but not touching: a near miss, once per instance
            if forward_gap < 0.0
                && lateral_gap < NEAR_MISS_BAND
                && !obstacle.near_miss_scored
            {
                obstacle.near_miss_scored = true;
                result.near_misses.push(obstacle.id);
            }

            // Fully behind the vehicle: can never matter again
            if obstacle.distance + half.y + VEHICLE_HALF_LENGTH + NEAR_MISS_BAND
                < vehicle.distance
            {
                obstacle.active = false;
            }
        }

        for powerup in &mut segment.powerups {
            if powerup.collected {
                continue;
            }
            let delta = pos - Vec2::new(powerup.x, powerup.distance);
            let reach = POWERUP_RADIUS + VEHICLE_HALF_WIDTH;
            if delta.length_squared() < reach * reach {
                powerup.collected = true;
                result.collected.push((powerup.id, powerup.kind));
            }
        }

        if let Some(checkpoint) = &mut segment.checkpoint
            && !checkpoint.passed
            && vehicle.distance >= checkpoint.distance
        {
            checkpoint.passed = true;
            result.checkpoints.push(checkpoint.id);
        }
    }

    result
}
