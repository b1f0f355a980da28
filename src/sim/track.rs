//! Track segment model
//!
//! An append-only ordered sequence of fixed-length segments indexed by
//! forward distance. Layout is a pure function of (seed, segment index,
//! previous rotation), so extending in endless mode never perturbs segments
//! already placed. Lookups are index arithmetic, never scans; the classifier
//! only ever sees the camera-local window from [`Track::visible_segments_mut`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Checkpoint, Obstacle, ObstacleKind, Powerup, PowerupKind};
use crate::config::{GoalKind, LevelConfig, TrackConfig};
use crate::consts::*;

/// Stream constant mixed into per-segment RNG seeds
const SEGMENT_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A fixed-length slice of track with its own gravity-shift rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub index: u32,
    /// Forward distance where this segment begins
    pub start: f32,
    /// Gravity-shift angle the vehicle heading blends toward (radians)
    pub rotation: f32,
    pub obstacles: Vec<Obstacle>,
    pub powerups: Vec<Powerup>,
    pub checkpoint: Option<Checkpoint>,
}

impl Segment {
    #[inline]
    pub fn end(&self) -> f32 {
        self.start + SEGMENT_LENGTH
    }

    #[inline]
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.start && distance < self.end()
    }
}

/// The generated track for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    seed: u64,
    config: TrackConfig,
    /// Endless tracks keep extending; goal tracks are built once
    endless: bool,
    segments: Vec<Segment>,
    next_id: u32,
}

impl Track {
    /// Generate the initial batch of segments for a level.
    ///
    /// Goal tracks are sized to cover the target distance plus a buffer so
    /// the vehicle never runs off the end before the goal check fires;
    /// endless tracks start with two extension batches.
    pub fn build(level: &LevelConfig, seed: u64) -> Self {
        let endless = level.goal.kind == GoalKind::Endless;
        let count = match level.goal.kind {
            GoalKind::Distance => {
                (level.goal.target / SEGMENT_LENGTH).ceil() as usize
                    + (DRAW_DISTANCE / SEGMENT_LENGTH) as usize
            }
            // Sized for the fastest possible run within the time limit
            GoalKind::Survival => {
                let limit = level
                    .goal
                    .effective_time_limit()
                    .unwrap_or(crate::config::GoalConfig::DEFAULT_SURVIVAL_LIMIT);
                (limit * MAX_SPEED * BOOST_MULTIPLIER / SEGMENT_LENGTH).ceil() as usize
                    + (DRAW_DISTANCE / SEGMENT_LENGTH) as usize
            }
            GoalKind::Endless => EXTEND_BATCH * 2,
        };

        let mut track = Self {
            seed,
            config: level.track.clone(),
            endless,
            segments: Vec::with_capacity(count),
            next_id: 1,
        };
        track.extend(count.max(1));
        log::debug!("Track built: {} segments (endless={endless})", track.len());
        track
    }

    /// Number of generated segments
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Forward distance covered by the generated track
    #[inline]
    pub fn total_length(&self) -> f32 {
        self.segments.len() as f32 * SEGMENT_LENGTH
    }

    /// Full track width
    #[inline]
    pub fn width(&self) -> f32 {
        self.config.width
    }

    /// Half-width of the drivable surface; beyond it (but inside the hard
    /// edge) is the penalty shoulder
    #[inline]
    pub fn drivable_half_width(&self) -> f32 {
        (self.config.width / 2.0 - SHOULDER_WIDTH).max(0.0)
    }

    /// Append `count` more segments
    pub fn extend(&mut self, count: usize) {
        let prev_rotation = self.segments.last().map(|s| s.rotation).unwrap_or(0.0);
        let first = self.segments.len() as u32;
        let mut rotation = prev_rotation;
        for index in first..first + count as u32 {
            let segment = self.generate_segment(index, &mut rotation);
            self.segments.push(segment);
        }
    }

    /// Extend when the camera is approaching the generated end (endless
    /// only). Safe to call every frame: the distance threshold makes it a
    /// no-op until more track is actually needed. Returns whether segments
    /// were appended.
    pub fn maybe_extend(&mut self, camera: f32) -> bool {
        if !self.endless {
            return false;
        }
        let remaining = self.total_length() - camera;
        if remaining < EXTEND_THRESHOLD {
            self.extend(EXTEND_BATCH);
            log::debug!(
                "Track extended to {} segments at camera {camera:.0}",
                self.len()
            );
            true
        } else {
            false
        }
    }

    /// Segment containing the given forward distance, by index arithmetic.
    /// Returns `None` beyond the generated range (callers handle this; the
    /// endless extension trigger relies on it).
    pub fn segment_at(&self, distance: f32) -> Option<&Segment> {
        if distance < 0.0 {
            return None;
        }
        self.segments.get((distance / SEGMENT_LENGTH) as usize)
    }

    /// Gravity-shift rotation at a distance; out-of-range falls back to the
    /// last generated segment so the integrator never sees a discontinuity
    pub fn rotation_at(&self, distance: f32) -> f32 {
        self.segment_at(distance)
            .or_else(|| self.segments.last())
            .map(|s| s.rotation)
            .unwrap_or(0.0)
    }

    /// Segments within draw range of the camera. This window is the only
    /// part of the track the collision classifier scans.
    pub fn visible_segments(&self, camera: f32, draw_distance: f32) -> &[Segment] {
        let (lo, hi) = self.window_bounds(camera, draw_distance);
        &self.segments[lo..hi]
    }

    /// Mutable window, for entity flag transitions during classification
    pub fn visible_segments_mut(&mut self, camera: f32, draw_distance: f32) -> &mut [Segment] {
        let (lo, hi) = self.window_bounds(camera, draw_distance);
        &mut self.segments[lo..hi]
    }

    fn window_bounds(&self, camera: f32, draw_distance: f32) -> (usize, usize) {
        // One segment of lookbehind so entities straddling the camera stay in
        let lo = ((camera - SEGMENT_LENGTH).max(0.0) / SEGMENT_LENGTH) as usize;
        let hi = (((camera + draw_distance) / SEGMENT_LENGTH).ceil() as usize)
            .min(self.segments.len());
        (lo.min(hi), hi)
    }

    fn generate_segment(&mut self, index: u32, rotation: &mut f32) -> Segment {
        let mut rng = Pcg32::seed_from_u64(
            self.seed
                .wrapping_add((index as u64).wrapping_mul(SEGMENT_SEED_MIX)),
        );
        let start = index as f32 * SEGMENT_LENGTH;

        // Gravity drifts segment to segment, clamped to the configured range
        let max_rot = self.config.max_rotation;
        if max_rot > 0.0 {
            *rotation = (*rotation + rng.random_range(-0.25..0.25)).clamp(-max_rot, max_rot);
        }

        // First segments are a grace zone with nothing to hit. A degenerate
        // track narrower than its shoulders gets no placements at all.
        let half = self.drivable_half_width();
        let grace = index < 2 || half <= 0.0;

        let mut obstacles = Vec::new();
        if !grace {
            for _ in 0..sample_count(&mut rng, self.config.obstacle_density) {
                let id = self.alloc_id();
                obstacles.push(Obstacle {
                    id,
                    x: rng.random_range(-half..half),
                    distance: start + rng.random_range(0.0..SEGMENT_LENGTH),
                    kind: roll_obstacle_kind(&mut rng),
                    active: true,
                    near_miss_scored: false,
                });
            }
        }

        let mut powerups = Vec::new();
        if !grace {
            for _ in 0..sample_count(&mut rng, self.config.powerup_density) {
                let id = self.alloc_id();
                powerups.push(Powerup {
                    id,
                    x: rng.random_range(-half..half),
                    distance: start + rng.random_range(0.0..SEGMENT_LENGTH),
                    kind: roll_powerup_kind(&mut rng),
                    collected: false,
                });
            }
        }

        let every = self.config.checkpoint_every;
        let checkpoint = if every > 0 && index > 0 && index.is_multiple_of(every) {
            let id = self.alloc_id();
            Some(Checkpoint {
                id,
                distance: start + SEGMENT_LENGTH / 2.0,
                passed: false,
            })
        } else {
            None
        };

        Segment {
            index,
            start,
            rotation: *rotation,
            obstacles,
            powerups,
            checkpoint,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Integer sample from a fractional expected count
fn sample_count(rng: &mut Pcg32, density: f32) -> u32 {
    let base = density.max(0.0);
    let whole = base.floor() as u32;
    if rng.random::<f32>() < base.fract() {
        whole + 1
    } else {
        whole
    }
}

fn roll_obstacle_kind(rng: &mut Pcg32) -> ObstacleKind {
    match rng.random_range(0..100) {
        0..40 => ObstacleKind::Barrier,
        40..70 => ObstacleKind::Spike,
        _ => ObstacleKind::Debris,
    }
}

fn roll_powerup_kind(rng: &mut Pcg32) -> PowerupKind {
    match rng.random_range(0..100) {
        0..40 => PowerupKind::Boost,
        40..65 => PowerupKind::Shield,
        65..85 => PowerupKind::SlowMo,
        _ => PowerupKind::Ghost,
    }
}
