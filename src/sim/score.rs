//! Score & combo state machine
//!
//! A pure accumulator: score only ever grows. The combo counter climbs on
//! qualifying events (near-miss, checkpoint, powerup) and resets to zero on
//! a damaging hit; the multiplier is a capped step function of the combo.

use serde::{Deserialize, Serialize};

use super::classifier::FrameResult;
use super::state::GameEvent;
use crate::consts::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Cumulative score; monotonic non-negative
    pub score: u64,
    /// Qualifying events since the last hit
    pub combo: u32,
    pub max_combo: u32,
    /// Total seconds spent drifting
    pub drift_time: f32,
    pub near_misses: u32,
    pub hits: u32,
    /// Fractional points carried between frames so rate-based scoring
    /// doesn't lose precision at small dt
    fraction: f32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current multiplier tier: one step per [`COMBO_PER_TIER`] combo,
    /// capped at [`MAX_MULTIPLIER`]. Non-decreasing in combo.
    #[inline]
    pub fn multiplier(&self) -> u32 {
        (1 + self.combo / COMBO_PER_TIER).min(MAX_MULTIPLIER)
    }

    /// Fold one frame's classification into the score.
    ///
    /// A hit resets the combo and suppresses this frame's combo increments;
    /// everything else accrues scaled by the multiplier. Queues a
    /// [`GameEvent::ComboTier`] when the multiplier steps up.
    pub fn apply(
        &mut self,
        result: &FrameResult,
        distance_delta: f32,
        drift_dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let tier_before = self.multiplier();

        let near_misses = result.near_misses.len() as u32;
        let checkpoints = result.checkpoints.len() as u32;
        let powerups = result.collected.len() as u32;

        if result.hit.is_some() {
            self.hits += 1;
            self.combo = 0;
        } else {
            self.combo += near_misses * COMBO_NEAR_MISS
                + checkpoints * COMBO_CHECKPOINT
                + powerups * COMBO_POWERUP;
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.near_misses += near_misses;
        self.drift_time += drift_dt.max(0.0);

        let multiplier = self.multiplier();

        let flat = near_misses as u64 * SCORE_NEAR_MISS
            + checkpoints as u64 * SCORE_CHECKPOINT
            + powerups as u64 * SCORE_POWERUP;
        self.score += flat * multiplier as u64;

        let rated = distance_delta.max(0.0) * SCORE_DISTANCE_RATE
            + drift_dt.max(0.0) * SCORE_DRIFT_RATE;
        self.fraction += rated * multiplier as f32;
        let whole = self.fraction.floor();
        self.score += whole as u64;
        self.fraction -= whole;

        if multiplier > tier_before {
            events.push(GameEvent::ComboTier { multiplier });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(hit: bool, near_misses: usize, checkpoints: usize, powerups: usize) -> FrameResult {
        use crate::sim::state::PowerupKind;
        FrameResult {
            hit: hit.then_some(1),
            near_misses: (0..near_misses as u32).collect(),
            checkpoints: (0..checkpoints as u32).collect(),
            collected: (0..powerups as u32)
                .map(|i| (i, PowerupKind::Boost))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_combo_resets_on_hit() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        for _ in 0..7 {
            board.apply(&frame(false, 1, 0, 0), 0.0, 0.0, &mut events);
        }
        assert_eq!(board.combo, 7);

        board.apply(&frame(true, 0, 0, 0), 0.0, 0.0, &mut events);
        assert_eq!(board.combo, 0);
        assert_eq!(board.hits, 1);
        assert_eq!(board.max_combo, 7);
    }

    #[test]
    fn test_hit_suppresses_same_frame_increments() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        board.apply(&frame(true, 2, 1, 0), 0.0, 0.0, &mut events);
        assert_eq!(board.combo, 0);
    }

    #[test]
    fn test_multiplier_steps_and_caps() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.multiplier(), 1);

        board.combo = COMBO_PER_TIER;
        assert_eq!(board.multiplier(), 2);

        board.combo = COMBO_PER_TIER * 100;
        assert_eq!(board.multiplier(), MAX_MULTIPLIER);
    }

    #[test]
    fn test_combo_tier_event_fires_on_step_up() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        for _ in 0..COMBO_PER_TIER {
            board.apply(&frame(false, 1, 0, 0), 0.0, 0.0, &mut events);
        }
        assert_eq!(events, vec![GameEvent::ComboTier { multiplier: 2 }]);
    }

    #[test]
    fn test_flat_bonuses_scaled_by_multiplier() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        board.combo = COMBO_PER_TIER; // multiplier 2
        board.apply(&frame(false, 1, 0, 0), 0.0, 0.0, &mut events);
        assert_eq!(board.score, SCORE_NEAR_MISS * 2);
    }

    #[test]
    fn test_distance_rate_accumulates_fractions() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        // 1 unit per frame at 0.1 pts/unit: ten frames must yield 1 point
        for _ in 0..10 {
            board.apply(&FrameResult::default(), 1.0, 0.0, &mut events);
        }
        assert_eq!(board.score, 1);
    }

    #[test]
    fn test_drift_time_accrues() {
        let mut board = ScoreBoard::new();
        let mut events = Vec::new();
        board.apply(&FrameResult::default(), 0.0, 0.5, &mut events);
        assert!((board.drift_time - 0.5).abs() < 1e-6);
        assert_eq!(board.score, (0.5 * SCORE_DRIFT_RATE) as u64);
    }

    proptest! {
        #[test]
        fn prop_score_monotonic(
            hits in proptest::collection::vec(any::<bool>(), 1..50),
            deltas in proptest::collection::vec(0.0f32..10.0, 1..50),
        ) {
            let mut board = ScoreBoard::new();
            let mut events = Vec::new();
            let mut last = 0;
            for (hit, delta) in hits.iter().zip(&deltas) {
                board.apply(&frame(*hit, 1, 0, 0), *delta, 0.0, &mut events);
                prop_assert!(board.score >= last);
                last = board.score;
            }
        }

        #[test]
        fn prop_any_hit_zeroes_combo(preload in 0u32..100) {
            let mut board = ScoreBoard::new();
            board.combo = preload;
            let mut events = Vec::new();
            board.apply(&frame(true, 0, 0, 0), 0.0, 0.0, &mut events);
            prop_assert_eq!(board.combo, 0);
        }
    }
}
