//! Difficulty scheduler
//!
//! Pure functions of elapsed session time. The progress factor ramps from 0
//! to 1 over `ramp_minutes` and everything else - target counts, spawn
//! spacing - derives from it. No side effects; `WorldState::reset` restarts
//! the ramp by moving the session start.

use crate::tuning::Tuning;

/// Normalized difficulty in [0, 1] for the given session clock reading.
///
/// Monotonic non-decreasing as long as the session clock is; the host
/// supplies a monotonic elapsed-time source.
pub fn progress_factor(session_start_ms: u64, now_ms: u64, tuning: &Tuning) -> f32 {
    let elapsed_minutes = now_ms.saturating_sub(session_start_ms) as f32 / 60_000.0;
    (elapsed_minutes / tuning.ramp_minutes).clamp(0.0, 1.0)
}

/// How many collectibles should be live at this difficulty.
pub fn collectible_target(progress: f32, tuning: &Tuning) -> u32 {
    let span = (tuning.max_collectibles - tuning.base_collectibles) as f32;
    let target = (tuning.base_collectibles as f32 + progress * span).floor() as u32;
    target.min(tuning.max_collectibles)
}

/// Power-up target: half the collectible target, never below the floor.
pub fn powerup_target(progress: f32, tuning: &Tuning) -> u32 {
    let ct = collectible_target(progress, tuning);
    ct.div_ceil(2).max(tuning.min_powerups)
}

/// Depth spacing between freshly spawned collectibles, widening with progress.
pub fn collectible_spacing(progress: f32) -> f32 {
    5000.0 + 2000.0 * progress
}
