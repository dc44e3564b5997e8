//! Runtime gameplay knobs
//!
//! Counts, timers, and the difficulty ramp, bundled so a host can rebalance
//! the field from a JSON blob without recompiling. Geometry stays in
//! `consts` - lane positions are part of the corridor, not a balance lever.

use serde::{Deserialize, Serialize};

/// Session-level balance parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    /// Minutes until the difficulty ramp saturates at progress 1.0
    pub ramp_minutes: f32,
    /// Collectible count at progress 0
    pub base_collectibles: u32,
    /// Hard ceiling on live collectibles at progress 1
    pub max_collectibles: u32,
    /// Power-up count never drops below this
    pub min_powerups: u32,
    /// Seconds a challenge mode (planet / comet trail) runs before reverting
    pub challenge_secs: u64,
    /// Seconds between challenge-mode draws
    pub mode_cycle_secs: u64,
    /// Obstacles in the first grid build
    pub initial_obstacles: u32,
    /// Extra obstacles added after every full grid rebuild
    pub obstacle_growth: u32,
    /// Comets in the first comet-trail build
    pub comet_fleet_start: u32,
    /// Planets per planet-field build
    pub planet_count: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ramp_minutes: 2.0,
            base_collectibles: 5,
            max_collectibles: 20,
            min_powerups: 2,
            challenge_secs: 20,
            mode_cycle_secs: 40,
            initial_obstacles: 10,
            obstacle_growth: 2,
            comet_fleet_start: 5,
            planet_count: 5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON, e.g. a balance file shipped next to the assets.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
