//! Lane/height slots and the used-position zone set
//!
//! The corridor has a fixed grid of spawn slots: 5 lanes x 2 heights for
//! obstacles, 3 lanes x 2 heights for collectibles and power-ups. Slots are
//! reusable coordinates, not entities. `ZoneSet` keeps two simultaneously
//! live objects of one category from landing in the same rounded x/y/z zone,
//! with a bounded retry budget before accepting the overlap.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::ZONE_SIZE;

/// One reusable lane/height spawn coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSlot {
    pub x: f32,
    pub y: f32,
}

/// 5 lanes x 2 heights for the obstacle grid.
pub const OBSTACLE_SLOTS: [LaneSlot; 10] = [
    LaneSlot { x: -2000.0, y: 375.0 },
    LaneSlot { x: -1000.0, y: 375.0 },
    LaneSlot { x: 0.0, y: 375.0 },
    LaneSlot { x: 1000.0, y: 375.0 },
    LaneSlot { x: 2000.0, y: 375.0 },
    LaneSlot { x: -2000.0, y: 1500.0 },
    LaneSlot { x: -1000.0, y: 1500.0 },
    LaneSlot { x: 0.0, y: 1500.0 },
    LaneSlot { x: 1000.0, y: 1500.0 },
    LaneSlot { x: 2000.0, y: 1500.0 },
];

/// 3 lanes x 2 heights for collectibles and power-ups.
pub const ITEM_SLOTS: [LaneSlot; 6] = [
    LaneSlot { x: -1000.0, y: 375.0 },
    LaneSlot { x: 0.0, y: 375.0 },
    LaneSlot { x: 1000.0, y: 375.0 },
    LaneSlot { x: -1000.0, y: 1500.0 },
    LaneSlot { x: 0.0, y: 1500.0 },
    LaneSlot { x: 1000.0, y: 1500.0 },
];

/// Working set of occupied spawn zones for one placement pass.
///
/// A zone is the slot coordinate plus the depth rounded to [`ZONE_SIZE`].
/// The set lives only for the duration of a spawn or respawn routine.
#[derive(Debug, Default)]
pub struct ZoneSet {
    used: std::collections::HashSet<(i64, i64, i64)>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(x: f32, y: f32, z: f32) -> (i64, i64, i64) {
        let zone = (z / ZONE_SIZE).round() * ZONE_SIZE;
        (x as i64, y as i64, zone as i64)
    }

    /// Mark a position as occupied.
    pub fn occupy(&mut self, x: f32, y: f32, z: f32) {
        self.used.insert(Self::key(x, y, z));
    }

    pub fn contains(&self, x: f32, y: f32, z: f32) -> bool {
        self.used.contains(&Self::key(x, y, z))
    }
}

/// Draw a slot and depth that avoid occupied zones.
///
/// `depth` produces a candidate z for each attempt. Retries re-roll both the
/// slot and the depth up to [`crate::consts::SLOT_RETRY_LIMIT`] times, then
/// accept the collision; a crowded corridor beats an empty one. The winning
/// zone is recorded in `zones`.
pub fn pick_free_slot<R: Rng, F: FnMut(&mut R) -> f32>(
    rng: &mut R,
    slots: &[LaneSlot],
    zones: &mut ZoneSet,
    mut depth: F,
) -> (LaneSlot, f32) {
    let mut slot = slots[rng.random_range(0..slots.len())];
    let mut z = depth(rng);

    for _ in 0..crate::consts::SLOT_RETRY_LIMIT {
        if !zones.contains(slot.x, slot.y, z) {
            break;
        }
        slot = slots[rng.random_range(0..slots.len())];
        z = depth(rng);
    }

    zones.occupy(slot.x, slot.y, z);
    (slot, z)
}
