//! Contact classification
//!
//! Per-frame hit testing between the player probe and the three pools.
//! Obstacles use a narrow five-ray bundle; collectibles and power-ups use a
//! wide 22-ray bundle against visible members plus a spherical fallback,
//! because thin or offset geometry can slip between discrete rays. The
//! detector classifies and toggles visibility - scoring, health, and ending
//! the run belong to the caller.

use glam::Vec3;

use super::state::{CollectibleKind, Mode, ObjectTag, PowerUpKind, WorldEvent, WorldObject, WorldState};
use crate::consts::*;

/// Read-only view of the player supplied by the control subsystem.
#[derive(Debug, Clone, Copy)]
pub struct PlayerProbe {
    pub position: Vec3,
    /// Forward speed, forwarded to `TickInput` by most hosts
    pub speed: f32,
    /// Power-up invincibility; enemies disintegrate harmlessly while set
    pub invincible: bool,
}

/// Outcome of one `check` call. At most one object changes state per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Destructive contact with an obstacle
    Hit { tag: ObjectTag },
    /// A collectible was consumed (and hidden for later respawn)
    Collected(CollectibleKind),
    /// A power-up was consumed
    PoweredUp(PowerUpKind),
    NoContact,
}

/// Narrow bundle for obstacle contact: forward, sides, forward diagonals.
fn obstacle_rays() -> [Vec3; 5] {
    [
        Vec3::Z,
        Vec3::X,
        Vec3::NEG_X,
        Vec3::new(0.5, 0.0, 1.0).normalize(),
        Vec3::new(-0.5, 0.0, 1.0).normalize(),
    ]
}

/// Wide bundle for pickups: axes, cube diagonals, and half-step forward cones.
fn pickup_rays() -> [Vec3; 22] {
    [
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::new(1.0, 1.0, 1.0).normalize(),
        Vec3::new(-1.0, 1.0, 1.0).normalize(),
        Vec3::new(1.0, -1.0, 1.0).normalize(),
        Vec3::new(-1.0, -1.0, 1.0).normalize(),
        Vec3::new(1.0, 0.0, 1.0).normalize(),
        Vec3::new(-1.0, 0.0, 1.0).normalize(),
        Vec3::new(0.0, 1.0, 1.0).normalize(),
        Vec3::new(0.0, -1.0, 1.0).normalize(),
        Vec3::new(0.5, 0.0, 1.0).normalize(),
        Vec3::new(-0.5, 0.0, 1.0).normalize(),
        Vec3::new(0.0, 0.5, 1.0).normalize(),
        Vec3::new(0.0, -0.5, 1.0).normalize(),
        Vec3::new(0.5, 0.5, 1.0).normalize(),
        Vec3::new(-0.5, 0.5, 1.0).normalize(),
        Vec3::new(0.5, -0.5, 1.0).normalize(),
        Vec3::new(-0.5, -0.5, 1.0).normalize(),
    ]
}

/// Distance along `dir` (unit length) from `origin` to the sphere, if the ray
/// reaches it. An origin already inside the sphere reports distance 0.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let along = to_center.dot(dir);
    let closest_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }
    let half_chord = (radius_sq - closest_sq).sqrt();
    let near = along - half_chord;
    let far = along + half_chord;
    if far < 0.0 {
        return None; // sphere entirely behind the origin
    }
    Some(near.max(0.0))
}

/// Nearest object intersected by any ray of the bundle within `range`.
fn nearest_ray_hit(
    origin: Vec3,
    rays: &[Vec3],
    range: f32,
    objects: &[WorldObject],
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for dir in rays {
        for (i, object) in objects.iter().enumerate() {
            if !object.visible {
                continue;
            }
            if let Some(dist) = ray_sphere(origin, *dir, object.position, object.bounds()) {
                if dist <= range && best.is_none_or(|(_, d)| dist < d) {
                    best = Some((i, dist));
                }
            }
        }
    }
    best.map(|(i, _)| i)
}

/// First visible object within the fallback sphere around the player.
fn sphere_fallback(origin: Vec3, range: f32, objects: &[WorldObject]) -> Option<usize> {
    objects
        .iter()
        .position(|o| o.visible && o.position.distance(origin) < range)
}

/// Classify contact for this frame.
///
/// Obstacles win over collectibles, collectibles over power-ups; whatever
/// remains is deferred to the next tick, which keeps double-scoring within a
/// frame impossible.
pub fn check(state: &mut WorldState, probe: &PlayerProbe) -> Contact {
    // --- Obstacles --------------------------------------------------------
    if let Some(index) = nearest_ray_hit(
        probe.position,
        &obstacle_rays(),
        OBSTACLE_RAY_RANGE,
        &state.obstacles,
    ) {
        let tag = state.obstacles[index].tag;

        if tag == ObjectTag::Enemy {
            // Defeated enemies burst apart whether or not the run survives.
            state.events.push(WorldEvent::Disintegration {
                position: state.obstacles[index].position,
            });
            if probe.invincible {
                state.obstacles[index].visible = false;
                return Contact::NoContact;
            }
        }

        // Comets stay visible on impact; they are meant to be seen sweeping
        // past. Everything else, struck enemies included, leaves the field.
        if tag == ObjectTag::Enemy || state.modes.mode != Mode::CometTrail {
            state.obstacles[index].visible = false;
        }
        return Contact::Hit { tag };
    }

    // --- Collectibles -----------------------------------------------------
    let origin = probe.position;
    let pickup = nearest_ray_hit(origin, &pickup_rays(), PICKUP_RAY_RANGE, &state.collectibles)
        .or_else(|| sphere_fallback(origin, PICKUP_SPHERE_RANGE, &state.collectibles));
    if let Some(index) = pickup {
        let item = &mut state.collectibles[index];
        item.visible = false;
        let kind = match item.tag {
            ObjectTag::Metal => CollectibleKind::Metal,
            // Every non-metal variant counts as plastic.
            _ => CollectibleKind::Plastic,
        };
        return Contact::Collected(kind);
    }

    // --- Power-ups --------------------------------------------------------
    let pickup = nearest_ray_hit(origin, &pickup_rays(), PICKUP_RAY_RANGE, &state.powerups)
        .or_else(|| sphere_fallback(origin, PICKUP_SPHERE_RANGE, &state.powerups));
    if let Some(index) = pickup {
        state.powerups[index].visible = false;
        return Contact::PoweredUp(PowerUpKind::Boot);
    }

    Contact::NoContact
}
