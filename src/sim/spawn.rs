//! Spawn planner
//!
//! Populates and replenishes each category to its difficulty-derived target.
//! The grid build lays enemies across the ten fixed lane slots; the comet and
//! planet builds replace the obstacle set for their modes; collectibles are
//! topped up incrementally while power-ups are cleared and regenerated as a
//! batch. A missing mesh template skips its category and logs once per
//! session - nothing in here is allowed to take the simulation down.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use rand::Rng;

use super::difficulty::{collectible_spacing, collectible_target, powerup_target, progress_factor};
use super::slots::{ITEM_SLOTS, LaneSlot, OBSTACLE_SLOTS, ZoneSet, pick_free_slot};
use super::state::{
    CometParticle, ObjectKind, ObjectTag, RotationAxis, RotationSpec, WorldObject, WorldState,
};
use crate::consts::*;
use crate::render::{HandleFactory, TemplateKind};

fn report_missing(flag: &mut bool, what: &str) {
    if !*flag {
        log::error!("{what} template unavailable - category skipped for this session");
        *flag = true;
    }
}

fn random_axis<R: Rng>(rng: &mut R) -> RotationAxis {
    match rng.random_range(0..3) {
        0 => RotationAxis::X,
        1 => RotationAxis::Y,
        _ => RotationAxis::Z,
    }
}

/// Build the default lane grid: `grid_size` enemies over the ten fixed slots,
/// staggered in depth, all facing the player. Collectibles and power-ups are
/// (re)stocked in the same call, then the grid grows for the next build.
pub fn build_grid(state: &mut WorldState, factory: &mut dyn HandleFactory, now_ms: u64) {
    state.modes.mode_began = true;

    for i in 0..state.grid_size {
        let Some(handle) = factory.create(TemplateKind::Enemy) else {
            report_missing(&mut state.reports.obstacles, "enemy");
            break;
        };
        let slot = OBSTACLE_SLOTS[i as usize % OBSTACLE_SLOTS.len()];
        state.obstacles.push(WorldObject {
            tag: ObjectTag::Enemy,
            position: Vec3::new(slot.x, slot.y, FIELD_ENTRY_Z - i as f32 * GRID_SPACING),
            rotation: Vec3::new(0.0, PI, 0.0), // face the player
            scale: Vec3::splat(ENEMY_SCALE),
            visible: true,
            spin: RotationSpec {
                speed: 0.05,
                axis: RotationAxis::X,
            },
            handle,
            trail: Vec::new(),
        });
    }

    state.grid_size += state.tuning.obstacle_growth;

    spawn_collectibles(state, factory, now_ms);
    spawn_powerups(state, factory, now_ms);
}

/// Build the comet-trail obstacle set: fast asteroids dragging ten shrinking
/// trail particles each. The fleet grows by one with probability 1/2 after
/// each build.
pub fn build_comet_trail(state: &mut WorldState, factory: &mut dyn HandleFactory) {
    state.modes.mode_began = true;

    let fleet = state.comet_fleet;
    let mut trail_reported = false;
    for i in 0..fleet {
        let Some(handle) = factory.create(TemplateKind::Comet) else {
            report_missing(&mut state.reports.obstacles, "comet");
            break;
        };

        let lane = state.rng.random_range(0..3) as f32;
        let x = -1000.0 + 1000.0 * lane;
        let y = if state.rng.random_bool(0.5) { 375.0 } else { 1500.0 };
        let z = FIELD_ENTRY_Z
            - i as f32 * (-FIELD_ENTRY_Z / fleet as f32)
            - state.rng.random::<f32>() * 1000.0;
        let scale = Vec3::new(
            state.rng.random::<f32>() + 0.75,
            state.rng.random::<f32>() + 0.75,
            state.rng.random::<f32>() + 0.75,
        );
        let spin = RotationSpec {
            speed: state.rng.random::<f32>() - 0.5,
            axis: random_axis(&mut state.rng),
        };

        let mut trail = Vec::with_capacity(COMET_TRAIL_PARTICLES);
        for _ in 0..COMET_TRAIL_PARTICLES {
            let Some(particle_handle) = factory.create(TemplateKind::CometParticle) else {
                if !trail_reported {
                    log::warn!("comet particle template unavailable - comets fly without trails");
                    trail_reported = true;
                }
                break;
            };
            let lag = COMET_TRAIL_GAP + state.rng.random::<f32>() * COMET_TRAIL_SPAN;
            trail.push(CometParticle {
                position: Vec3::new(x, y, z - lag),
                scale: 1.0,
                handle: particle_handle,
            });
        }

        state.obstacles.push(WorldObject {
            tag: ObjectTag::Comet,
            position: Vec3::new(x, y, z),
            rotation: Vec3::ZERO,
            scale,
            visible: true,
            spin,
            handle,
            trail,
        });
    }

    if state.rng.random_bool(0.5) {
        state.comet_fleet += 1;
    }
}

/// Build the planet field: slow orbiting planets high over the off-center
/// lanes, each with a fixed z-tilt decided here and a random spin about Y.
pub fn build_planet_field(state: &mut WorldState, factory: &mut dyn HandleFactory) {
    state.modes.mode_began = true;

    let count = state.tuning.planet_count;
    for i in 0..count {
        let Some(handle) = factory.create(TemplateKind::Planet) else {
            report_missing(&mut state.reports.obstacles, "planet");
            break;
        };

        let x = if state.rng.random_bool(0.5) { -500.0 } else { 500.0 };
        let tilt = if state.rng.random_bool(0.5) { PI / 5.0 } else { -PI / 5.0 };
        state.obstacles.push(WorldObject {
            tag: ObjectTag::Planet,
            position: Vec3::new(x, 1000.0, FIELD_ENTRY_Z - i as f32 * (-FIELD_ENTRY_Z / count as f32)),
            rotation: Vec3::new(0.0, 0.0, tilt),
            scale: Vec3::ONE,
            visible: true,
            spin: RotationSpec {
                speed: state.rng.random::<f32>() - 0.5,
                axis: RotationAxis::Y,
            },
            handle,
            trail: Vec::new(),
        });
    }
}

fn collectible_type<R: Rng>(rng: &mut R) -> (ObjectTag, f32, TemplateKind) {
    if rng.random_bool(0.5) {
        (ObjectTag::Metal, METAL_SCALE, TemplateKind::Metal)
    } else {
        (ObjectTag::Plastic, PLASTIC_SCALE, TemplateKind::Plastic)
    }
}

/// Top the collectible pool up to its difficulty target.
///
/// Incremental: existing collectibles stay where they are and seed the
/// used-zone set so newcomers land in free lanes.
pub fn spawn_collectibles(state: &mut WorldState, factory: &mut dyn HandleFactory, now_ms: u64) {
    let progress = progress_factor(state.session_start_ms, now_ms, &state.tuning);
    let target = collectible_target(progress, &state.tuning) as usize;
    if state.collectibles.len() >= target {
        return;
    }

    log::info!(
        "stocking collectibles {} -> {target} at progress {progress:.2}",
        state.collectibles.len()
    );

    let mut zones = ZoneSet::new();
    for item in &state.collectibles {
        zones.occupy(item.position.x, item.position.y, item.position.z);
    }

    let spacing = collectible_spacing(progress);
    for i in state.collectibles.len()..target {
        let (tag, scale, template) = collectible_type(&mut state.rng);
        let Some(handle) = factory.create(template) else {
            report_missing(&mut state.reports.collectibles, "collectible");
            return;
        };

        let (slot, z) = pick_free_slot(&mut state.rng, &ITEM_SLOTS, &mut zones, |rng| {
            COLLECTIBLE_BASE_Z - i as f32 * spacing - rng.random::<f32>() * 3000.0
        });
        state.collectibles.push(WorldObject {
            tag,
            position: Vec3::new(slot.x, slot.y, z),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(scale),
            visible: true,
            spin: RotationSpec {
                speed: 0.05,
                axis: RotationAxis::Y,
            },
            handle,
            trail: Vec::new(),
        });
    }
}

/// Clear and regenerate the power-up pool at its difficulty target.
///
/// Unlike collectibles this is batch regeneration: the wide spacing only
/// holds if the whole set is laid out together.
pub fn spawn_powerups(state: &mut WorldState, factory: &mut dyn HandleFactory, now_ms: u64) {
    state.clear_pool(ObjectKind::PowerUp, factory);

    let progress = progress_factor(state.session_start_ms, now_ms, &state.tuning);
    let target = powerup_target(progress, &state.tuning);

    log::info!("stocking {target} power-ups at progress {progress:.2}");

    let mut zones = ZoneSet::new();
    for i in 0..target {
        let Some(handle) = factory.create(TemplateKind::Boot) else {
            report_missing(&mut state.reports.powerups, "power-up");
            return;
        };

        let (slot, z) = pick_free_slot(&mut state.rng, &ITEM_SLOTS, &mut zones, |rng| {
            let spacing = 10000.0 + rng.random::<f32>() * 5000.0;
            POWERUP_BASE_Z - i as f32 * spacing - rng.random::<f32>() * 5000.0
        });
        state.powerups.push(WorldObject {
            tag: ObjectTag::Boot,
            position: Vec3::new(slot.x, slot.y, z),
            // Carried-object orientation: flat side down, facing the player
            rotation: Vec3::new(FRAC_PI_2, PI, 0.0),
            scale: Vec3::splat(BOOT_SCALE),
            visible: true,
            spin: RotationSpec {
                speed: 0.05,
                axis: RotationAxis::Y,
            },
            handle,
            trail: Vec::new(),
        });
    }
}

/// Per-tick replenishment: keeps live counts tracking the difficulty targets
/// without ever driving a category to zero.
pub fn replenish(state: &mut WorldState, factory: &mut dyn HandleFactory, now_ms: u64) {
    let progress = progress_factor(state.session_start_ms, now_ms, &state.tuning);

    let ct = collectible_target(progress, &state.tuning) as usize;
    if state.collectibles.len() < ct {
        spawn_collectibles(state, factory, now_ms);
    }

    let pt = powerup_target(progress, &state.tuning);
    let low_water = pt.saturating_sub(1).max(state.tuning.min_powerups) as usize;
    if state.powerups.len() < low_water {
        spawn_powerups(state, factory, now_ms);
    }
}

/// Send a scrolled-out collectible back down the corridor with a fresh slot
/// and a fresh 50/50 type draw.
pub fn recycle_collectible(
    state: &mut WorldState,
    index: usize,
    factory: &mut dyn HandleFactory,
    now_ms: u64,
) {
    if index >= state.collectibles.len() {
        log::error!("recycle_collectible: index {index} out of bounds");
        return;
    }

    let progress = progress_factor(state.session_start_ms, now_ms, &state.tuning);
    let mut zones = ZoneSet::new();
    for (j, item) in state.collectibles.iter().enumerate() {
        if j != index {
            zones.occupy(item.position.x, item.position.y, item.position.z);
        }
    }

    let (slot, z) = pick_free_slot(&mut state.rng, &ITEM_SLOTS, &mut zones, |rng| {
        COLLECTIBLE_RECYCLE_BASE_Z - rng.random::<f32>() * 15000.0 - progress * 5000.0
    });
    let (tag, scale, template) = collectible_type(&mut state.rng);

    // On a type change the old mesh is wrong; swap the handle out with it.
    if tag != state.collectibles[index].tag {
        if let Some(handle) = factory.create(template) {
            let item = &mut state.collectibles[index];
            factory.release(item.handle);
            item.tag = tag;
            item.scale = Vec3::splat(scale);
            item.handle = handle;
        }
    }

    let item = &mut state.collectibles[index];
    item.position = Vec3::new(slot.x, slot.y, z);
    item.visible = true;
}

/// Send a consumed or scrolled-out power-up back down the corridor.
pub fn recycle_powerup(state: &mut WorldState, index: usize, now_ms: u64) {
    if index >= state.powerups.len() {
        log::error!("recycle_powerup: index {index} out of bounds");
        return;
    }

    let progress = progress_factor(state.session_start_ms, now_ms, &state.tuning);
    let mut zones = ZoneSet::new();
    for (j, item) in state.powerups.iter().enumerate() {
        if j != index {
            zones.occupy(item.position.x, item.position.y, item.position.z);
        }
    }

    let (slot, z) = pick_free_slot(&mut state.rng, &ITEM_SLOTS, &mut zones, |rng| {
        POWERUP_RECYCLE_BASE_Z - rng.random::<f32>() * 10000.0 - progress * 5000.0
    });

    let item = &mut state.powerups[index];
    item.position = Vec3::new(slot.x, slot.y, z);
    item.rotation = Vec3::new(FRAC_PI_2, PI, 0.0);
    item.visible = true;
}

/// Slot an obstacle is reset to when it recycles in grid or comet mode.
pub(crate) fn grid_reset_slot(index: usize) -> LaneSlot {
    OBSTACLE_SLOTS[index % OBSTACLE_SLOTS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderHandle, SequentialFactory};
    use crate::tuning::Tuning;

    fn fresh_state() -> WorldState {
        WorldState::new(42, Tuning::default(), 0)
    }

    #[test]
    fn test_initial_grid_is_ten_enemies_on_fixed_slots() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        build_grid(&mut state, &mut factory, 0);

        assert_eq!(state.obstacles.len(), 10);
        for (i, obstacle) in state.obstacles.iter().enumerate() {
            assert_eq!(obstacle.tag, ObjectTag::Enemy);
            let slot = OBSTACLE_SLOTS[i % OBSTACLE_SLOTS.len()];
            assert_eq!(obstacle.position.x, slot.x);
            assert_eq!(obstacle.position.y, slot.y);
            assert_eq!(obstacle.position.z, FIELD_ENTRY_Z - i as f32 * GRID_SPACING);
            assert!((obstacle.rotation.y - PI).abs() < 1e-6);
        }
        // At progress 0: 5 collectibles, ceil(5/2) = 3 power-ups.
        assert_eq!(state.collectibles.len(), 5);
        assert_eq!(state.powerups.len(), 3);
        // Next build grows by two.
        assert_eq!(state.grid_size, 12);
    }

    #[test]
    fn test_grid_at_full_difficulty_hits_ceilings() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        // Two minutes in: ramp saturated.
        build_grid(&mut state, &mut factory, 120_000);
        assert_eq!(state.collectibles.len(), 20);
        assert_eq!(state.powerups.len(), 10);
    }

    #[test]
    fn test_collectible_spawn_is_incremental() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        spawn_collectibles(&mut state, &mut factory, 0);
        let first: Vec<RenderHandle> = state.collectibles.iter().map(|c| c.handle).collect();

        // Mid-ramp the target rises; old objects stay put.
        spawn_collectibles(&mut state, &mut factory, 60_000);
        assert!(state.collectibles.len() > first.len());
        for (c, h) in state.collectibles.iter().zip(&first) {
            assert_eq!(c.handle, *h);
        }
    }

    #[test]
    fn test_powerup_spawn_regenerates_from_scratch() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        spawn_powerups(&mut state, &mut factory, 0);
        let first: Vec<RenderHandle> = state.powerups.iter().map(|p| p.handle).collect();

        spawn_powerups(&mut state, &mut factory, 0);
        assert_eq!(state.powerups.len(), first.len());
        for p in &state.powerups {
            assert!(!first.contains(&p.handle), "power-ups must be rebuilt, not reused");
        }
    }

    #[test]
    fn test_missing_template_skips_category_only() {
        struct NoEnemies(SequentialFactory);
        impl HandleFactory for NoEnemies {
            fn create(&mut self, template: TemplateKind) -> Option<RenderHandle> {
                if template == TemplateKind::Enemy {
                    None
                } else {
                    self.0.create(template)
                }
            }
        }

        let mut state = fresh_state();
        let mut factory = NoEnemies(SequentialFactory::default());
        build_grid(&mut state, &mut factory, 0);

        assert!(state.obstacles.is_empty());
        // Other categories are unaffected.
        assert_eq!(state.collectibles.len(), 5);
        assert_eq!(state.powerups.len(), 3);
        assert!(state.reports.obstacles);
    }

    #[test]
    fn test_comet_build_attaches_trails() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        build_comet_trail(&mut state, &mut factory);

        assert_eq!(state.obstacles.len(), 5);
        for comet in &state.obstacles {
            assert_eq!(comet.tag, ObjectTag::Comet);
            assert!(
                [-1000.0, 0.0, 1000.0].contains(&comet.position.x),
                "comet lane {} off the corridor",
                comet.position.x
            );
            assert!(comet.position.y == 375.0 || comet.position.y == 1500.0);
            assert_eq!(comet.trail.len(), COMET_TRAIL_PARTICLES);
            for particle in &comet.trail {
                let lag = comet.position.z - particle.position.z;
                assert!(lag >= COMET_TRAIL_GAP && lag <= COMET_TRAIL_GAP + COMET_TRAIL_SPAN);
                assert_eq!(particle.position.x, comet.position.x);
            }
        }
        assert!(state.mode_began());
    }

    #[test]
    fn test_planet_build_tilts_and_spins_about_y() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        build_planet_field(&mut state, &mut factory);

        assert_eq!(state.obstacles.len(), 5);
        for planet in &state.obstacles {
            assert_eq!(planet.tag, ObjectTag::Planet);
            assert_eq!(planet.position.y, 1000.0);
            assert!((planet.rotation.z.abs() - PI / 5.0).abs() < 1e-6);
            assert_eq!(planet.spin.axis, RotationAxis::Y);
        }
    }

    #[test]
    fn test_replenish_tops_up_after_consumption() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        build_grid(&mut state, &mut factory, 0);

        // Consume three collectibles outright.
        for _ in 0..3 {
            state.remove_object(ObjectKind::Collectible, 0, &mut factory);
        }
        replenish(&mut state, &mut factory, 0);
        assert_eq!(state.collectibles.len(), 5);

        // Power-ups only regenerate below max(2, target - 1) = 2.
        state.remove_object(ObjectKind::PowerUp, 0, &mut factory);
        replenish(&mut state, &mut factory, 0);
        assert_eq!(state.powerups.len(), 2, "one loss stays below the trigger");
        state.remove_object(ObjectKind::PowerUp, 0, &mut factory);
        replenish(&mut state, &mut factory, 0);
        assert_eq!(state.powerups.len(), 3, "second loss triggers regeneration");
    }

    #[test]
    fn test_recycle_collectible_rewinds_depth() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        spawn_collectibles(&mut state, &mut factory, 0);

        state.collectibles[0].position.z = 6000.0;
        state.collectibles[0].visible = false;
        recycle_collectible(&mut state, 0, &mut factory, 0);

        let item = &state.collectibles[0];
        assert!(item.visible);
        assert!(item.position.z <= COLLECTIBLE_RECYCLE_BASE_Z);
        assert!(ITEM_SLOTS.iter().any(|s| s.x == item.position.x && s.y == item.position.y));
    }

    #[test]
    fn test_recycle_powerup_out_of_bounds_is_noop() {
        let mut state = fresh_state();
        let mut factory = SequentialFactory::default();
        spawn_powerups(&mut state, &mut factory, 0);
        let snapshot: Vec<Vec3> = state.powerups.iter().map(|p| p.position).collect();

        recycle_powerup(&mut state, 99, 0);
        for (p, s) in state.powerups.iter().zip(&snapshot) {
            assert_eq!(p.position, *s);
        }
    }
}
