//! Per-frame simulation tick
//!
//! Fixed order per tick: mode-timer check, motion + recycling, rotation,
//! drain-then-refill mode turnover, replenishment. Collision classification
//! is a separate call ([`super::collision::check`]) because it needs
//! post-motion positions and the host decides what a contact means.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use rand::Rng;

use super::modes::check_mode_change;
use super::spawn::{
    build_comet_trail, build_grid, build_planet_field, grid_reset_slot, recycle_collectible,
    recycle_powerup, replenish,
};
use super::state::{Mode, ObjectKind, ObjectTag, RotationAxis, WorldState};
use crate::consts::*;
use crate::render::HandleFactory;

/// Host inputs for a single tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Player forward speed in corridor units per tick
    pub player_speed: f32,
    /// Monotonic session clock, milliseconds
    pub now_ms: u64,
}

/// Advance the whole field by one frame.
pub fn tick(state: &mut WorldState, factory: &mut dyn HandleFactory, input: &TickInput) {
    check_mode_change(
        &mut state.modes,
        &mut state.rng,
        input.now_ms / 1000,
        &state.tuning,
    );

    move_obstacles(state, factory, input);
    move_collectibles(state, factory, input);
    move_powerups(state, input);
    rotate_objects(state, input);

    // Drain-then-refill: only once the old mode's obstacles have all scrolled
    // out does the newly selected mode build its set.
    if state.obstacles.is_empty() && !state.modes.mode_began {
        match state.modes.mode {
            Mode::Default => build_grid(state, factory, input.now_ms),
            Mode::Planet => build_planet_field(state, factory),
            Mode::CometTrail => build_comet_trail(state, factory),
        }
    }

    replenish(state, factory, input.now_ms);
}

/// True while comet-trail movement rules apply: the mode is live, or its
/// obstacles are still draining out.
fn comet_rules_active(state: &WorldState) -> bool {
    let m = &state.modes;
    (m.mode == Mode::CometTrail && m.mode_began)
        || (!m.mode_began && m.last_mode == Mode::CometTrail)
}

fn move_obstacles(state: &mut WorldState, factory: &mut dyn HandleFactory, input: &TickInput) {
    let comet_active = comet_rules_active(state);
    let speed = input.player_speed;

    let mut i = 0;
    while i < state.obstacles.len() {
        {
            let obstacle = &mut state.obstacles[i];

            if comet_active {
                obstacle.position.z += if speed > 0.0 {
                    COMET_SPEED_FACTOR * speed
                } else {
                    COMET_STALL_SPEED
                };

                // Trail particles move at player speed, so they fall behind
                // the head until the span snaps them forward again.
                let head_z = obstacle.position.z;
                for particle in &mut obstacle.trail {
                    particle.position.z += if speed > 0.0 { speed } else { STALL_SPEED };
                    if particle.position.z < head_z - COMET_TRAIL_SPAN
                        || particle.position.z > head_z
                    {
                        particle.position.z = head_z;
                    }
                    particle.scale = 1.0 - (head_z - particle.position.z) / COMET_TRAIL_SPAN;
                }
            } else {
                obstacle.position.z += if speed > 0.0 { speed } else { STALL_SPEED };
            }
        }

        if state.obstacles[i].position.z > FIELD_RECYCLE_Z {
            let began = state.modes.mode_began;
            match state.modes.mode {
                // Grid and comet obstacles rewind to their staggered entry slot.
                Mode::Default | Mode::CometTrail if began => {
                    let slot = grid_reset_slot(i);
                    let entry_z = FIELD_ENTRY_Z - i as f32 * GRID_SPACING;
                    let obstacle = &mut state.obstacles[i];
                    obstacle.position = Vec3::new(slot.x, slot.y, entry_z);
                    obstacle.visible = true;

                    if state.modes.mode == Mode::CometTrail {
                        let head = obstacle.position;
                        for particle in &mut obstacle.trail {
                            particle.position.x = head.x;
                            particle.position.y = head.y;
                            particle.position.z = head.z
                                - COMET_TRAIL_GAP
                                - state.rng.random::<f32>() * COMET_TRAIL_SPAN;
                        }
                    }
                }
                // Planets loop a full corridor length back, re-rolling the lane.
                Mode::Planet if began => {
                    let flip = state.rng.random_bool(0.5);
                    let obstacle = &mut state.obstacles[i];
                    if obstacle.position.x != 0.0 {
                        obstacle.position.x = if flip { -500.0 } else { 500.0 };
                    }
                    obstacle.position.y = 1000.0;
                    obstacle.position.z += FIELD_ENTRY_Z;
                }
                // Teardown pending: drain one object (and its trail) per pass.
                _ => {
                    state.remove_object(ObjectKind::Obstacle, i, factory);
                    continue;
                }
            }
        }

        i += 1;
    }
}

fn move_collectibles(state: &mut WorldState, factory: &mut dyn HandleFactory, input: &TickInput) {
    let dz = if input.player_speed > 0.0 {
        input.player_speed
    } else {
        STALL_SPEED
    };

    let mut recycle = Vec::new();
    for (i, item) in state.collectibles.iter_mut().enumerate() {
        item.position.z += dz;
        if item.position.z > FIELD_RECYCLE_Z {
            recycle.push(i);
        }
    }
    for i in recycle {
        recycle_collectible(state, i, factory, input.now_ms);
    }
}

fn move_powerups(state: &mut WorldState, input: &TickInput) {
    let dz = if input.player_speed > 0.0 {
        input.player_speed
    } else {
        STALL_SPEED
    };
    let bob = (input.now_ms as f32 * 0.003).sin() * 0.5;

    let mut recycle = Vec::new();
    for (i, item) in state.powerups.iter_mut().enumerate() {
        item.position.z += dz;
        item.position.y += bob;
        if item.position.z > POWERUP_RECYCLE_Z {
            recycle.push(i);
        }
    }
    for i in recycle {
        recycle_powerup(state, i, input.now_ms);
    }
}

fn rotate_objects(state: &mut WorldState, input: &TickInput) {
    let m = &state.modes;
    // Grid/comet spin applies while those modes run and while any old set
    // drains ahead of an incoming challenge.
    let standard_spin = ((m.mode == Mode::Default || m.mode == Mode::CometTrail) && m.mode_began)
        || ((m.mode == Mode::Planet || m.mode == Mode::CometTrail) && !m.mode_began);
    let planet_spin = (m.mode == Mode::Planet && m.mode_began)
        || (m.last_mode == Mode::Planet && m.mode == Mode::Default && !m.mode_began);

    let t_secs = input.now_ms as f32 / 1000.0;

    for obstacle in &mut state.obstacles {
        if standard_spin {
            if obstacle.tag == ObjectTag::Enemy {
                // Enemies stay locked facing the player with a slight wobble.
                obstacle.rotation.y = PI;
                obstacle.rotation.x += 0.01 * (input.now_ms as f32 * 0.001).sin();
            } else {
                let step = obstacle.spin.speed / 10.0;
                match obstacle.spin.axis {
                    RotationAxis::X => obstacle.rotation.x += step,
                    RotationAxis::Y => obstacle.rotation.y += step,
                    RotationAxis::Z => obstacle.rotation.z += step,
                }
            }
        } else if planet_spin {
            obstacle.rotation.y += obstacle.spin.speed / 10.0;
        }
    }

    // Coin spin: collectibles turn about Y only, other axes pinned flat.
    for item in &mut state.collectibles {
        item.rotation.y += 0.02;
        item.rotation.x = 0.0;
        item.rotation.z = 0.0;
    }

    // Power-ups hold their carried-object orientation and sway around it
    // instead of spinning freely.
    for item in &mut state.powerups {
        item.rotation.y = PI + (t_secs * 1.5).sin() * 0.1;
        item.rotation.x = FRAC_PI_2;
        item.rotation.z = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SequentialFactory;
    use crate::sim::state::ModeState;
    use crate::tuning::Tuning;

    fn grid_world() -> (WorldState, SequentialFactory) {
        let mut state = WorldState::new(17, Tuning::default(), 0);
        let mut factory = SequentialFactory::default();
        build_grid(&mut state, &mut factory, 0);
        (state, factory)
    }

    #[test]
    fn test_fresh_session_builds_grid_on_first_tick() {
        let mut state = WorldState::new(8, Tuning::default(), 0);
        let mut factory = SequentialFactory::default();
        assert!(state.obstacles.is_empty());

        tick(&mut state, &mut factory, &TickInput { player_speed: 100.0, now_ms: 16 });

        assert!(state.mode_began());
        assert_eq!(state.obstacles.len(), 10);
        assert!(state.obstacles.iter().all(|o| o.tag == ObjectTag::Enemy));
        assert!(!state.collectibles.is_empty());
        assert!(!state.powerups.is_empty());
    }

    #[test]
    fn test_reset_restocks_on_next_tick() {
        let (mut state, mut factory) = grid_world();
        state.reset(&mut factory, 50_000);
        assert!(state.obstacles.is_empty());

        tick(&mut state, &mut factory, &TickInput { player_speed: 100.0, now_ms: 50_016 });
        assert!(!state.obstacles.is_empty());
        assert_eq!(state.current_mode(), Mode::Default);
    }

    #[test]
    fn test_motion_advances_every_object_by_player_speed() {
        let (mut state, mut factory) = grid_world();
        let obstacle_z: Vec<f32> = state.obstacles.iter().map(|o| o.position.z).collect();
        let item_z: Vec<f32> = state.collectibles.iter().map(|c| c.position.z).collect();

        tick(&mut state, &mut factory, &TickInput { player_speed: 120.0, now_ms: 16 });

        for (o, z) in state.obstacles.iter().zip(&obstacle_z) {
            assert_eq!(o.position.z, z + 120.0);
        }
        for (c, z) in state.collectibles.iter().zip(&item_z) {
            assert_eq!(c.position.z, z + 120.0);
        }
    }

    #[test]
    fn test_stalled_player_still_scrolls_the_field() {
        let (mut state, mut factory) = grid_world();
        let before = state.obstacles[0].position.z;

        tick(&mut state, &mut factory, &TickInput { player_speed: 0.0, now_ms: 16 });
        assert_eq!(state.obstacles[0].position.z, before + STALL_SPEED);
    }

    #[test]
    fn test_grid_obstacle_recycles_to_entry_slot() {
        let (mut state, mut factory) = grid_world();
        state.obstacles[3].position.z = FIELD_RECYCLE_Z - 1.0;
        state.obstacles[3].visible = false;

        tick(&mut state, &mut factory, &TickInput { player_speed: 50.0, now_ms: 16 });

        let o = &state.obstacles[3];
        assert!(o.visible, "recycled obstacles come back visible");
        assert_eq!(o.position.z, FIELD_ENTRY_Z - 3.0 * GRID_SPACING);
        let slot = grid_reset_slot(3);
        assert_eq!(o.position.x, slot.x);
        assert_eq!(o.position.y, slot.y);
    }

    #[test]
    fn test_recycle_is_idempotent_across_ticks() {
        let (mut state, mut factory) = grid_world();
        state.obstacles[0].position.z = FIELD_RECYCLE_Z - 1.0;

        tick(&mut state, &mut factory, &TickInput { player_speed: 50.0, now_ms: 16 });
        let recycled_z = state.obstacles[0].position.z;
        assert!(recycled_z < 0.0);

        // The next tick only moves it forward one step; no second rewind.
        tick(&mut state, &mut factory, &TickInput { player_speed: 50.0, now_ms: 32 });
        assert_eq!(state.obstacles[0].position.z, recycled_z + 50.0);
    }

    #[test]
    fn test_planet_recycle_wraps_a_corridor_length() {
        let mut state = WorldState::new(5, Tuning::default(), 0);
        let mut factory = SequentialFactory::default();
        build_planet_field(&mut state, &mut factory);
        state.modes.mode = Mode::Planet;
        state.modes.mode_began = true;

        state.obstacles[0].position.z = FIELD_RECYCLE_Z - 1.0;
        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 16 });

        let planet = &state.obstacles[0];
        assert!(planet.position.z < FIELD_ENTRY_Z + FIELD_RECYCLE_Z + 100.0);
        assert_eq!(planet.position.y, 1000.0);
        assert!(planet.position.x == -500.0 || planet.position.x == 500.0);
    }

    #[test]
    fn test_comet_trail_lags_within_span() {
        let mut state = WorldState::new(23, Tuning::default(), 0);
        let mut factory = SequentialFactory::default();
        build_comet_trail(&mut state, &mut factory);
        state.modes.mode = Mode::CometTrail;
        state.modes.mode_began = true;

        for frame in 1..=200u64 {
            tick(&mut state, &mut factory, &TickInput { player_speed: 80.0, now_ms: frame * 16 });
        }

        for comet in &state.obstacles {
            for particle in &comet.trail {
                let lag = comet.position.z - particle.position.z;
                assert!((0.0..=COMET_TRAIL_SPAN).contains(&lag), "trail lag {lag} out of span");
                assert!((0.0..=1.0).contains(&particle.scale));
            }
        }
    }

    #[test]
    fn test_comet_obstacles_outrun_the_player() {
        let mut state = WorldState::new(23, Tuning::default(), 0);
        let mut factory = SequentialFactory::default();
        build_comet_trail(&mut state, &mut factory);
        state.modes.mode = Mode::CometTrail;
        state.modes.mode_began = true;

        let before = state.obstacles[0].position.z;
        tick(&mut state, &mut factory, &TickInput { player_speed: 100.0, now_ms: 16 });
        assert_eq!(state.obstacles[0].position.z, before + 250.0);
    }

    #[test]
    fn test_drain_then_refill_mode_turnover() {
        let (mut state, mut factory) = grid_world();

        // A challenge was drawn; the old grid must drain first.
        state.modes = ModeState {
            mode: Mode::CometTrail,
            last_mode: Mode::Default,
            mode_began: false,
            last_change_s: 0,
        };

        // Nothing has scrolled out yet: pool keeps its grid obstacles.
        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 16 });
        assert!(!state.mode_began());
        assert!(state.obstacles.iter().all(|o| o.tag == ObjectTag::Enemy));

        // Push the whole grid past the player: everything drains, and the
        // comet set appears in the same pass.
        for o in &mut state.obstacles {
            o.position.z = FIELD_RECYCLE_Z + 1.0;
        }
        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 32 });
        assert!(state.mode_began());
        assert!(!state.obstacles.is_empty());
        assert!(state.obstacles.iter().all(|o| o.tag == ObjectTag::Comet));
    }

    #[test]
    fn test_mode_timer_draws_challenge_during_tick() {
        let (mut state, mut factory) = grid_world();
        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 40_000 });
        assert_ne!(state.current_mode(), Mode::Default);
        assert!(!state.mode_began());
        // Old grid obstacles are still on the field, pending drain.
        assert!(state.obstacles.iter().all(|o| o.tag == ObjectTag::Enemy));
    }

    #[test]
    fn test_enemy_faces_player_with_wobble() {
        let (mut state, mut factory) = grid_world();
        state.obstacles[0].rotation.y = 0.0;

        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 700 });
        assert_eq!(state.obstacles[0].rotation.y, PI);
        assert!(state.obstacles[0].rotation.x.abs() > 0.0);
    }

    #[test]
    fn test_collectible_coin_spin_pins_other_axes() {
        let (mut state, mut factory) = grid_world();
        state.collectibles[0].rotation.x = 1.0;

        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 16 });
        let c = &state.collectibles[0];
        assert_eq!(c.rotation.x, 0.0);
        assert_eq!(c.rotation.z, 0.0);
        assert!(c.rotation.y > 0.0);
    }

    #[test]
    fn test_powerup_oscillates_and_bobs() {
        let (mut state, mut factory) = grid_world();
        let y0 = state.powerups[0].position.y;

        tick(&mut state, &mut factory, &TickInput { player_speed: 10.0, now_ms: 700 });
        let p = &state.powerups[0];
        assert!((p.rotation.y - PI).abs() <= 0.1 + 1e-6);
        assert_eq!(p.rotation.x, FRAC_PI_2);
        assert_ne!(p.position.y, y0);
    }

    #[test]
    fn test_powerup_recycles_at_tight_threshold() {
        let (mut state, mut factory) = grid_world();
        state.powerups[0].position.z = POWERUP_RECYCLE_Z - 1.0;

        tick(&mut state, &mut factory, &TickInput { player_speed: 50.0, now_ms: 16 });
        assert!(state.powerups[0].position.z <= POWERUP_RECYCLE_BASE_Z);
        assert!(state.powerups[0].visible);
    }
}
