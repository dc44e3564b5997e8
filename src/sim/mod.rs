//! Deterministic world simulation
//!
//! Everything the run needs to exist as data: the pooled field objects, the
//! difficulty ramp, the mode state machine, per-tick motion, and contact
//! classification. The simulation is seedable and free of wall-clock reads;
//! the host feeds it timestamps through [`TickInput`] and [`check_mode_change`]
//! never looks at anything else.
//!
//! A host drives it with two calls per frame:
//! [`WorldState::on_tick`] to advance the field, then
//! [`WorldState::on_collision_check`] to learn what the player ran into.

pub mod collision;
pub mod difficulty;
pub mod modes;
pub mod slots;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Contact, PlayerProbe};
pub use modes::check_mode_change;
pub use state::{
    CollectibleKind, CometParticle, Mode, ModeState, ObjectKind, ObjectTag, PowerUpKind,
    RotationAxis, RotationSpec, WorldEvent, WorldObject, WorldState,
};
pub use tick::{TickInput, tick};

use crate::render::HandleFactory;

impl WorldState {
    /// Advance the whole field by one frame.
    pub fn on_tick(&mut self, factory: &mut dyn HandleFactory, input: &TickInput) {
        tick(self, factory, input);
    }

    /// Classify player contact for this frame. Call after [`on_tick`].
    ///
    /// [`on_tick`]: WorldState::on_tick
    pub fn on_collision_check(&mut self, probe: &PlayerProbe) -> Contact {
        collision::check(self, probe)
    }
}
