//! Scrap Run - world-simulation core for an endless 3D lane runner
//!
//! Core modules:
//! - `sim`: field state, spawning, motion, level modes, collision classification
//! - `render`: opaque-handle seam between the simulation and the presentation layer
//! - `tuning`: data-driven gameplay knobs
//!
//! The crate is headless: it owns plain positions, tags, and visibility flags
//! behind stable handles, and a renderer reads those once per frame. Nothing in
//! here touches a scene graph, the DOM, or an audio device.

pub mod render;
pub mod sim;
pub mod tuning;

pub use render::{HandleFactory, RenderHandle, TemplateKind};
pub use sim::{Contact, PlayerProbe, TickInput, WorldState};
pub use tuning::Tuning;

/// Fixed gameplay constants
///
/// Geometry and ranges that define the corridor. Session-level knobs a host
/// may want to rebalance (timers, counts, the difficulty ramp) live in
/// [`tuning::Tuning`] instead.
pub mod consts {
    /// Fallback forward increment per tick when the player is stalled (speed <= 0)
    pub const STALL_SPEED: f32 = 100.0;
    /// Comet-trail obstacles outrun the player by this factor
    pub const COMET_SPEED_FACTOR: f32 = 2.5;
    /// Stall fallback for comet-trail obstacles
    pub const COMET_STALL_SPEED: f32 = 250.0;

    /// Obstacles and collectibles recycle once they scroll past this z
    pub const FIELD_RECYCLE_Z: f32 = 5000.0;
    /// Power-ups recycle earlier; their bob offset would otherwise keep them in view
    pub const POWERUP_RECYCLE_Z: f32 = 500.0;

    /// Depth at which grid obstacles (and mode sets) enter the corridor
    pub const FIELD_ENTRY_Z: f32 = -50000.0;
    /// Depth stagger between consecutive grid obstacles
    pub const GRID_SPACING: f32 = 5000.0;
    /// First collectible depth
    pub const COLLECTIBLE_BASE_Z: f32 = -15000.0;
    /// First power-up depth; deeper than collectibles so they read as rarer
    pub const POWERUP_BASE_Z: f32 = -20000.0;
    /// Re-entry depth for a recycled collectible
    pub const COLLECTIBLE_RECYCLE_BASE_Z: f32 = -35000.0;
    /// Re-entry depth for a recycled power-up
    pub const POWERUP_RECYCLE_BASE_Z: f32 = -30000.0;
    /// Distance obstacles are shoved back when the host ends a run
    pub const PUSH_BACK_UNITS: f32 = 55000.0;

    /// Uniform scales per template
    pub const ENEMY_SCALE: f32 = 150.0;
    pub const METAL_SCALE: f32 = 175.0;
    pub const PLASTIC_SCALE: f32 = 50.0;
    pub const BOOT_SCALE: f32 = 50.0;

    /// Collision bounding radii per template (mesh geometry is opaque here)
    pub const ENEMY_BOUNDS: f32 = 300.0;
    pub const COMET_BOUNDS: f32 = 300.0;
    pub const PLANET_BOUNDS: f32 = 400.0;
    pub const METAL_BOUNDS: f32 = 200.0;
    pub const PLASTIC_BOUNDS: f32 = 150.0;
    pub const BOOT_BOUNDS: f32 = 150.0;

    /// Comet trail: particle count, max trail span, and the head gap
    pub const COMET_TRAIL_PARTICLES: usize = 10;
    pub const COMET_TRAIL_SPAN: f32 = 7500.0;
    pub const COMET_TRAIL_GAP: f32 = 500.0;

    /// Slot search gives up after this many zone-collision retries
    pub const SLOT_RETRY_LIMIT: u32 = 10;
    /// Depth rounding used for the used-position zone keys
    pub const ZONE_SIZE: f32 = 1000.0;

    /// Obstacle ray length (forward/left/right/diagonal bundle)
    pub const OBSTACLE_RAY_RANGE: f32 = 350.0;
    /// Pickup ray length (the wide 22-direction bundle)
    pub const PICKUP_RAY_RANGE: f32 = 300.0;
    /// Radius of the spherical fallback around the player
    pub const PICKUP_SPHERE_RANGE: f32 = 400.0;
}
