//! World state and core simulation types
//!
//! Everything the field owns lives here: the three object pools, the mode
//! machine, the difficulty clock, and the seeded RNG. Objects carry their
//! rotation descriptor and trail particles inline, so a removal can never
//! leave a stale entry behind in a parallel array.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::render::{HandleFactory, RenderHandle, TemplateKind};
use crate::tuning::Tuning;

/// Object category; each category has its own pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Obstacle,
    Collectible,
    PowerUp,
}

/// Closed tag set, decided once at spawn time so the collision path never
/// has to classify by name or template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectTag {
    /// Patrol-drone enemy of the default grid
    Enemy,
    /// Comet-trail head
    Comet,
    /// Planet-field obstacle
    Planet,
    Metal,
    Plastic,
    Boot,
}

impl ObjectTag {
    pub fn kind(self) -> ObjectKind {
        match self {
            ObjectTag::Enemy | ObjectTag::Comet | ObjectTag::Planet => ObjectKind::Obstacle,
            ObjectTag::Metal | ObjectTag::Plastic => ObjectKind::Collectible,
            ObjectTag::Boot => ObjectKind::PowerUp,
        }
    }

    pub fn template(self) -> TemplateKind {
        match self {
            ObjectTag::Enemy => TemplateKind::Enemy,
            ObjectTag::Comet => TemplateKind::Comet,
            ObjectTag::Planet => TemplateKind::Planet,
            ObjectTag::Metal => TemplateKind::Metal,
            ObjectTag::Plastic => TemplateKind::Plastic,
            ObjectTag::Boot => TemplateKind::Boot,
        }
    }

    /// Bounding radius used by both the ray and sphere collision tests.
    pub fn bounds(self) -> f32 {
        match self {
            ObjectTag::Enemy => ENEMY_BOUNDS,
            ObjectTag::Comet => COMET_BOUNDS,
            ObjectTag::Planet => PLANET_BOUNDS,
            ObjectTag::Metal => METAL_BOUNDS,
            ObjectTag::Plastic => PLASTIC_BOUNDS,
            ObjectTag::Boot => BOOT_BOUNDS,
        }
    }
}

/// Externally visible collectible types. All tag variants collapse to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Metal,
    Plastic,
}

/// Externally visible power-up type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Boot,
}

/// Rotation axis selector for obstacle spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

/// Per-obstacle spin descriptor: `speed / 10` radians per tick about `axis`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotationSpec {
    pub speed: f32,
    pub axis: RotationAxis,
}

/// One flat particle trailing a comet head.
///
/// Owned by exactly one comet for its whole lifetime; removing the comet
/// removes its trail, so no particle can outlive its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CometParticle {
    pub position: Vec3,
    /// Shrinks toward 0 as the particle falls back along the trail span
    pub scale: f32,
    pub handle: RenderHandle,
}

/// One live world object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldObject {
    pub tag: ObjectTag,
    pub position: Vec3,
    /// Euler rotation in radians, applied by the presentation layer as-is
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
    pub spin: RotationSpec,
    pub handle: RenderHandle,
    /// Non-empty only for comet heads
    pub trail: Vec<CometParticle>,
}

impl WorldObject {
    pub fn kind(&self) -> ObjectKind {
        self.tag.kind()
    }

    pub fn bounds(&self) -> f32 {
        self.tag.bounds()
    }
}

/// Level modes, in the id order the HUD expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Default,
    Planet,
    CometTrail,
}

impl Mode {
    pub fn id(self) -> u8 {
        match self {
            Mode::Default => 0,
            Mode::Planet => 1,
            Mode::CometTrail => 2,
        }
    }
}

/// Mode machine state.
///
/// `mode_began == false` means the current mode's obstacle set is not on the
/// field yet: either the previous mode's obstacles are still draining, or the
/// session just started. The tick loop builds the set once the pool is empty,
/// so a fresh state gets its first grid on the first tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: Mode,
    pub last_mode: Mode,
    pub mode_began: bool,
    /// Session-clock second of the last challenge draw
    pub last_change_s: u64,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: Mode::Default,
            last_mode: Mode::Default,
            mode_began: false,
            last_change_s: 0,
        }
    }
}

/// Cosmetic events for the presentation layer, drained once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// An enemy was defeated; burst particles at this position
    Disintegration { position: Vec3 },
}

/// One-shot missing-template reports, so an absent mesh logs once per session
/// instead of once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AssetReports {
    pub obstacles: bool,
    pub collectibles: bool,
    pub powerups: bool,
}

/// Complete field state.
pub struct WorldState {
    /// Run seed, for reproducing a spawn sequence in tests
    pub seed: u64,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,

    pub obstacles: Vec<WorldObject>,
    pub collectibles: Vec<WorldObject>,
    pub powerups: Vec<WorldObject>,

    pub modes: ModeState,
    /// Session-clock millisecond the difficulty ramp started
    pub session_start_ms: u64,

    /// Obstacle count for the next grid build; grows after every full build
    pub(crate) grid_size: u32,
    /// Comet count for the next comet-trail build
    pub(crate) comet_fleet: u32,
    /// Collections the host has accepted this session (achievement tracking)
    pub collected_count: u32,

    pub(crate) events: Vec<WorldEvent>,
    pub(crate) reports: AssetReports,
}

impl WorldState {
    pub fn new(seed: u64, tuning: Tuning, now_ms: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid_size: tuning.initial_obstacles,
            comet_fleet: tuning.comet_fleet_start,
            tuning,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            powerups: Vec::new(),
            modes: ModeState {
                // The session clock need not start at zero.
                last_change_s: now_ms / 1000,
                ..ModeState::default()
            },
            session_start_ms: now_ms,
            collected_count: 0,
            events: Vec::new(),
            reports: AssetReports::default(),
        }
    }

    // --- Pool access -------------------------------------------------------

    pub fn pool(&self, kind: ObjectKind) -> &[WorldObject] {
        match kind {
            ObjectKind::Obstacle => &self.obstacles,
            ObjectKind::Collectible => &self.collectibles,
            ObjectKind::PowerUp => &self.powerups,
        }
    }

    pub(crate) fn pool_mut(&mut self, kind: ObjectKind) -> &mut Vec<WorldObject> {
        match kind {
            ObjectKind::Obstacle => &mut self.obstacles,
            ObjectKind::Collectible => &mut self.collectibles,
            ObjectKind::PowerUp => &mut self.powerups,
        }
    }

    /// Read-only snapshots for the renderer and external collision callers.
    pub fn live_obstacles(&self) -> &[WorldObject] {
        &self.obstacles
    }

    pub fn live_collectibles(&self) -> &[WorldObject] {
        &self.collectibles
    }

    pub fn live_power_ups(&self) -> &[WorldObject] {
        &self.powerups
    }

    /// Remove one object by index, releasing its handle and any trail.
    pub(crate) fn remove_object(
        &mut self,
        kind: ObjectKind,
        index: usize,
        factory: &mut dyn HandleFactory,
    ) {
        let pool = self.pool_mut(kind);
        if index >= pool.len() {
            log::error!("remove_object: index {index} out of bounds for {kind:?}");
            return;
        }
        let object = pool.remove(index);
        for particle in &object.trail {
            factory.release(particle.handle);
        }
        factory.release(object.handle);
    }

    pub(crate) fn clear_pool(&mut self, kind: ObjectKind, factory: &mut dyn HandleFactory) {
        while !self.pool(kind).is_empty() {
            let last = self.pool(kind).len() - 1;
            self.remove_object(kind, last, factory);
        }
    }

    // --- Mode and HUD queries ---------------------------------------------

    pub fn current_mode(&self) -> Mode {
        self.modes.mode
    }

    pub fn previous_mode(&self) -> Mode {
        self.modes.last_mode
    }

    pub fn mode_began(&self) -> bool {
        self.modes.mode_began
    }

    /// Fixed display string for the HUD.
    pub fn current_status_label(&self) -> &'static str {
        "SCRAP RUN ACTIVE"
    }

    // --- Events and bookkeeping -------------------------------------------

    /// Drain cosmetic events queued since the last call.
    pub fn take_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Host calls this when it accepts a `Contact::Collected` result.
    pub fn record_collected(&mut self) -> u32 {
        self.collected_count += 1;
        self.collected_count
    }

    /// Shove every obstacle (and trail) out of view, e.g. when the run ends.
    pub fn push_out_of_view(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.position.z -= PUSH_BACK_UNITS;
            for particle in &mut obstacle.trail {
                particle.position.z -= PUSH_BACK_UNITS;
            }
        }
    }

    /// Full field reset: the one operation that bulk-clears all three pools.
    ///
    /// Leaves no dangling trail particles and restarts the difficulty ramp
    /// and mode machine at session start.
    pub fn reset(&mut self, factory: &mut dyn HandleFactory, now_ms: u64) {
        self.clear_pool(ObjectKind::Obstacle, factory);
        self.clear_pool(ObjectKind::Collectible, factory);
        self.clear_pool(ObjectKind::PowerUp, factory);

        self.rng = Pcg32::seed_from_u64(self.seed);
        self.modes = ModeState {
            last_change_s: now_ms / 1000,
            ..ModeState::default()
        };
        self.session_start_ms = now_ms;
        self.grid_size = self.tuning.initial_obstacles;
        self.comet_fleet = self.tuning.comet_fleet_start;
        self.collected_count = 0;
        self.events.clear();
        self.reports = AssetReports::default();
    }
}
