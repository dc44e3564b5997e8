//! Presentation seam
//!
//! The simulation owns positions, rotations, and visibility as plain data; the
//! renderer owns meshes and materials. The only thing that crosses the seam is
//! an opaque [`RenderHandle`] minted by the host's [`HandleFactory`]. A factory
//! that cannot supply a template says so with `None` - it must never panic -
//! and the spawn planner degrades by skipping that category.

use serde::{Deserialize, Serialize};

/// Mesh templates the spawn planner can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    /// The patrol-drone enemy filling the default lane grid
    Enemy,
    /// Asteroid head of a comet trail
    Comet,
    /// One flat trail particle behind a comet
    CometParticle,
    /// Orbiting planet for the planet field
    Planet,
    /// Metal scrap collectible
    Metal,
    /// Plastic scrap collectible
    Plastic,
    /// The boot power-up
    Boot,
}

/// Opaque, stable identifier for one render primitive.
///
/// The simulation never interprets the value; it exists so the presentation
/// layer can find its mesh again when it reads the pool snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// Host-supplied factory for render primitives.
///
/// `create` is called once per spawned object (and once per comet trail
/// particle). Returning `None` marks the template as unavailable; the caller
/// logs once and leaves that category empty rather than failing the tick.
pub trait HandleFactory {
    fn create(&mut self, template: TemplateKind) -> Option<RenderHandle>;

    /// Release a handle whose object left the field. Default is a no-op for
    /// hosts that garbage-collect by diffing snapshots.
    fn release(&mut self, handle: RenderHandle) {
        let _ = handle;
    }
}

/// Factory that always succeeds, handing out sequential handles.
///
/// Useful for tests and for hosts that map handles lazily.
#[derive(Debug, Default)]
pub struct SequentialFactory {
    next: u64,
}

impl HandleFactory for SequentialFactory {
    fn create(&mut self, _template: TemplateKind) -> Option<RenderHandle> {
        let handle = RenderHandle(self.next);
        self.next += 1;
        Some(handle)
    }
}
