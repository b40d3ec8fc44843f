//! Rigid-body physics
//!
//! The simulation only talks to physics through [`PhysicsBackend`]:
//! - Bodies are addressed by generational [`BodyHandle`]s
//! - Shapes are axis-aligned boxes; bodies never rotate
//! - Gravity is uniform and fixed at world creation
//!
//! [`RapierWorld`] is the rapier2d-backed implementation.

pub mod rapier;

pub use rapier::RapierWorld;

use glam::Vec2;
use thiserror::Error;

/// Opaque reference to a body inside a backend world
///
/// The generation makes handles of destroyed bodies detectably stale even
/// after their slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}v{}", self.index, self.generation)
    }
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves, never integrates
    Static,
    /// Integrates under gravity and collides once it has a shape
    Dynamic,
}

#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("unknown or destroyed body {0}")]
    UnknownBody(BodyHandle),
    #[error("invalid step: dt={dt}, substeps={substeps}")]
    InvalidStep { dt: f32, substeps: u32 },
    #[error("body {0} left the finite world")]
    NonFinite(BodyHandle),
}

/// Operations the simulation needs from a physics engine
///
/// Creating the implementor is "create world"; dropping it is "destroy
/// world". Implementations are not internally synchronized: callers serialize
/// access themselves.
pub trait PhysicsBackend {
    fn create_body(&mut self, kind: BodyKind, position: Vec2) -> BodyHandle;

    /// Attach a box shape; the body's mass becomes `density * area`
    fn create_box_shape(
        &mut self,
        body: BodyHandle,
        half_extents: Vec2,
        density: f32,
        friction: f32,
    ) -> Result<(), PhysicsError>;

    fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    fn position(&self, body: BodyHandle) -> Result<Vec2, PhysicsError>;

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError>;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2)
    -> Result<(), PhysicsError>;

    /// Ignored on a sleeping body unless `wake` is set
    fn apply_linear_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError>;

    /// Advance the world by `dt` seconds split into `substeps` integrations
    fn advance(&mut self, dt: f32, substeps: u32) -> Result<(), PhysicsError>;

    /// Whether `body` refers to a live body
    fn contains(&self, body: BodyHandle) -> bool;

    fn body_count(&self) -> usize;
}
