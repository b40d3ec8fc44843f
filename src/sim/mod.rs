//! Concurrent simulation core
//!
//! Two execution units share one [`SharedWorld`]:
//! - The physics driver thread steps the backend at a fixed cadence
//! - The control loop runs the pet AI and applies user commands
//!
//! Locking contract: every backend call and every entity-slot change happens
//! under the world guard, and the guard is held only for those calls. Never
//! hold it across blocking input or a display refresh; the physics thread
//! would stall for as long as the terminal does.

pub mod driver;
pub mod lifecycle;
pub mod state;
pub mod steering;

pub use driver::{DriverConfig, PhysicsDriver};
pub use lifecycle::pick_item_x;
pub use state::{
    Access, AccessAudit, AccessRecord, Hazard, Item, Pet, SharedWorld, Unit, World,
    WorldGeometry, WorldSnapshot,
};
pub use steering::{PetState, SteeringInput, TickOutcome, clamp_dx, desired_dx, tick, within_reach};

use thiserror::Error;

use crate::physics::PhysicsError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("world lock poisoned by a panicked thread")]
    LockPoisoned,
    #[error("physics thread panicked")]
    DriverPanicked,
    #[error("world invariant violated: {0}")]
    InvariantViolated(String),
}
