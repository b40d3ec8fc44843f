//! Catagotchi - a terminal cat living in a tiny physics world
//!
//! Core modules:
//! - `physics`: Backend trait for axis-aligned box bodies, rapier-backed
//! - `sim`: Shared world state, physics driver thread, pet AI
//! - `control`: Render/input/AI loop running beside the physics thread
//! - `display`: Character-grid surfaces (terminal and in-memory)
//! - `settings`: Runtime configuration

pub mod assets;
pub mod control;
pub mod display;
pub mod physics;
pub mod settings;
pub mod sim;

pub use control::{ControlError, ControlLoop};
pub use settings::Settings;

/// Simulation constants
pub mod consts {
    /// Physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Integration sub-steps per physics step
    pub const PHYSICS_SUBSTEPS: u32 = 4;
    /// Pause between physics steps
    pub const PHYSICS_SLEEP_MS: u64 = 16;
    /// Pause between control loop iterations
    pub const FRAME_MS: u64 = 50;
    /// Downward gravity (screen rows grow downward)
    pub const GRAVITY: f32 = 10.0;

    /// Pet box half extents
    pub const PET_HALF_WIDTH: f32 = 2.5;
    pub const PET_HALF_HEIGHT: f32 = 0.5;
    pub const PET_DENSITY: f32 = 3.0;
    pub const PET_FRICTION: f32 = 0.3;

    /// Item box half extent (square)
    pub const ITEM_HALF_EXTENT: f32 = 0.5;
    pub const ITEM_DENSITY: f32 = 0.8;
    pub const ITEM_FRICTION: f32 = 0.3;
    /// Initial downward speed of a dropped item
    pub const ITEM_DROP_SPEED: f32 = 10.0;
    /// Items never spawn closer than this to either world edge
    pub const ITEM_EDGE_MARGIN: f32 = 4.0;

    pub const GROUND_FRICTION: f32 = 0.8;

    /// Horizontal speed multiplier applied to the steering direction
    pub const PET_SPEED: f32 = 1.5;
    /// Lookahead used by the edge clamp
    pub const STEER_LOOKAHEAD: f32 = 0.05;
    /// Steering magnitude while stepping away from a hazard
    pub const AVOID_DX: f32 = 0.5;
    /// Hazard closer than this makes an idle pet shuffle away
    pub const AVOID_RADIUS: f32 = 4.0;

    /// Reach box for eating (integer-truncated coordinates)
    pub const REACH_X: i32 = 4;
    pub const REACH_Y: i32 = 2;

    /// Items eaten before the pet leaves a hazard behind
    pub const HAZARD_THRESHOLD: u32 = 5;
    /// Horizontal kick after leaving a hazard
    pub const HAZARD_IMPULSE: f32 = 450.0;
    /// Edge margin under which the kick is replaced by a gentle nudge
    pub const EDGE_SOFT_ZONE: f32 = 3.0;
    /// Impulse-to-velocity factor for the gentle nudge
    pub const EDGE_DAMPING: f32 = 0.01;
}
