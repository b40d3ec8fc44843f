//! Pet AI: steering, eating, and leaving hazards
//!
//! Runs once per control-loop iteration under the world guard. Everything is
//! level-triggered from current positions; there are no timers and nothing
//! to cancel.

use glam::Vec2;
use serde::Serialize;

use super::SimError;
use super::state::World;
use crate::consts::*;
use crate::physics::PhysicsBackend;

/// What the pet is doing this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PetState {
    /// Nothing to chase
    Idle,
    /// No food around, shuffling away from a nearby hazard
    Avoiding,
    /// Heading straight for the food
    Approaching,
    /// Hazard between pet and food: backing off first
    Detouring,
    /// Just hit the meal threshold and left a hazard behind
    Satiated,
}

/// Positions the steering rule looks at
#[derive(Debug, Clone, Copy)]
pub struct SteeringInput {
    pub pet_x: f32,
    pub item_x: Option<f32>,
    pub hazard_x: Option<f32>,
    pub world_width: f32,
    pub half_width: f32,
}

/// Result of one AI tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub state: PetState,
    /// Steering direction after the edge clamp
    pub dx: f32,
    pub consumed: bool,
    pub hazard_spawned: bool,
}

/// Unit direction pointing from `hazard_x` to `pet_x`
///
/// When they coincide (a fresh hazard sits right under the pet) the pet
/// heads toward the world center, where there is more room.
fn away_from(pet_x: f32, hazard_x: f32, world_width: f32) -> f32 {
    if pet_x > hazard_x {
        1.0
    } else if pet_x < hazard_x {
        -1.0
    } else if pet_x < world_width * 0.5 {
        1.0
    } else {
        -1.0
    }
}

/// Steering direction before the edge clamp
pub fn desired_dx(input: &SteeringInput) -> (f32, PetState) {
    match (input.item_x, input.hazard_x) {
        (None, Some(hx)) if (input.pet_x - hx).abs() < AVOID_RADIUS => (
            AVOID_DX * away_from(input.pet_x, hx, input.world_width),
            PetState::Avoiding,
        ),
        (None, _) => (0.0, PetState::Idle),
        (Some(ix), Some(hx)) if is_between(hx, input.pet_x, ix) => (
            AVOID_DX * away_from(input.pet_x, hx, input.world_width),
            PetState::Detouring,
        ),
        (Some(ix), _) => (ix - input.pet_x, PetState::Approaching),
    }
}

/// Whether `x` lies strictly between `a` and `b`
fn is_between(x: f32, a: f32, b: f32) -> bool {
    (a < x && x < b) || (b < x && x < a)
}

/// Hard stop at the world edges: no sliding along them
pub fn clamp_dx(pet_x: f32, dx: f32, half_width: f32, world_width: f32) -> f32 {
    let target = pet_x + dx * STEER_LOOKAHEAD;
    if target < half_width || target > world_width - half_width {
        0.0
    } else {
        dx
    }
}

/// Coarse eating box on truncated coordinates
pub fn within_reach(pet: Vec2, item: Vec2) -> bool {
    let dx = (pet.x as i32 - item.x as i32).abs();
    let dy = (pet.y as i32 - item.y as i32).abs();
    dx <= REACH_X && dy <= REACH_Y
}

/// Run one AI tick: steer, eat, maybe leave a hazard
pub fn tick<B: PhysicsBackend>(world: &mut World<B>) -> Result<TickOutcome, SimError> {
    let geometry = world.geometry();
    let pet_body = world.pet.body;
    let half_width = world.pet.half_width;
    let pet_pos = world.pet_position()?;
    let item_pos = world.item_position()?;

    // Steering
    let input = SteeringInput {
        pet_x: pet_pos.x,
        item_x: item_pos.map(|p| p.x),
        hazard_x: world.hazard_x(),
        world_width: geometry.width,
        half_width,
    };
    let (dx, mut state) = desired_dx(&input);
    let dx = clamp_dx(pet_pos.x, dx, half_width, geometry.width);

    let backend = world.backend_mut();
    let vel = backend.linear_velocity(pet_body)?;
    backend.set_linear_velocity(pet_body, Vec2::new(dx * PET_SPEED, vel.y))?;

    // Eating
    let mut consumed = false;
    if let Some(item) = item_pos
        && within_reach(pet_pos, item)
    {
        world.destroy_item()?;
        world.pet.consumed += 1;
        consumed = true;
        log::debug!("item eaten ({} since last hazard)", world.pet.consumed);
    }

    // Hazard
    let mut hazard_spawned = false;
    if world.pet.consumed >= HAZARD_THRESHOLD && !world.hazard_active() {
        world.spawn_hazard(pet_pos)?;
        world.pet.consumed = 0;
        kick_pet(world, pet_pos)?;
        state = PetState::Satiated;
        hazard_spawned = true;
    }

    world.pet_state = state;
    Ok(TickOutcome {
        state,
        dx,
        consumed,
        hazard_spawned,
    })
}

/// Push the pet off a freshly left hazard
///
/// The hazard is always left right under the pet, so "away from it" has no
/// direction of its own: the kick points toward the world center. Near an
/// edge a full impulse would fling the pet out of the world, so it gets a
/// small inward velocity instead.
fn kick_pet<B: PhysicsBackend>(world: &mut World<B>, pet_pos: Vec2) -> Result<(), SimError> {
    let width = world.geometry().width;
    let body = world.pet.body;
    let backend = world.backend_mut();
    let nudge = HAZARD_IMPULSE * EDGE_DAMPING;

    if pet_pos.x < EDGE_SOFT_ZONE {
        let vy = backend.linear_velocity(body)?.y;
        backend.set_linear_velocity(body, Vec2::new(nudge, vy))?;
    } else if pet_pos.x > width - EDGE_SOFT_ZONE {
        let vy = backend.linear_velocity(body)?.y;
        backend.set_linear_velocity(body, Vec2::new(-nudge, vy))?;
    } else {
        let direction = if pet_pos.x < width * 0.5 { 1.0 } else { -1.0 };
        backend.apply_linear_impulse(body, Vec2::new(direction * HAZARD_IMPULSE, 0.0), true)?;
    }
    Ok(())
}
