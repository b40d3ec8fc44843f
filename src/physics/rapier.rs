//! Rapier physics backend
//!
//! Adapts a 2D rapier pipeline to [`PhysicsBackend`]. Dynamic bodies have
//! their rotations locked so every box stays aligned with the character grid.

use std::fmt;

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyHandle, BodyKind, PhysicsBackend, PhysicsError};

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn to_rapier(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn from_rapier(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle { index, generation }
}

/// Physics world backed by rapier2d
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl RapierWorld {
    /// Create an empty world with the given gravity vector
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .get(to_rapier(handle))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get_mut(to_rapier(handle))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn check_finite(&self) -> Result<(), PhysicsError> {
        for (handle, body) in self.bodies.iter() {
            let finite = body
                .translation()
                .iter()
                .chain(body.linvel().iter())
                .all(|c| c.is_finite());
            if !finite {
                return Err(PhysicsError::NonFinite(from_rapier(handle)));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RapierWorld")
            .field("gravity", &from_vector(&self.gravity))
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

impl PhysicsBackend for RapierWorld {
    fn create_body(&mut self, kind: BodyKind, position: Vec2) -> BodyHandle {
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic().lock_rotations(),
        };
        let body = builder.translation(to_vector(position)).build();
        from_rapier(self.bodies.insert(body))
    }

    fn create_box_shape(
        &mut self,
        body: BodyHandle,
        half_extents: Vec2,
        density: f32,
        friction: f32,
    ) -> Result<(), PhysicsError> {
        let parent = to_rapier(body);
        if !self.bodies.contains(parent) {
            return Err(PhysicsError::UnknownBody(body));
        }

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .density(density)
            .friction(friction)
            .build();
        self.colliders
            .insert_with_parent(collider, parent, &mut self.bodies);

        // Impulses applied before the next step must already see the new mass
        if let Some(rb) = self.bodies.get_mut(parent) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        Ok(())
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(
                to_rapier(body),
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn position(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(from_vector(self.body(body)?.translation()))
    }

    fn linear_velocity(&self, body: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(from_vector(self.body(body)?.linvel()))
    }

    fn set_linear_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), PhysicsError> {
        let rb = self.body_mut(body)?;
        if rb.is_dynamic() {
            rb.set_linvel(to_vector(velocity), true);
        }
        Ok(())
    }

    fn apply_linear_impulse(
        &mut self,
        body: BodyHandle,
        impulse: Vec2,
        wake: bool,
    ) -> Result<(), PhysicsError> {
        let rb = self.body_mut(body)?;
        // Impulses on sleeping bodies are dropped unless asked to wake
        if !rb.is_dynamic() || (!wake && rb.is_sleeping()) {
            return Ok(());
        }
        rb.apply_impulse(to_vector(impulse), wake);
        Ok(())
    }

    fn advance(&mut self, dt: f32, substeps: u32) -> Result<(), PhysicsError> {
        if substeps == 0 || !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidStep { dt, substeps });
        }

        self.integration_parameters.dt = dt / substeps as f32;
        for _ in 0..substeps {
            self.physics_pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
        }
        self.check_finite()
    }

    fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains(to_rapier(body))
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn world_with_floor() -> RapierWorld {
        let mut world = RapierWorld::new(Vec2::new(0.0, 10.0));
        let floor = world.create_body(BodyKind::Static, Vec2::new(20.0, 19.0));
        world
            .create_box_shape(floor, Vec2::new(20.0, 1.0), 0.0, 0.8)
            .unwrap();
        world
    }

    fn is_sleeping(world: &RapierWorld, body: BodyHandle) -> bool {
        world.body(body).unwrap().is_sleeping()
    }

    #[test]
    fn test_destroyed_handle_is_stale() {
        let mut world = RapierWorld::new(Vec2::ZERO);
        let first = world.create_body(BodyKind::Dynamic, Vec2::ZERO);
        world.destroy_body(first).unwrap();
        let second = world.create_body(BodyKind::Dynamic, Vec2::ONE);

        assert!(!world.contains(first));
        assert!(world.contains(second));
        assert_eq!(world.position(first), Err(PhysicsError::UnknownBody(first)));
        assert_eq!(
            world.destroy_body(first),
            Err(PhysicsError::UnknownBody(first))
        );
        assert_eq!(
            world.create_box_shape(first, Vec2::ONE, 1.0, 0.3),
            Err(PhysicsError::UnknownBody(first))
        );
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_box_falls_rests_and_sleeps() {
        let mut world = world_with_floor();
        let body = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 5.0));
        world
            .create_box_shape(body, Vec2::splat(0.5), 0.8, 0.3)
            .unwrap();

        for _ in 0..300 {
            world.advance(DT, 4).unwrap();
        }

        let pos = world.position(body).unwrap();
        // Floor top is at y = 18, box half height 0.5
        assert!((pos.y - 17.5).abs() < 0.05, "resting at {pos}");
        assert!((pos.x - 10.0).abs() < 1e-3);
        assert!(is_sleeping(&world, body), "body should fall asleep");
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut world = RapierWorld::new(Vec2::new(0.0, 10.0));
        let body = world.create_body(BodyKind::Static, Vec2::new(3.0, 4.0));
        world
            .set_linear_velocity(body, Vec2::new(5.0, 0.0))
            .unwrap();
        world.advance(DT, 4).unwrap();
        assert_eq!(world.position(body).unwrap(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_impulse_scaled_by_mass() {
        let mut world = RapierWorld::new(Vec2::ZERO);
        let body = world.create_body(BodyKind::Dynamic, Vec2::ZERO);
        // 5 x 1 box at density 3 => mass 15
        world
            .create_box_shape(body, Vec2::new(2.5, 0.5), 3.0, 0.3)
            .unwrap();
        world
            .apply_linear_impulse(body, Vec2::new(450.0, 0.0), true)
            .unwrap();
        let vel = world.linear_velocity(body).unwrap();
        assert!((vel.x - 30.0).abs() < 1e-3, "vx = {}", vel.x);
    }

    #[test]
    fn test_impulse_without_wake_ignored_while_asleep() {
        let mut world = world_with_floor();
        let body = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 17.5));
        world
            .create_box_shape(body, Vec2::splat(0.5), 1.0, 0.3)
            .unwrap();
        for _ in 0..300 {
            world.advance(DT, 4).unwrap();
        }
        assert!(is_sleeping(&world, body));

        let before = world.linear_velocity(body).unwrap();
        world
            .apply_linear_impulse(body, Vec2::new(1.0, 0.0), false)
            .unwrap();
        assert_eq!(world.linear_velocity(body).unwrap(), before);
        assert!(is_sleeping(&world, body));

        world
            .apply_linear_impulse(body, Vec2::new(1.0, 0.0), true)
            .unwrap();
        assert!(!is_sleeping(&world, body));
        assert!(world.linear_velocity(body).unwrap().x > 0.0);
    }

    #[test]
    fn test_set_velocity_wakes_sleeping_body() {
        let mut world = world_with_floor();
        let body = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 17.5));
        world
            .create_box_shape(body, Vec2::splat(0.5), 1.0, 0.3)
            .unwrap();
        for _ in 0..300 {
            world.advance(DT, 4).unwrap();
        }
        assert!(is_sleeping(&world, body));

        world
            .set_linear_velocity(body, Vec2::new(2.0, 0.0))
            .unwrap();
        assert!(!is_sleeping(&world, body));
        world.advance(DT, 4).unwrap();
        assert!(world.position(body).unwrap().x > 10.0);
    }

    #[test]
    fn test_friction_slows_sliding_body() {
        let mut world = world_with_floor();
        let body = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 17.5));
        world
            .create_box_shape(body, Vec2::new(2.5, 0.5), 3.0, 0.3)
            .unwrap();
        world
            .set_linear_velocity(body, Vec2::new(3.0, 0.0))
            .unwrap();
        for _ in 0..30 {
            world.advance(DT, 4).unwrap();
        }
        let vel = world.linear_velocity(body).unwrap();
        assert!(vel.x < 3.0 && vel.x >= 0.0, "vx = {}", vel.x);
    }

    #[test]
    fn test_falling_box_lands_on_dynamic_box() {
        let mut world = world_with_floor();
        let base = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 17.5));
        world
            .create_box_shape(base, Vec2::new(2.5, 0.5), 3.0, 0.3)
            .unwrap();
        let top = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 10.0));
        world
            .create_box_shape(top, Vec2::splat(0.5), 0.8, 0.3)
            .unwrap();

        for _ in 0..240 {
            world.advance(DT, 4).unwrap();
        }

        let top_pos = world.position(top).unwrap();
        let base_pos = world.position(base).unwrap();
        assert!(top_pos.y < base_pos.y - 0.9, "top {top_pos} base {base_pos}");
        assert!((base_pos.y - 17.5).abs() < 0.1);
    }

    #[test]
    fn test_shapeless_static_body_never_collides() {
        let mut world = world_with_floor();
        // Marker right where the box will fall through
        world.create_body(BodyKind::Static, Vec2::new(10.0, 12.0));
        let body = world.create_body(BodyKind::Dynamic, Vec2::new(10.0, 5.0));
        world
            .create_box_shape(body, Vec2::splat(0.5), 0.8, 0.3)
            .unwrap();

        for _ in 0..180 {
            world.advance(DT, 4).unwrap();
        }
        assert!((world.position(body).unwrap().y - 17.5).abs() < 0.05);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let mut world = RapierWorld::new(Vec2::ZERO);
        assert!(matches!(
            world.advance(DT, 0),
            Err(PhysicsError::InvalidStep { .. })
        ));
        assert!(world.advance(f32::NAN, 4).is_err());
        assert!(world.advance(-DT, 4).is_err());
    }

    #[test]
    fn test_non_finite_state_reported() {
        let mut world = RapierWorld::new(Vec2::ZERO);
        let body = world.create_body(BodyKind::Dynamic, Vec2::ZERO);
        world.check_finite().unwrap();

        world
            .body_mut(body)
            .unwrap()
            .set_translation(vector![f32::NAN, 0.0], false);
        assert_eq!(world.check_finite(), Err(PhysicsError::NonFinite(body)));
    }
}
