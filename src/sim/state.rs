//! World state and the guard around it
//!
//! [`World`] owns the physics backend and the three entity kinds by value.
//! The Item and Hazard live in `Option` slots: a body handle exists exactly
//! while the entity is active, so an inactive entity's handle cannot be used.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec2;
use serde::Serialize;

use super::SimError;
use super::steering::PetState;
use crate::assets::PET_SPRITE;
use crate::consts::*;
use crate::physics::{BodyHandle, BodyKind, PhysicsBackend, RapierWorld};

/// Fixed world dimensions, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldGeometry {
    /// Horizontal extent; the pet stays within `[half_width, width - half_width]`
    pub width: f32,
    /// Vertical extent; the ground occupies the last two rows
    pub height: f32,
    /// Row items are dropped from
    pub drop_height: f32,
}

impl WorldGeometry {
    pub fn new(width: f32, height: f32, drop_height: f32) -> Self {
        Self {
            width,
            height,
            drop_height,
        }
    }

    pub fn pet_start(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height - 2.0)
    }
}

/// The autonomous cat
#[derive(Debug, Clone)]
pub struct Pet {
    pub body: BodyHandle,
    pub half_width: f32,
    /// Items eaten since the last hazard
    pub consumed: u32,
    pub sprite: &'static str,
}

/// Food dropped by the user
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub body: BodyHandle,
}

/// Left behind by the pet after eating enough
#[derive(Debug, Clone, Copy)]
pub struct Hazard {
    pub body: BodyHandle,
    /// Cached so hot comparisons skip the backend
    pub x: f32,
}

/// Which execution unit touched the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Driver,
    Control,
}

/// What the unit did while holding the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Step,
    Tick,
    SpawnItem,
    CleanHazard,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub seq: u64,
    pub unit: Unit,
    pub access: Access,
}

/// Maximum access records kept
pub const AUDIT_CAPACITY: usize = 256;

/// Bounded log of guarded accesses, newest last
#[derive(Debug, Clone, Default)]
pub struct AccessAudit {
    records: VecDeque<AccessRecord>,
    seq: u64,
    driver_accesses: u64,
    control_accesses: u64,
}

impl AccessAudit {
    pub fn record(&mut self, unit: Unit, access: Access) {
        self.seq += 1;
        match unit {
            Unit::Driver => self.driver_accesses += 1,
            Unit::Control => self.control_accesses += 1,
        }
        let record = AccessRecord {
            seq: self.seq,
            unit,
            access,
        };
        log::trace!("world access {:?}", record);
        if self.records.len() == AUDIT_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &AccessRecord> {
        self.records.iter()
    }

    pub fn total(&self) -> u64 {
        self.seq
    }

    pub fn count(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Driver => self.driver_accesses,
            Unit::Control => self.control_accesses,
        }
    }
}

/// Copy of everything the renderer needs, taken under the guard
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub geometry: WorldGeometry,
    pub pet: Vec2,
    pub pet_half_width: f32,
    pub pet_sprite: &'static str,
    pub consumed: u32,
    pub item: Option<Vec2>,
    pub hazard_x: Option<f32>,
    pub pet_state: PetState,
}

impl WorldSnapshot {
    pub fn hazard_active(&self) -> bool {
        self.hazard_x.is_some()
    }
}

/// The shared simulation state
#[derive(Debug)]
pub struct World<B: PhysicsBackend = RapierWorld> {
    backend: B,
    geometry: WorldGeometry,
    ground: BodyHandle,
    pub(crate) pet: Pet,
    pub(crate) item: Option<Item>,
    pub(crate) hazard: Option<Hazard>,
    pub(crate) pet_state: PetState,
    audit: AccessAudit,
}

impl World<RapierWorld> {
    /// World backed by rapier with downward gravity
    pub fn with_gravity(gravity: f32, geometry: WorldGeometry) -> Result<Self, SimError> {
        Self::new(RapierWorld::new(Vec2::new(0.0, gravity)), geometry)
    }
}

impl<B: PhysicsBackend> World<B> {
    /// Build the ground and the pet inside `backend`
    pub fn new(mut backend: B, geometry: WorldGeometry) -> Result<Self, SimError> {
        let ground = backend.create_body(
            BodyKind::Static,
            Vec2::new(geometry.width * 0.5, geometry.height - 1.0),
        );
        backend.create_box_shape(
            ground,
            Vec2::new(geometry.width * 0.5, 1.0),
            0.0,
            GROUND_FRICTION,
        )?;

        let body = backend.create_body(BodyKind::Dynamic, geometry.pet_start());
        backend.create_box_shape(
            body,
            Vec2::new(PET_HALF_WIDTH, PET_HALF_HEIGHT),
            PET_DENSITY,
            PET_FRICTION,
        )?;

        log::debug!(
            "world created: {}x{} cells, pet {} at {}",
            geometry.width,
            geometry.height,
            body,
            geometry.pet_start()
        );

        Ok(Self {
            backend,
            geometry,
            ground,
            pet: Pet {
                body,
                half_width: PET_HALF_WIDTH,
                consumed: 0,
                sprite: PET_SPRITE,
            },
            item: None,
            hazard: None,
            pet_state: PetState::Idle,
            audit: AccessAudit::default(),
        })
    }

    pub fn geometry(&self) -> WorldGeometry {
        self.geometry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn hazard(&self) -> Option<&Hazard> {
        self.hazard.as_ref()
    }

    pub fn item_active(&self) -> bool {
        self.item.is_some()
    }

    pub fn hazard_active(&self) -> bool {
        self.hazard.is_some()
    }

    pub fn pet_state(&self) -> PetState {
        self.pet_state
    }

    pub fn pet_position(&self) -> Result<Vec2, SimError> {
        Ok(self.backend.position(self.pet.body)?)
    }

    pub fn item_position(&self) -> Result<Option<Vec2>, SimError> {
        self.item
            .map(|item| self.backend.position(item.body))
            .transpose()
            .map_err(SimError::from)
    }

    pub fn hazard_x(&self) -> Option<f32> {
        self.hazard.map(|h| h.x)
    }

    pub fn audit(&self) -> &AccessAudit {
        &self.audit
    }

    pub fn record(&mut self, unit: Unit, access: Access) {
        self.audit.record(unit, access);
    }

    pub fn snapshot(&self) -> Result<WorldSnapshot, SimError> {
        Ok(WorldSnapshot {
            geometry: self.geometry,
            pet: self.pet_position()?,
            pet_half_width: self.pet.half_width,
            pet_sprite: self.pet.sprite,
            consumed: self.pet.consumed,
            item: self.item_position()?,
            hazard_x: self.hazard_x(),
            pet_state: self.pet_state,
        })
    }

    /// Verify every live entity refers to a live body and nothing leaked
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let live = |handle: BodyHandle| self.backend.contains(handle);

        if !live(self.ground) {
            return Err(SimError::InvariantViolated(format!(
                "ground {} destroyed",
                self.ground
            )));
        }
        if !live(self.pet.body) {
            return Err(SimError::InvariantViolated(format!(
                "pet {} destroyed",
                self.pet.body
            )));
        }
        if let Some(item) = self.item
            && !live(item.body)
        {
            return Err(SimError::InvariantViolated(format!(
                "active item has freed body {}",
                item.body
            )));
        }
        if let Some(hazard) = self.hazard
            && !live(hazard.body)
        {
            return Err(SimError::InvariantViolated(format!(
                "active hazard has freed body {}",
                hazard.body
            )));
        }

        let expected = 2 + self.item.iter().count() + self.hazard.iter().count();
        let actual = self.backend.body_count();
        if actual != expected {
            return Err(SimError::InvariantViolated(format!(
                "{actual} bodies alive, expected {expected}"
            )));
        }
        Ok(())
    }
}

/// The single exclusive-access boundary around [`World`]
///
/// Cloning shares the same world. Nothing outside the guard keeps body
/// handles: callers lock, act, and drop the guard.
pub struct SharedWorld<B: PhysicsBackend = RapierWorld> {
    inner: Arc<Mutex<World<B>>>,
}

impl<B: PhysicsBackend> Clone for SharedWorld<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: PhysicsBackend> SharedWorld<B> {
    pub fn new(world: World<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Acquire the guard. A poisoned lock is unrecoverable.
    pub fn lock(&self) -> Result<MutexGuard<'_, World<B>>, SimError> {
        self.inner.lock().map_err(|_| SimError::LockPoisoned)
    }
}
