//! Spawning and freeing entities
//!
//! The pet lives for the whole run. Items come and go on user command or when
//! eaten; hazards appear after a meal streak and go away only when cleaned.
//! Every operation here must run under the world guard.

use glam::Vec2;
use rand::Rng;

use super::SimError;
use super::state::{Hazard, Item, World};
use crate::consts::*;
use crate::physics::{BodyKind, PhysicsBackend};

/// Pick the drop column for a new item
///
/// Items land inside a band `ITEM_EDGE_MARGIN` cells from both edges. A drop
/// within one cell of an active hazard is shifted two cells right.
pub fn pick_item_x<R: Rng>(rng: &mut R, width: f32, hazard_x: Option<f32>) -> f32 {
    let band = (width - 2.0 * ITEM_EDGE_MARGIN).max(1.0) as u32;
    let mut x = ITEM_EDGE_MARGIN + rng.random_range(0..band) as f32;

    if let Some(hx) = hazard_x
        && (x - hx).abs() <= 1.0
    {
        x = hx + 2.0;
    }
    x
}

impl<B: PhysicsBackend> World<B> {
    /// Drop a new item from the top of the world
    ///
    /// Returns `Ok(false)` without touching the backend if an item is already
    /// active.
    pub fn spawn_item<R: Rng>(&mut self, rng: &mut R) -> Result<bool, SimError> {
        if self.item.is_some() {
            return Ok(false);
        }

        let geometry = self.geometry();
        let x = pick_item_x(rng, geometry.width, self.hazard_x());
        let backend = self.backend_mut();
        let body = backend.create_body(BodyKind::Dynamic, Vec2::new(x, geometry.drop_height));
        backend.create_box_shape(body, Vec2::splat(ITEM_HALF_EXTENT), ITEM_DENSITY, ITEM_FRICTION)?;
        backend.set_linear_velocity(body, Vec2::new(0.0, ITEM_DROP_SPEED))?;

        self.item = Some(Item { body });
        log::debug!("item {} dropped at x={}", body, x);
        Ok(true)
    }

    /// Free the active item's body. No-op if none is active.
    pub fn destroy_item(&mut self) -> Result<bool, SimError> {
        let Some(item) = self.item else {
            return Ok(false);
        };
        self.backend_mut().destroy_body(item.body)?;
        self.item = None;
        Ok(true)
    }

    /// Leave a static hazard at `at`. No-op if one is already active.
    pub fn spawn_hazard(&mut self, at: Vec2) -> Result<bool, SimError> {
        if self.hazard.is_some() {
            return Ok(false);
        }
        // No shape: the hazard is a marker, it never collides
        let body = self.backend_mut().create_body(BodyKind::Static, at);
        self.hazard = Some(Hazard { body, x: at.x });
        log::info!("hazard left at x={:.1}", at.x);
        Ok(true)
    }

    /// Clean up the active hazard. No-op, with no backend call, if none is
    /// active.
    pub fn clean_hazard(&mut self) -> Result<bool, SimError> {
        let Some(hazard) = self.hazard else {
            return Ok(false);
        };
        self.backend_mut().destroy_body(hazard.body)?;
        self.hazard = None;
        log::info!("hazard cleaned");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::WorldGeometry;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> World {
        World::with_gravity(GRAVITY, WorldGeometry::new(49.0, 24.0, 7.0)).unwrap()
    }

    #[test]
    fn test_item_x_stays_in_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let x = pick_item_x(&mut rng, 49.0, None);
            assert!((4.0..45.0).contains(&x), "x = {x}");
        }
    }

    #[test]
    fn test_item_x_shifted_off_hazard() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let x = pick_item_x(&mut rng, 49.0, Some(20.0));
            assert!((x - 20.0).abs() > 1.0, "x = {x} overlaps hazard");
        }
    }

    #[test]
    fn test_spawn_item_once() {
        let mut world = world();
        let mut rng = Pcg32::seed_from_u64(1);

        assert!(world.spawn_item(&mut rng).unwrap());
        assert!(world.item_active());
        assert_eq!(world.backend().body_count(), 3);

        let item = *world.item().unwrap();
        let pos = world.backend().position(item.body).unwrap();
        assert_eq!(pos.y, 7.0);
        assert_eq!(
            world.backend().linear_velocity(item.body).unwrap(),
            Vec2::new(0.0, ITEM_DROP_SPEED)
        );

        // Second spawn is ignored
        assert!(!world.spawn_item(&mut rng).unwrap());
        assert_eq!(world.backend().body_count(), 3);
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_destroy_item_frees_body() {
        let mut world = world();
        let mut rng = Pcg32::seed_from_u64(1);
        world.spawn_item(&mut rng).unwrap();
        let body = world.item().unwrap().body;

        assert!(world.destroy_item().unwrap());
        assert!(!world.item_active());
        assert!(!world.backend().contains(body));
        assert!(!world.destroy_item().unwrap());
        world.check_invariants().unwrap();
    }

    #[test]
    fn test_hazard_spawn_and_clean() {
        let mut world = world();
        assert!(world.spawn_hazard(Vec2::new(12.0, 21.5)).unwrap());
        assert_eq!(world.hazard_x(), Some(12.0));
        assert!(!world.spawn_hazard(Vec2::new(30.0, 21.5)).unwrap());
        assert_eq!(world.hazard_x(), Some(12.0));
        world.check_invariants().unwrap();

        assert!(world.clean_hazard().unwrap());
        assert!(!world.hazard_active());
        assert_eq!(world.backend().body_count(), 2);
    }

    #[test]
    fn test_clean_without_hazard_is_noop() {
        let mut world = world();
        let before = world.backend().body_count();
        assert!(!world.clean_hazard().unwrap());
        assert_eq!(world.backend().body_count(), before);
        assert!(!world.hazard_active());
    }
}
