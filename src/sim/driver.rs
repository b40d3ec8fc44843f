//! Fixed-step physics thread
//!
//! Steps the backend at its own cadence, independent of how fast the
//! terminal renders. The shared run-flag is the only stop signal; the thread
//! checks it before every step and is always joined, never detached.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::SimError;
use super::state::{Access, SharedWorld, Unit};
use crate::consts::*;
use crate::physics::PhysicsBackend;
use crate::settings::Settings;

/// Step parameters for the physics thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    pub dt: f32,
    pub substeps: u32,
    /// Pause after each step, outside the guard
    pub sleep: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            dt: PHYSICS_DT,
            substeps: PHYSICS_SUBSTEPS,
            sleep: Duration::from_millis(PHYSICS_SLEEP_MS),
        }
    }
}

impl From<&Settings> for DriverConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            dt: 1.0 / settings.physics_hz,
            substeps: settings.substeps,
            sleep: Duration::from_millis(settings.physics_sleep_ms),
        }
    }
}

/// Handle to the running physics thread
pub struct PhysicsDriver {
    handle: Option<JoinHandle<Result<u64, SimError>>>,
    running: Arc<AtomicBool>,
}

impl PhysicsDriver {
    /// Start stepping `world` until `running` goes false
    pub fn spawn<B>(
        world: SharedWorld<B>,
        running: Arc<AtomicBool>,
        config: DriverConfig,
    ) -> io::Result<Self>
    where
        B: PhysicsBackend + Send + 'static,
    {
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("physics".into())
            .spawn(move || run(world, flag, config))?;

        log::debug!(
            "physics driver started: dt={:.4}s, {} substeps, sleep {:?}",
            config.dt,
            config.substeps,
            config.sleep
        );

        Ok(Self {
            handle: Some(handle),
            running,
        })
    }

    /// Whether the thread is still stepping
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the thread to stop and return how many steps it took
    ///
    /// Does not clear the run-flag itself: call after requesting shutdown.
    pub fn join(mut self) -> Result<u64, SimError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| SimError::DriverPanicked)?,
            None => Ok(0),
        }
    }
}

impl Drop for PhysicsDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.running.store(false, Ordering::Release);
            if handle.join().is_err() {
                log::error!("physics thread panicked during shutdown");
            }
        }
    }
}

fn run<B: PhysicsBackend>(
    world: SharedWorld<B>,
    running: Arc<AtomicBool>,
    config: DriverConfig,
) -> Result<u64, SimError> {
    let mut steps = 0u64;

    while running.load(Ordering::Acquire) {
        if let Err(err) = step(&world, &config) {
            log::error!("physics step {} failed: {}", steps, err);
            // Take the control loop down with us
            running.store(false, Ordering::Release);
            return Err(err);
        }
        steps += 1;
        thread::sleep(config.sleep);
    }

    log::debug!("physics driver stopped after {} steps", steps);
    Ok(steps)
}

fn step<B: PhysicsBackend>(world: &SharedWorld<B>, config: &DriverConfig) -> Result<(), SimError> {
    let mut world = world.lock()?;
    world.backend_mut().advance(config.dt, config.substeps)?;
    world.record(Unit::Driver, Access::Step);
    Ok(())
}
