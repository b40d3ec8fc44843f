//! Control loop: AI tick, render, input, pacing
//!
//! Runs on the main thread next to the physics driver. Each iteration takes
//! the world guard once to run the pet AI and copy a snapshot, then renders
//! and polls input with the guard released. Commands that change the world
//! take the guard again just for their own backend calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::display::{Key, Surface, draw_scene};
use crate::physics::{PhysicsBackend, RapierWorld};
use crate::settings::Settings;
use crate::sim::{self, Access, SharedWorld, SimError, Unit};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("display error: {0}")]
    Display(#[from] std::io::Error),
}

/// User commands, one keystroke each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Drop food (ignored while food is out)
    Feed,
    /// Remove the hazard (ignored if there is none)
    Clean,
}

impl Command {
    /// Map a key to a command, case-insensitively
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Interrupt => Some(Command::Quit),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'q' => Some(Command::Quit),
                'f' => Some(Command::Feed),
                'c' => Some(Command::Clean),
                _ => None,
            },
        }
    }
}

pub struct ControlLoop<S: Surface, B: PhysicsBackend = RapierWorld> {
    world: SharedWorld<B>,
    surface: S,
    running: Arc<AtomicBool>,
    rng: Pcg32,
    frame: Duration,
    iterations: u64,
}

impl<S: Surface, B: PhysicsBackend> ControlLoop<S, B> {
    pub fn new(
        world: SharedWorld<B>,
        surface: S,
        running: Arc<AtomicBool>,
        settings: &Settings,
    ) -> Self {
        Self {
            world,
            surface,
            running,
            rng: Pcg32::seed_from_u64(settings.seed),
            frame: Duration::from_millis(settings.frame_ms),
            iterations: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Iterate until quit or until the physics thread drops the run-flag
    ///
    /// Any error also clears the run-flag so the physics thread stops.
    pub fn run(&mut self) -> Result<u64, ControlError> {
        log::info!("control loop started ({:?} per frame)", self.frame);
        while self.is_running() {
            if let Err(err) = self.iterate() {
                log::error!("control loop failed: {}", err);
                self.running.store(false, Ordering::Release);
                return Err(err);
            }
            thread::sleep(self.frame);
        }
        log::info!("control loop stopped after {} iterations", self.iterations);
        Ok(self.iterations)
    }

    /// One iteration without the trailing sleep
    ///
    /// Returns the command read this iteration, if any.
    pub fn iterate(&mut self) -> Result<Option<Command>, ControlError> {
        let (snapshot, outcome) = {
            let mut world = self.world.lock()?;
            let outcome = sim::tick(&mut world)?;
            world.record(Unit::Control, Access::Tick);
            let snapshot = world.snapshot()?;
            world.record(Unit::Control, Access::Snapshot);
            (snapshot, outcome)
        };
        self.iterations += 1;

        if log::log_enabled!(log::Level::Trace)
            && let Ok(json) = serde_json::to_string(&snapshot)
        {
            log::trace!("frame {}: {}", self.iterations, json);
        }
        if outcome.hazard_spawned {
            log::info!("pet is satisfied and left a mess");
        }

        draw_scene(&mut self.surface, &snapshot)?;
        self.surface.refresh()?;

        let command = self.surface.poll_key()?.and_then(Command::from_key);
        if let Some(command) = command {
            let applied = self.apply(command)?;
            log::debug!("command {:?} applied={}", command, applied);
        }
        Ok(command)
    }

    /// Apply a command if its precondition holds
    ///
    /// Returns whether anything changed; gated commands are silently ignored.
    pub fn apply(&mut self, command: Command) -> Result<bool, ControlError> {
        match command {
            Command::Quit => {
                self.running.store(false, Ordering::Release);
                Ok(true)
            }
            Command::Feed => {
                let mut world = self.world.lock()?;
                if world.item_active() {
                    return Ok(false);
                }
                let spawned = world.spawn_item(&mut self.rng)?;
                world.record(Unit::Control, Access::SpawnItem);
                Ok(spawned)
            }
            Command::Clean => {
                let mut world = self.world.lock()?;
                if !world.hazard_active() {
                    return Ok(false);
                }
                let cleaned = world.clean_hazard()?;
                world.record(Unit::Control, Access::CleanHazard);
                Ok(cleaned)
            }
        }
    }
}
