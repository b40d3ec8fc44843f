//! Catagotchi entry point
//!
//! Sets up the terminal, starts the physics thread, runs the control loop on
//! the main thread, and tears everything down in order.
//!
//! Usage: `catagotchi [settings.json]`. Logs go to stderr (`RUST_LOG`), so
//! redirect it when raising the level: `catagotchi 2>catagotchi.log`.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use catagotchi::assets::{title_height, title_width};
use catagotchi::display::{Surface, TerminalSurface};
use catagotchi::sim::{DriverConfig, PhysicsDriver, SharedWorld, World, WorldGeometry};
use catagotchi::{ControlLoop, Settings};

/// Rows below the drop height needed for a fall, the ground and the status line
const MIN_FIELD_ROWS: f32 = 6.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("Catagotchi starting...");

    let settings = match std::env::args_os().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };

    let surface = TerminalSurface::enter().context("failed to set up terminal")?;
    let (rows, _) = surface.size().context("failed to query terminal size")?;

    let drop_height = title_height() as f32 + 1.0;
    let geometry = WorldGeometry::new(
        title_width() as f32,
        (rows as f32).max(drop_height + MIN_FIELD_ROWS),
        drop_height,
    );
    let world = SharedWorld::new(
        World::with_gravity(settings.gravity, geometry).context("failed to build world")?,
    );

    let running = Arc::new(AtomicBool::new(true));
    let driver = PhysicsDriver::spawn(
        world.clone(),
        Arc::clone(&running),
        DriverConfig::from(&settings),
    )
    .context("failed to start physics thread")?;

    let mut control = ControlLoop::new(world, surface, Arc::clone(&running), &settings);
    let control_result = control.run();

    running.store(false, Ordering::Release);
    let driver_result = driver.join();
    // Restore the terminal before reporting anything
    drop(control);

    let steps = driver_result.context("physics thread failed")?;
    let iterations = control_result.context("control loop failed")?;
    log::info!(
        "Catagotchi exiting after {} frames and {} physics steps",
        iterations,
        steps
    );
    Ok(())
}
