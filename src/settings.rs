//! Runtime settings
//!
//! Loaded from an optional JSON file given on the command line. Missing
//! fields fall back to the defaults in [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::consts::*;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for item placement
    pub seed: u64,

    // === Physics thread ===
    /// Physics steps per simulated second
    pub physics_hz: f32,
    /// Integration sub-steps per physics step
    pub substeps: u32,
    /// Pause between physics steps (ms)
    pub physics_sleep_ms: u64,
    /// Downward gravity (cells/s²)
    pub gravity: f32,

    // === Control loop ===
    /// Pause between control loop iterations (ms)
    pub frame_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0xCA7,
            physics_hz: 1.0 / PHYSICS_DT,
            substeps: PHYSICS_SUBSTEPS,
            physics_sleep_ms: PHYSICS_SLEEP_MS,
            gravity: GRAVITY,
            frame_ms: FRAME_MS,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace values the physics thread cannot run with
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.physics_hz.is_finite() && self.physics_hz > 0.0) {
            log::warn!("physics_hz {} out of range, using default", self.physics_hz);
            self.physics_hz = defaults.physics_hz;
        }
        if self.substeps == 0 {
            self.substeps = 1;
        }
        if !self.gravity.is_finite() {
            self.gravity = defaults.gravity;
        }
        self
    }
}
