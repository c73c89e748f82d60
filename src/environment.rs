//! Physical tunables for a run
//!
//! Read-only while stepping. Every field has a default taken from
//! [`crate::consts`], so a JSON file only needs the values it overrides.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Arena size in screen units (origin top-left, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(SimError::InvalidConfig(format!(
                "arena must be positive and finite, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Whether a disk of `radius` can sit in the arena with room to be clamped off every wall
    pub fn fits(&self, radius: f64) -> bool {
        let span = 2.0 * (radius + WALL_EPSILON);
        span <= self.width && span <= self.height
    }

    /// Clamp a center so the disk lies fully inside the arena
    pub fn contain(&self, pos: DVec2, radius: f64) -> DVec2 {
        DVec2::new(
            pos.x.clamp(radius, self.width - radius),
            pos.y.clamp(radius, self.height - radius),
        )
    }

    /// Whether a disk lies fully inside the arena
    pub fn contains(&self, pos: DVec2, radius: f64) -> bool {
        pos.x >= radius
            && pos.x <= self.width - radius
            && pos.y >= radius
            && pos.y <= self.height - radius
    }
}

/// Process-wide physics tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Gravity, scaled by each body's mass every frame
    pub gravity: DVec2,
    /// Velocity damping per second
    pub air_resistance: f64,
    /// Fraction of normal velocity removed by a bounce (0 = elastic, 1 = dead stop)
    pub bounce_resistance: f64,
    /// Wall-bounce speed below which a component is zeroed
    pub stop_velocity: f64,
    /// Arena size
    pub bounds: Bounds,
    /// Per-axis spawn velocity range and shove strength
    pub start_velocity: f64,
    /// Directional push strength
    pub push_force: f64,
    /// Skip pairs whose centers share an exact x or y coordinate until the next frame
    pub defer_axis_aligned: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: DVec2::new(GRAVITY.0, GRAVITY.1),
            air_resistance: AIR_RESISTANCE,
            bounce_resistance: BOUNCE_RESISTANCE,
            stop_velocity: STOP_VELOCITY,
            bounds: Bounds::default(),
            start_velocity: START_VELOCITY,
            push_force: PUSH_FORCE,
            defer_axis_aligned: false,
        }
    }
}

impl Environment {
    /// Default environment with a different arena size
    pub fn with_bounds(width: f64, height: f64) -> Self {
        Self {
            bounds: Bounds::new(width, height),
            ..Self::default()
        }
    }

    /// Check every value is usable by the stepper
    pub fn validate(&self) -> Result<(), SimError> {
        self.bounds.validate()?;

        if !self.gravity.is_finite() {
            return Err(SimError::InvalidConfig("gravity must be finite".into()));
        }
        let non_negative = [
            ("air_resistance", self.air_resistance),
            ("stop_velocity", self.stop_velocity),
            ("start_velocity", self.start_velocity),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.bounce_resistance) {
            return Err(SimError::InvalidConfig(format!(
                "bounce_resistance must be within [0, 1], got {}",
                self.bounce_resistance
            )));
        }
        if !self.push_force.is_finite() {
            return Err(SimError::InvalidConfig("push_force must be finite".into()));
        }
        Ok(())
    }

    /// Parse and validate an environment from JSON
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let env: Self = serde_json::from_str(json)?;
        env.validate()?;
        Ok(env)
    }

    /// Load and validate an environment from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let env = Self::from_json(&json)?;
        log::info!("Loaded environment from {}", path.display());
        Ok(env)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
