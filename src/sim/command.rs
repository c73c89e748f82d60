//! Control commands a host maps its input onto
//!
//! Keeps the host's key handling a thin translation layer: every action the
//! engine supports is one variant, applied with [`World::apply`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::world::World;
use crate::consts::SPAWN_RADIUS_MAX;
use crate::error::SimError;

/// Direction of a push applied to every body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Velocity delta for a push of the given strength
    ///
    /// Horizontal pushes are half strength; screen y grows downward.
    pub fn force(self, strength: f64) -> DVec2 {
        match self {
            Direction::Left => DVec2::new(-strength / 2.0, 0.0),
            Direction::Right => DVec2::new(strength / 2.0, 0.0),
            Direction::Up => DVec2::new(0.0, -strength),
            Direction::Down => DVec2::new(0.0, strength),
        }
    }
}

/// One control action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Spawn a body of the given radius
    Spawn { radius: f64 },
    /// Spawn `count` bodies with radii from the spawn range
    ///
    /// Rejected up front, with nothing spawned, if the largest spawn radius
    /// does not fit the arena.
    SpawnRandom { count: u32 },
    RemoveFirst,
    RemoveLast,
    /// Random upward throw for every body
    Shove,
    /// Push every body in a direction
    Push { direction: Direction },
    ResetVelocities,
    /// Arena resized by the host
    Resize { width: f64, height: f64 },
    /// Host window moved; keep bodies still on screen
    Translate { offset: DVec2 },
}

impl World {
    /// Push every body one way with the environment's push strength
    pub fn push(&mut self, direction: Direction) {
        let force = direction.force(self.environment().push_force);
        self.apply_force_to_all(force);
    }

    /// Apply a control command
    pub fn apply(&mut self, command: &Command) -> Result<(), SimError> {
        match *command {
            Command::Spawn { radius } => {
                self.add_body(radius)?;
            }
            Command::SpawnRandom { count } => {
                let bounds = self.bounds();
                if !bounds.fits(SPAWN_RADIUS_MAX) {
                    return Err(SimError::DoesNotFit {
                        radius: SPAWN_RADIUS_MAX,
                        width: bounds.width,
                        height: bounds.height,
                    });
                }
                for _ in 0..count {
                    self.add_random_body()?;
                }
            }
            Command::RemoveFirst => {
                self.remove_first();
            }
            Command::RemoveLast => {
                self.remove_last();
            }
            Command::Shove => self.shove(),
            Command::Push { direction } => self.push(direction),
            Command::ResetVelocities => self.reset_all_velocities(),
            Command::Resize { width, height } => self.set_bounds(width, height)?,
            Command::Translate { offset } => self.translate_all(offset),
        }
        Ok(())
    }
}
