//! Ball Pit - a 2D bouncing-ball physics engine
//!
//! Core modules:
//! - `sim`: Physics stepping (bodies, wall bounces, pairwise collisions, world)
//! - `environment`: Tunable physical constants, loadable from JSON
//! - `error`: Errors for rejected spawns and configuration
//!
//! Rendering, input polling and frame pacing live outside this crate. A host
//! loop measures `dt`, calls [`World::step`] and draws from the read accessors.

pub mod environment;
pub mod error;
pub mod sim;

pub use environment::{Bounds, Environment};
pub use error::SimError;
pub use sim::{Body, BodyId, Color, Command, Contact, Direction, World};

/// Engine configuration constants
pub mod consts {
    /// Frame timestep used by the demo loop (60 Hz)
    pub const FRAME_DT: f64 = 1.0 / 60.0;

    /// Arena dimensions
    pub const ARENA_WIDTH: f64 = 800.0;
    pub const ARENA_HEIGHT: f64 = 600.0;

    /// Gravity vector, multiplied by body mass before it is applied
    pub const GRAVITY: (f64, f64) = (0.0, 9.82 / 200.0);
    /// Fraction of velocity lost to drag per second
    pub const AIR_RESISTANCE: f64 = 0.15;
    /// Fraction of normal velocity lost on every bounce
    pub const BOUNCE_RESISTANCE: f64 = 0.25;
    /// Wall bounces slower than this come to rest
    pub const STOP_VELOCITY: f64 = 75.0;
    /// Spawned bodies get a velocity in [-START_VELOCITY, START_VELOCITY] per axis
    pub const START_VELOCITY: f64 = 500.0;
    /// Velocity delta of a directional push (halved horizontally)
    pub const PUSH_FORCE: f64 = 75.0;

    /// Gap left between a clamped body and the wall it hit
    pub const WALL_EPSILON: f64 = 0.5;

    /// Radius range used by random spawns
    pub const SPAWN_RADIUS_MIN: f64 = 10.0;
    pub const SPAWN_RADIUS_MAX: f64 = 20.0;

    /// How long a body counts as "just collided" (seconds)
    pub const COLLISION_FLASH_SECS: f64 = 0.15;
}
