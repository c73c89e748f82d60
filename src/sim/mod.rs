//! Physics simulation module
//!
//! Everything that moves lives here. Stepping is deterministic for a seed:
//! - The host supplies `dt`; the world never reads a clock
//! - Seeded RNG only (spawns, shoves, degenerate collision normals)
//! - Bodies are processed in insertion order

pub mod body;
pub mod collision;
pub mod command;
pub mod world;

pub use body::{Body, BodyId, Color, disk_mass};
pub use collision::{Contact, boxes_overlap, resolve_pair};
pub use command::{Command, Direction};
pub use world::World;
