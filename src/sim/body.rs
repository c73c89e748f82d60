//! Disk bodies and their wall handling
//!
//! Bodies never rotate. Mass is the disk area and is fixed at creation.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::WALL_EPSILON;
use crate::environment::Bounds;

/// Stable handle to a body owned by a [`World`](super::World)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Display color of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Highlight hosts use while a body has just collided
    pub const COLLISION: Color = Color::new(225, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Mass of a disk with the given radius
#[inline]
pub fn disk_mass(radius: f64) -> f64 {
    PI * radius * radius
}

/// A non-rotating disk
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    id: BodyId,
    pub(crate) pos: DVec2,
    pub(crate) vel: DVec2,
    radius: f64,
    mass: f64,
    color: Color,
    /// World time (seconds) of the last wall or pair collision
    pub(crate) last_collision: Option<f64>,
}

impl Body {
    /// Radius must already be validated by the world
    pub(crate) fn new(id: BodyId, radius: f64, pos: DVec2, vel: DVec2, color: Color) -> Self {
        debug_assert!(radius > 0.0);
        Self {
            id,
            pos,
            vel,
            radius,
            mass: disk_mass(radius),
            color,
            last_collision: None,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn velocity(&self) -> DVec2 {
        self.vel
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn last_collision(&self) -> Option<f64> {
        self.last_collision
    }

    /// True if the body collided within `window` seconds before `now`
    pub fn recently_collided(&self, now: f64, window: f64) -> bool {
        self.last_collision.is_some_and(|t| now - t < window)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// Add a velocity delta
    #[inline]
    pub fn apply_force(&mut self, force: DVec2) {
        self.vel += force;
    }

    /// Air drag for one frame
    #[inline]
    pub fn damp(&mut self, air_resistance: f64, dt: f64) {
        self.vel *= 1.0 - air_resistance * dt;
    }

    #[inline]
    pub fn integrate(&mut self, dt: f64) {
        self.pos += self.vel * dt;
    }

    /// Horizontal bounces use a radius-scaled threshold so big balls settle later
    fn stop_thresholds(&self, stop_velocity: f64) -> (f64, f64) {
        (stop_velocity * (self.radius / 10.0), stop_velocity)
    }

    /// Pre-integration wall pass
    ///
    /// A disk touching the left or top wall, or crossing the right or bottom
    /// one, has that axis' velocity reflected (damped by `bounce_resistance`)
    /// and is pushed back inside.
    /// Returns whether a wall was hit.
    pub fn resolve_wall_collision(
        &mut self,
        bounds: Bounds,
        bounce_resistance: f64,
        stop_velocity: f64,
    ) -> bool {
        let (stop_x, stop_y) = self.stop_thresholds(stop_velocity);
        let r = self.radius;
        let hit_x = reflect_axis(
            &mut self.pos.x,
            &mut self.vel.x,
            r,
            bounds.width,
            bounce_resistance,
            stop_x,
        );
        let hit_y = reflect_axis(
            &mut self.pos.y,
            &mut self.vel.y,
            r,
            bounds.height,
            bounce_resistance,
            stop_y,
        );
        hit_x || hit_y
    }

    /// Post-integration wall pass
    ///
    /// Clamps a disk that integration carried into a wall. The velocity is
    /// only reflected while it still points into that wall, so a body that
    /// already bounced this frame is not turned around again.
    pub fn confine(&mut self, bounds: Bounds, bounce_resistance: f64, stop_velocity: f64) -> bool {
        let (stop_x, stop_y) = self.stop_thresholds(stop_velocity);
        let r = self.radius;
        let hit_x = confine_axis(
            &mut self.pos.x,
            &mut self.vel.x,
            r,
            bounds.width,
            bounce_resistance,
            stop_x,
        );
        let hit_y = confine_axis(
            &mut self.pos.y,
            &mut self.vel.y,
            r,
            bounds.height,
            bounce_resistance,
            stop_y,
        );
        hit_x || hit_y
    }

    pub(crate) fn set_velocity(&mut self, vel: DVec2) {
        self.vel = vel;
    }

    pub(crate) fn translate(&mut self, offset: DVec2) {
        self.pos += offset;
    }

    /// Position-only clamp back into the arena
    pub(crate) fn keep_inside(&mut self, bounds: Bounds) {
        self.pos = bounds.contain(self.pos, self.radius);
    }
}

/// Reverse and damp a velocity component, settling it below `threshold`
#[inline]
fn bounce(vel: f64, bounce_resistance: f64, threshold: f64) -> f64 {
    let vel = -vel * (1.0 - bounce_resistance);
    if vel.abs() < threshold { 0.0 } else { vel }
}

fn reflect_axis(
    pos: &mut f64,
    vel: &mut f64,
    radius: f64,
    extent: f64,
    bounce_resistance: f64,
    threshold: f64,
) -> bool {
    let low = *pos - radius <= 0.0;
    // resting exactly on the far wall is not a hit
    let high = *pos + radius > extent;
    if !(low || high) {
        return false;
    }
    *vel = bounce(*vel, bounce_resistance, threshold);
    *pos = if low {
        radius + WALL_EPSILON
    } else {
        extent - radius - WALL_EPSILON
    };
    true
}

fn confine_axis(
    pos: &mut f64,
    vel: &mut f64,
    radius: f64,
    extent: f64,
    bounce_resistance: f64,
    threshold: f64,
) -> bool {
    if *pos - radius <= 0.0 {
        *pos = radius + WALL_EPSILON;
        if *vel < 0.0 {
            *vel = bounce(*vel, bounce_resistance, threshold);
        }
        true
    } else if *pos + radius > extent {
        *pos = extent - radius - WALL_EPSILON;
        if *vel > 0.0 {
            *vel = bounce(*vel, bounce_resistance, threshold);
        }
        true
    } else {
        false
    }
}
