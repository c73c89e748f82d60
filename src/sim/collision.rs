//! Pairwise collision detection and response between disks
//!
//! Detection is a cheap box test on the center offsets, not an exact circle
//! test. Response splits the overlap evenly between both bodies, then
//! exchanges an impulse along the center line weighted by inverse mass.

use glam::DVec2;
use rand::Rng;

use super::body::Body;
use crate::environment::Environment;

/// Outcome of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Whether an impulse was exchanged
    pub hit: bool,
    /// Normal from the first body toward the second
    pub normal: DVec2,
    /// Overlap that was corrected (negative when the boxes overlap but the disks don't)
    pub overlap: f64,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
            overlap: 0.0,
        }
    }
}

/// Whether the bounding boxes of two disks overlap
#[inline]
pub fn boxes_overlap(a: &Body, b: &Body) -> bool {
    let reach = a.radius() + b.radius();
    let d = (a.pos - b.pos).abs();
    d.x < reach && d.y < reach
}

/// Crude direction for coincident centers: each component in {-1, 0, 1}, not normalized
fn fallback_normal<R: Rng>(rng: &mut R) -> DVec2 {
    DVec2::new(
        rng.random_range(-1i32..=1) as f64,
        rng.random_range(-1i32..=1) as f64,
    )
}

/// Detect and resolve a collision between two distinct bodies
///
/// Both bodies are pushed apart by half the overlap each. If they are still
/// approaching along the normal, an impulse with restitution
/// `1 - bounce_resistance` is exchanged and both are stamped with `now`.
/// Pairs that are already separating keep the positional correction only.
pub fn resolve_pair<R: Rng>(
    a: &mut Body,
    b: &mut Body,
    env: &Environment,
    now: f64,
    rng: &mut R,
) -> Contact {
    if !boxes_overlap(a, b) {
        return Contact::miss();
    }

    let delta = b.pos - a.pos;
    if env.defer_axis_aligned && (delta.x == 0.0 || delta.y == 0.0) {
        // picked up again next frame once the centers drift off-axis
        return Contact::miss();
    }

    let distance = delta.length();
    let overlap = (a.radius() + b.radius()) - distance;
    let normal = if distance != 0.0 {
        delta / distance
    } else {
        fallback_normal(rng)
    };

    let separation = normal * overlap * 0.5;
    a.pos -= separation;
    b.pos += separation;

    // positive dot: closing along the normal
    let dot = (a.vel - b.vel).dot(normal);
    if dot < 0.0 {
        return Contact {
            hit: false,
            normal,
            overlap,
        };
    }

    let restitution = 1.0 - env.bounce_resistance;
    let j = -(1.0 + restitution) * dot / (1.0 / a.mass() + 1.0 / b.mass());
    let impulse = normal * j;
    a.vel += impulse / a.mass();
    b.vel -= impulse / b.mass();

    a.last_collision = Some(now);
    b.last_collision = Some(now);

    Contact {
        hit: true,
        normal,
        overlap,
    }
}
