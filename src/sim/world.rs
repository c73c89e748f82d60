//! World state and the per-frame step
//!
//! The world owns every body, its RNG and a clock built from the `dt`
//! values it is stepped with. Hosts hold [`BodyId`] handles only.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, BodyId, Color};
use super::collision::resolve_pair;
use crate::environment::{Bounds, Environment};
use crate::error::SimError;

/// Borrow two distinct bodies mutably
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// The simulation: environment, bodies in insertion order, RNG and clock
#[derive(Debug, Clone)]
pub struct World {
    env: Environment,
    bodies: Vec<Body>,
    seed: u64,
    rng: Pcg32,
    /// Sum of every `dt` stepped so far (seconds)
    time: f64,
    next_id: u32,
}

impl World {
    /// Create an empty world after validating the environment
    pub fn new(env: Environment, seed: u64) -> Result<Self, SimError> {
        env.validate()?;
        Ok(Self::empty(env, seed))
    }

    /// Empty world with the default environment
    pub fn with_seed(seed: u64) -> Self {
        Self::empty(Environment::default(), seed)
    }

    fn empty(env: Environment, seed: u64) -> Self {
        Self {
            env,
            bodies: Vec::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            next_id: 1,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn bounds(&self) -> Bounds {
        self.env.bounds
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulation clock in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Bodies are processed one at a time in insertion order: gravity and the
    /// wall pass, collisions against every other body, drag, integration and
    /// a second wall pass. Each ordered pair is resolved, so a pair still
    /// overlapping when its second body comes up is resolved again.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;
        let now = self.time;
        let env = &self.env;
        let bounds = env.bounds;

        for i in 0..self.bodies.len() {
            let body = &mut self.bodies[i];
            body.apply_force(env.gravity * body.mass());
            if body.resolve_wall_collision(bounds, env.bounce_resistance, env.stop_velocity) {
                body.last_collision = Some(now);
            }

            for j in 0..self.bodies.len() {
                if i == j {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.bodies, i, j);
                let contact = resolve_pair(a, b, env, now, &mut self.rng);
                if contact.hit {
                    log::trace!(
                        "t={:.3} collision {:?} <-> {:?} normal={:?}",
                        now,
                        a.id(),
                        b.id(),
                        contact.normal
                    );
                }
            }

            let body = &mut self.bodies[i];
            body.damp(env.air_resistance, dt);
            body.integrate(dt);
            if body.confine(bounds, env.bounce_resistance, env.stop_velocity) {
                body.last_collision = Some(now);
            }
        }

        // separation from later pairs can nudge an already-confined body past a wall
        for body in &mut self.bodies {
            body.keep_inside(bounds);
        }
    }

    fn validate_radius(&self, radius: f64) -> Result<(), SimError> {
        if !radius.is_finite() || radius <= 0.0 {
            log::warn!("Rejected spawn with radius {radius}");
            return Err(SimError::InvalidRadius(radius));
        }
        let bounds = self.env.bounds;
        if !bounds.fits(radius) {
            log::warn!(
                "Rejected spawn: radius {radius} does not fit {}x{}",
                bounds.width,
                bounds.height
            );
            return Err(SimError::DoesNotFit {
                radius,
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(())
    }

    fn random_color(&mut self) -> Color {
        Color::new(self.rng.random(), self.rng.random(), self.rng.random())
    }

    fn insert(&mut self, radius: f64, pos: DVec2, vel: DVec2, color: Color) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body::new(id, radius, pos, vel, color));
        log::debug!(
            "Spawned {:?} r={radius} at ({:.1}, {:.1}) v=({:.1}, {:.1}), {} bodies",
            id,
            pos.x,
            pos.y,
            vel.x,
            vel.y,
            self.bodies.len()
        );
        id
    }

    /// Spawn a body at a random spot with a random color and velocity
    pub fn add_body(&mut self, radius: f64) -> Result<BodyId, SimError> {
        self.validate_radius(radius)?;
        let bounds = self.env.bounds;
        let speed = self.env.start_velocity;

        let color = self.random_color();
        let pos = DVec2::new(
            self.rng.random_range(radius..=bounds.width - radius),
            self.rng.random_range(radius..=bounds.height - radius),
        );
        let vel = DVec2::new(
            self.rng.random_range(-speed..=speed),
            self.rng.random_range(-speed..=speed),
        );
        Ok(self.insert(radius, pos, vel, color))
    }

    /// Spawn a body at a chosen spot (clamped into the arena) with a random color
    pub fn add_body_at(
        &mut self,
        radius: f64,
        position: DVec2,
        velocity: DVec2,
    ) -> Result<BodyId, SimError> {
        self.validate_radius(radius)?;
        let pos = self.env.bounds.contain(position, radius);
        let color = self.random_color();
        Ok(self.insert(radius, pos, velocity, color))
    }

    /// Spawn a body with a radius drawn from the spawn range
    pub fn add_random_body(&mut self) -> Result<BodyId, SimError> {
        use crate::consts::{SPAWN_RADIUS_MAX, SPAWN_RADIUS_MIN};
        let radius = self.rng.random_range(SPAWN_RADIUS_MIN..=SPAWN_RADIUS_MAX);
        self.add_body(radius)
    }

    /// Remove the oldest body, if any
    pub fn remove_first(&mut self) -> Option<Body> {
        if self.bodies.is_empty() {
            return None;
        }
        let body = self.bodies.remove(0);
        log::debug!("Removed {:?}, {} bodies left", body.id(), self.bodies.len());
        Some(body)
    }

    /// Remove the newest body, if any
    pub fn remove_last(&mut self) -> Option<Body> {
        let body = self.bodies.pop()?;
        log::debug!("Removed {:?}, {} bodies left", body.id(), self.bodies.len());
        Some(body)
    }

    pub fn apply_force_to_all(&mut self, force: DVec2) {
        for body in &mut self.bodies {
            body.apply_force(force);
        }
    }

    pub fn reset_all_velocities(&mut self) {
        for body in &mut self.bodies {
            body.set_velocity(DVec2::ZERO);
        }
    }

    /// Throw every body upward with a random sideways component
    pub fn shove(&mut self) {
        let speed = self.env.start_velocity;
        for body in &mut self.bodies {
            let force = DVec2::new(
                self.rng.random_range(-speed..=speed),
                -self.rng.random_range(0.0..=speed * 5.0),
            );
            body.apply_force(force);
        }
    }

    /// Resize the arena; rejected if an existing body could no longer fit
    pub fn set_bounds(&mut self, width: f64, height: f64) -> Result<(), SimError> {
        let bounds = Bounds::new(width, height);
        bounds.validate()?;
        if let Some(body) = self.bodies.iter().find(|b| !bounds.fits(b.radius())) {
            return Err(SimError::DoesNotFit {
                radius: body.radius(),
                width,
                height,
            });
        }
        log::debug!(
            "Arena resized {}x{} -> {width}x{height}",
            self.env.bounds.width,
            self.env.bounds.height
        );
        self.env.bounds = bounds;
        Ok(())
    }

    /// Shift every body, e.g. to keep them still on screen while the window moves
    pub fn translate_all(&mut self, offset: DVec2) {
        for body in &mut self.bodies {
            body.translate(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FRAME_DT, WALL_EPSILON};

    /// No gravity, no drag, elastic bounces
    fn frictionless() -> Environment {
        Environment {
            gravity: DVec2::ZERO,
            air_resistance: 0.0,
            bounce_resistance: 0.0,
            ..Environment::default()
        }
    }

    #[test]
    fn test_rejects_bad_radius() {
        let mut world = World::with_seed(1);
        for r in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(world.add_body(r), Err(SimError::InvalidRadius(_))));
        }
        assert!(matches!(
            world.add_body(400.0),
            Err(SimError::DoesNotFit { .. })
        ));
        assert!(world.is_empty());
    }

    #[test]
    fn test_add_body_in_bounds() {
        let mut world = World::with_seed(42);
        for _ in 0..50 {
            let id = world.add_random_body().unwrap();
            let body = world.body(id).unwrap();
            let r = body.radius();
            assert!((10.0..=20.0).contains(&r));
            assert!(world.bounds().contains(body.position(), r));
            assert!(body.velocity().x.abs() <= 500.0);
            assert!(body.velocity().y.abs() <= 500.0);
            assert_eq!(body.last_collision(), None);
        }
        assert_eq!(world.len(), 50);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut world = World::with_seed(3);
        let a = world.add_body(10.0).unwrap();
        world.remove_last();
        let b = world.add_body(10.0).unwrap();
        assert_ne!(a, b);
        assert!(world.body(a).is_none());
    }

    #[test]
    fn test_remove_by_insertion_order() {
        let mut world = World::with_seed(5);
        let first = world.add_body(10.0).unwrap();
        let middle = world.add_body(12.0).unwrap();
        let last = world.add_body(14.0).unwrap();

        assert_eq!(world.remove_first().map(|b| b.id()), Some(first));
        assert_eq!(world.remove_last().map(|b| b.id()), Some(last));
        assert_eq!(world.bodies()[0].id(), middle);
        assert!(world.remove_last().is_some());

        assert!(world.remove_first().is_none());
        assert!(world.remove_last().is_none());
    }

    #[test]
    fn test_head_on_pair_swaps_velocities() {
        let mut world = World::new(frictionless(), 1).unwrap();
        let a = world
            .add_body_at(10.0, DVec2::new(390.0, 300.0), DVec2::new(100.0, 0.0))
            .unwrap();
        let b = world
            .add_body_at(10.0, DVec2::new(409.0, 300.0), DVec2::new(-100.0, 0.0))
            .unwrap();

        world.step(1.0 / 600.0);

        let (a, b) = (world.body(a).unwrap(), world.body(b).unwrap());
        let gap = (b.position() - a.position()).length();
        assert!(gap >= a.radius() + b.radius());
        assert!((a.velocity().x + 100.0).abs() < 1e-9);
        assert!((b.velocity().x - 100.0).abs() < 1e-9);
        assert_eq!(a.velocity().y, 0.0);
        assert_eq!(a.last_collision(), Some(world.time()));
    }

    #[test]
    fn test_falling_ball_settles_on_floor() {
        let mut world = World::with_seed(9);
        let id = world
            .add_body_at(20.0, DVec2::new(400.0, 0.0), DVec2::ZERO)
            .unwrap();
        let floor = world.bounds().height - 20.0;

        let mut settled_at = None;
        for frame in 0..3000 {
            world.step(FRAME_DT);
            let body = world.body(id).unwrap();
            if body.velocity().y == 0.0 && (body.position().y - floor).abs() <= 1.0 {
                settled_at = Some(frame);
                break;
            }
        }
        assert!(settled_at.is_some(), "ball never came to rest");

        let rest = world.body(id).unwrap().position();
        for _ in 0..600 {
            world.step(FRAME_DT);
            let body = world.body(id).unwrap();
            assert_eq!(body.velocity(), DVec2::ZERO);
            assert_eq!(body.position(), rest);
        }
    }

    #[test]
    fn test_rest_state_is_idempotent_without_gravity() {
        let mut world = World::new(
            Environment {
                gravity: DVec2::ZERO,
                ..Environment::default()
            },
            2,
        )
        .unwrap();
        let floor = world.bounds().height - 15.0 - WALL_EPSILON;
        let id = world
            .add_body_at(15.0, DVec2::new(200.0, floor), DVec2::ZERO)
            .unwrap();

        for _ in 0..500 {
            world.step(FRAME_DT);
        }
        let body = world.body(id).unwrap();
        assert_eq!(body.position(), DVec2::new(200.0, floor));
        assert_eq!(body.velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_body_on_floor_is_left_alone() {
        let mut world = World::new(
            Environment {
                gravity: DVec2::ZERO,
                ..Environment::default()
            },
            2,
        )
        .unwrap();
        let (w, h) = (world.bounds().width, world.bounds().height);
        let floor = world
            .add_body_at(15.0, DVec2::new(200.0, h - 15.0), DVec2::ZERO)
            .unwrap();
        let corner = world
            .add_body_at(15.0, DVec2::new(w - 15.0, h - 15.0), DVec2::ZERO)
            .unwrap();

        for _ in 0..120 {
            world.step(FRAME_DT);
        }
        let body = world.body(floor).unwrap();
        assert_eq!(body.position(), DVec2::new(200.0, h - 15.0));
        assert_eq!(body.velocity(), DVec2::ZERO);
        assert_eq!(body.last_collision(), None);

        let body = world.body(corner).unwrap();
        assert_eq!(body.position(), DVec2::new(w - 15.0, h - 15.0));
        assert_eq!(body.last_collision(), None);
    }

    #[test]
    fn test_crowd_stays_in_bounds() {
        let mut world = World::with_seed(1234);
        for _ in 0..40 {
            world.add_random_body().unwrap();
        }
        for frame in 0..1200 {
            if frame % 300 == 0 {
                world.shove();
            }
            world.step(FRAME_DT);
            for body in world.bodies() {
                assert!(
                    world.bounds().contains(body.position(), body.radius()),
                    "{:?} escaped at frame {frame}: {:?}",
                    body.id(),
                    body.position()
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut world = World::with_seed(seed);
            for _ in 0..10 {
                world.add_random_body().unwrap();
            }
            for _ in 0..240 {
                world.step(FRAME_DT);
            }
            world
                .bodies()
                .iter()
                .map(|b| (b.position(), b.velocity()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(77), run(77));
        assert_ne!(run(77), run(78));
    }

    #[test]
    fn test_with_seed_matches_default_world() {
        let run = |mut world: World| {
            assert!(world.is_empty());
            assert_eq!(world.time(), 0.0);
            let id = world.add_random_body().unwrap();
            assert_eq!(id, BodyId(1));
            (world.seed(), world.bodies()[0].position())
        };
        assert_eq!(
            run(World::with_seed(9)),
            run(World::new(Environment::default(), 9).unwrap())
        );
    }

    #[test]
    fn test_clock_accumulates_dt() {
        let mut world = World::with_seed(0);
        world.step(0.25);
        world.step(0.5);
        assert!((world.time() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_bulk_commands() {
        let mut world = World::new(frictionless(), 8).unwrap();
        let id = world
            .add_body_at(10.0, DVec2::new(100.0, 100.0), DVec2::new(5.0, 5.0))
            .unwrap();

        world.apply_force_to_all(DVec2::new(10.0, -20.0));
        assert_eq!(world.body(id).unwrap().velocity(), DVec2::new(15.0, -15.0));

        world.reset_all_velocities();
        assert_eq!(world.body(id).unwrap().velocity(), DVec2::ZERO);

        world.shove();
        let v = world.body(id).unwrap().velocity();
        assert!(v.x.abs() <= 500.0);
        assert!((-2500.0..=0.0).contains(&v.y));
    }

    #[test]
    fn test_resize_and_translate() {
        let mut world = World::with_seed(4);
        let id = world
            .add_body_at(20.0, DVec2::new(100.0, 100.0), DVec2::ZERO)
            .unwrap();

        assert!(world.set_bounds(30.0, 600.0).is_err());
        assert!(world.set_bounds(-1.0, 600.0).is_err());
        world.set_bounds(1024.0, 768.0).unwrap();
        assert_eq!(world.bounds(), Bounds::new(1024.0, 768.0));

        world.translate_all(DVec2::new(-15.0, 40.0));
        assert_eq!(world.body(id).unwrap().position(), DVec2::new(85.0, 140.0));
    }

    #[test]
    fn test_add_body_at_clamps_into_arena() {
        let mut world = World::with_seed(6);
        let id = world
            .add_body_at(10.0, DVec2::new(-50.0, 900.0), DVec2::ZERO)
            .unwrap();
        assert_eq!(world.body(id).unwrap().position(), DVec2::new(10.0, 590.0));
    }
}
