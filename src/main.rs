//! Ball Pit headless runner
//!
//! Steps a seeded world at a fixed 60 Hz without a window and logs how the
//! crowd settles. Usage: `ball-pit [environment.json] [seed] [balls] [seconds]`.

use ball_pit::consts::{COLLISION_FLASH_SECS, FRAME_DT};
use ball_pit::{Command, Environment, SimError, World};

/// Bodies slower than this count as resting in the summary
const RESTING_SPEED: f64 = 1.0;

fn main() {
    env_logger::init();
    log::info!("Ball Pit (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    args.get(index)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn run() -> Result<(), SimError> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let env = match args.first().filter(|s| s.as_str() != "-") {
        Some(path) => Environment::load(path)?,
        None => Environment::default(),
    };
    let seed: u64 = parse_arg(&args, 1, 12345);
    let balls: u32 = parse_arg(&args, 2, 12);
    let seconds: f64 = parse_arg(&args, 3, 10.0);

    let mut world = World::new(env, seed)?;
    log::info!(
        "World initialized with seed: {}, arena {}x{}",
        seed,
        world.bounds().width,
        world.bounds().height
    );
    world.apply(&Command::SpawnRandom { count: balls })?;

    let frames = (seconds / FRAME_DT).round() as u64;
    for frame in 1..=frames {
        world.step(FRAME_DT);

        if frame % 60 == 0 {
            let now = world.time();
            let resting = world
                .bodies()
                .iter()
                .filter(|b| b.velocity().length() < RESTING_SPEED)
                .count();
            let flashing = world
                .bodies()
                .iter()
                .filter(|b| b.recently_collided(now, COLLISION_FLASH_SECS))
                .count();
            log::info!(
                "t={:.1}s bodies={} resting={} colliding={} energy={:.0}",
                now,
                world.len(),
                resting,
                flashing,
                world.kinetic_energy()
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(world.bodies())?);
    Ok(())
}
