//! River Rush entry point
//!
//! Headless driver: runs the simulation at a fixed 60 Hz with a frame-skip
//! guard and a scripted input stream, logging the feedback events a real
//! frontend would turn into sound and screen shake. Useful for soak-testing
//! balance changes and for profiling the world tick.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use river_rush::{Config, SimEvent, TickInput, World};

const TICK: Duration = Duration::from_micros(1_000_000 / 60);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x5eed)
        });
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);

    let mut world = World::new(Config::default(), seed);
    log::info!("running {seconds}s at 60 Hz, seed {seed}");

    let mut next_tick = Instant::now();
    let total_ticks = seconds * 60;
    for n in 0..total_ticks {
        // Frame-skip guard: frames arriving early wait, late frames run
        // immediately without replaying the ones they missed
        let now = Instant::now();
        if now < next_tick {
            std::thread::sleep(next_tick - now);
        }
        next_tick += TICK;
        if Instant::now() > next_tick + TICK {
            next_tick = Instant::now();
        }

        // Scripted input: weave across the channel, dash every five seconds
        let input = TickInput {
            move_x: ((n as f32) / 90.0).sin(),
            dash_held: n % 300 < 20,
            back_dash_held: false,
        };

        if let Err(err) = world.tick(&input) {
            log::error!("tick {n} failed: {err}");
            std::process::exit(1);
        }

        for event in world.drain_events() {
            match event {
                SimEvent::PlayerHit { damage } => {
                    log::info!("hit for {damage}, health {}", world.player.health)
                }
                SimEvent::Score(points) => log::debug!("+{points} score"),
                SimEvent::StoneShattered { pos } => {
                    log::debug!("stone shattered at ({:.0}, {:.0})", pos.x, pos.y)
                }
                SimEvent::GameOver => log::info!("game over at tick {n}"),
                _ => {}
            }
        }
        world.drain_bank_changes();

        if world.is_game_over() {
            break;
        }
    }

    log::info!(
        "done: score {}, health {}, distance {:.0}",
        world.score(),
        world.player.health,
        -world.player.pos.y
    );
}
