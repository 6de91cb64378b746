//! Gravwell headless runner
//!
//! Drives the simulation with a scripted autopilot and streams snapshots
//! and events as JSON lines on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use gravwell::consts::SIM_DT;
use gravwell::sim::{FireInput, FrameClock, FrameInput, GameEvent, Snapshot, World, tick};
use gravwell::{Tuning, angle_delta, bearing};

#[derive(Parser, Debug)]
#[command(name = "gravwell")]
#[command(about = "Headless gravwell run: scripted pilot, JSON lines on stdout")]
struct Args {
    /// JSON tuning file (defaults are used when omitted)
    #[arg(long)]
    tuning: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long, default_value_t = 3600)]
    frames: u64,
    /// Emit a snapshot every N frames (0 = never)
    #[arg(long, default_value_t = 60)]
    every: u64,
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let tuning = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading tuning file {}", path.display()))?;
            Tuning::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Tuning::default(),
    };
    tuning.validate().context("invalid tuning")?;
    Ok(tuning)
}

/// Scripted pilot: chase the nearest enemy and shoot when lined up
fn autopilot(world: &World, frame: u64) -> FrameInput {
    let ship = &world.player.ship.body;
    let nearest = world
        .enemies
        .iter()
        .filter(|e| e.ship.is_targetable())
        .min_by(|a, b| {
            a.ship
                .body
                .pos
                .distance_squared(ship.pos)
                .total_cmp(&b.ship.body.pos.distance_squared(ship.pos))
        });

    let Some(enemy) = nearest else {
        // Nothing to shoot: drift back toward the center
        let center = world.bounds() * 0.5;
        let off = bearing(ship.pos, center).map_or(0.0, |b| angle_delta(ship.angle, b));
        return FrameInput {
            turn_left: off < -5.0,
            turn_right: off > 5.0,
            thrust: ship.pos.distance(center) > 150.0 && off.abs() < 30.0,
            ..Default::default()
        };
    };

    let off = bearing(ship.pos, enemy.ship.body.pos).map_or(0.0, |b| angle_delta(ship.angle, b));
    let dist = ship.pos.distance(enemy.ship.body.pos);
    let lined_up = off.abs() < 8.0;
    FrameInput {
        turn_left: off < -2.0,
        turn_right: off > 2.0,
        thrust: dist > 350.0 && off.abs() < 45.0,
        reverse: dist < 150.0,
        fire: FireInput {
            bullet: lined_up,
            missile: off.abs() < 30.0 && frame % 90 == 0,
            laser: lined_up && dist < 300.0,
            railgun: lined_up && dist > 300.0,
        },
    }
}

#[derive(Serialize)]
#[serde(tag = "line", rename_all = "snake_case")]
enum Line<'a> {
    Snapshot(&'a Snapshot),
    Event { frame: u64, event: &'a GameEvent },
}

fn emit(line: &Line<'_>) -> Result<()> {
    println!("{}", serde_json::to_string(line)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gravwell (headless) starting...");

    let args = Args::parse();
    let tuning = load_tuning(args.tuning.as_ref())?;
    let mut world = World::new(args.seed, Arc::new(tuning));
    log::info!("World initialized with seed: {}", args.seed);

    let mut clock = FrameClock::default();
    for frame in 0..args.frames {
        let now = frame as f64 * f64::from(SIM_DT);
        let dt = clock.advance(now);
        let input = autopilot(&world, frame);
        tick(&mut world, &input, dt);

        for event in world.drain_events() {
            emit(&Line::Event {
                frame: world.frame,
                event: &event,
            })?;
        }
        if args.every > 0 && frame % args.every == 0 {
            emit(&Line::Snapshot(&Snapshot::capture(&world)))?;
        }
        if world.is_over() {
            break;
        }
    }

    emit(&Line::Snapshot(&Snapshot::capture(&world)))?;
    log::info!(
        "Finished after {} frames ({:.1}s simulated), score {}",
        world.frame,
        world.time,
        world.score
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gravwell"]).expect("defaults parse");
        assert!(args.tuning.is_none());
        assert_eq!((args.seed, args.frames, args.every), (1, 3600, 60));
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from(["gravwell", "--seed", "9", "--frames", "120", "--tuning", "t.json"])
            .expect("flags parse");
        assert_eq!(args.seed, 9);
        assert_eq!(args.frames, 120);
        assert_eq!(args.tuning, Some(PathBuf::from("t.json")));
        assert!(Args::try_parse_from(["gravwell", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["gravwell", "--seed", "x"]).is_err());
    }
}
