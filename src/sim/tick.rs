//! Frame driver
//!
//! Advances the world by one variable timestep. Subsystems run in a fixed
//! order so that the same seed and input stream always produce the same
//! frames.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, World};
use super::{collision, fields, laser, spawn, steering, weapons};
use crate::consts::MAX_FRAME_DT;

/// Weapon triggers held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireInput {
    pub bullet: bool,
    /// Discrete: only the press edge launches
    pub missile: bool,
    pub laser: bool,
    pub railgun: bool,
}

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub reverse: bool,
    pub fire: FireInput,
}

/// Converts wall-clock timestamps into clamped frame deltas
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Delta since the previous call, clamped to `[0, max_dt]`
    ///
    /// The first call only primes the clock and returns 0.
    pub fn advance(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }
}

/// Advance the world by `dt` seconds
///
/// A no-op once the game is over.
pub fn tick(world: &mut World, input: &FrameInput, dt: f32) {
    if world.phase == GamePhase::GameOver {
        return;
    }
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    steering::update_player(world, input, dt);
    steering::update_enemies(world, dt);

    fields::drift(world, dt);
    fields::apply_gravity(world, dt);
    fields::apply_drag(world, dt);
    fields::absorb_nebulae(world, dt);

    weapons::update_projectiles(world, dt);
    weapons::update_player_fire(world, &input.fire, dt);
    weapons::update_enemy_fire(world, dt);
    laser::update_laser(world, input.fire.laser);

    collision::resolve(world, dt);
    spawn::update_lifecycle(world, dt);

    world.frame += 1;
    world.time += dt;

    if world.player.ship.destroyed {
        world.phase = GamePhase::GameOver;
        world.player.weapons.laser.clear();
        log::info!("game over after {} frames, score {}", world.frame, world.score);
        let score = world.score;
        world.emit(GameEvent::GameOver { score });
    }
}
