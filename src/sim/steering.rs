//! Movement & steering engine
//!
//! One steering function switches on the archetype's movement policy; the
//! wall policy is applied afterwards, once a ship has fully entered the
//! playfield.

use glam::Vec2;

use super::entity::Body;
use super::state::{SteeringState, World};
use super::tick::FrameInput;
use crate::consts::EPSILON;
use crate::tuning::{MovementPolicy, WallPolicy};
use crate::{bearing, heading_of, heading_vec, lerp, rotate_toward};

/// Current travel heading, falling back to the facing when at rest
#[inline]
fn travel_heading(body: &Body) -> f32 {
    if body.vel.length_squared() > EPSILON * EPSILON {
        heading_of(body.vel)
    } else {
        body.angle
    }
}

/// Speed for the stand-off policy at `dist` from the target
pub fn stand_off_speed(
    dist: f32,
    stop_distance: f32,
    start_distance: f32,
    min_speed: f32,
    nominal: f32,
) -> f32 {
    if dist <= stop_distance {
        min_speed
    } else if dist >= start_distance {
        nominal
    } else {
        let span = start_distance - stop_distance;
        let t = if span > EPSILON {
            (dist - stop_distance) / span
        } else {
            1.0
        };
        lerp(min_speed, nominal, t)
    }
}

/// Update velocity and facing for one timestep according to `policy`
///
/// `target` is the live position being chased (the player), if any.
pub fn steer(
    body: &mut Body,
    steering: &mut SteeringState,
    policy: MovementPolicy,
    nominal_speed: f32,
    target: Option<Vec2>,
    dt: f32,
) {
    match policy {
        MovementPolicy::None => {}

        MovementPolicy::Periodic {
            turn_interval,
            turn_speed,
        } => {
            steering.retarget_timer -= dt;
            if steering.retarget_timer <= 0.0 {
                if let Some(heading) = target.and_then(|t| bearing(body.pos, t)) {
                    steering.target_heading = heading;
                }
                steering.retarget_timer = turn_interval;
            }
            let speed = body.speed();
            let heading = rotate_toward(
                travel_heading(body),
                steering.target_heading,
                turn_speed * dt,
            );
            body.vel = heading_vec(heading) * speed;
        }

        MovementPolicy::Continuous { turn_speed } => {
            if let Some(heading) = target.and_then(|t| bearing(body.pos, t)) {
                steering.target_heading = heading;
            }
            let heading = rotate_toward(
                travel_heading(body),
                steering.target_heading,
                turn_speed * dt,
            );
            body.vel = heading_vec(heading) * nominal_speed;
        }

        MovementPolicy::DistanceBased {
            stop_distance,
            start_distance,
            min_speed,
            turn_speed,
        } => {
            if let Some(target) = target {
                let offset = target - body.pos;
                let dist = offset.length();
                if dist > EPSILON {
                    let speed =
                        stand_off_speed(dist, stop_distance, start_distance, min_speed, nominal_speed);
                    body.vel = offset / dist * speed;
                    let aim = heading_of(offset);
                    steering.target_heading = aim;
                    body.angle = rotate_toward(body.angle, aim, turn_speed * dt);
                }
            }
            // Facing is decoupled from travel for this policy
            return;
        }
    }

    if body.vel.length_squared() > EPSILON * EPSILON {
        body.angle = heading_of(body.vel);
    }
}

/// Apply the edge behavior of an active ship
pub fn apply_wall_policy(body: &mut Body, policy: WallPolicy, bounds: Vec2) {
    let size = body.size();
    let max = (bounds - Vec2::splat(size)).max(Vec2::ZERO);
    match policy {
        WallPolicy::Bounce => {
            let corner = body.corner();
            if (corner.x < 0.0 && body.vel.x < 0.0) || (corner.x > max.x && body.vel.x > 0.0) {
                body.vel.x = -body.vel.x;
            }
            if (corner.y < 0.0 && body.vel.y < 0.0) || (corner.y > max.y && body.vel.y > 0.0) {
                body.vel.y = -body.vel.y;
            }
        }
        WallPolicy::Clamp => {
            let corner = body.corner().clamp(Vec2::ZERO, max);
            body.pos = corner + Vec2::splat(body.radius);
        }
        // Wrap is resolved by the lifecycle pass, Ignore never constrains
        WallPolicy::Wrap | WallPolicy::Ignore => {}
    }
}

/// Player control integration: turn, thrust, damping, cap, move, walls
pub fn update_player(world: &mut World, input: &FrameInput, dt: f32) {
    let tuning = world.tuning.clone();
    let bounds = world.bounds();
    let ship = &mut world.player.ship;
    if ship.destroyed || ship.shrink.is_active() {
        return;
    }
    let body = &mut ship.body;
    let player = &tuning.player;

    let mut turn = 0.0;
    if input.turn_left {
        turn -= 1.0;
    }
    if input.turn_right {
        turn += 1.0;
    }
    body.angle = crate::normalize_degrees(body.angle + turn * player.turn_speed * dt);

    let facing = body.facing();
    if input.thrust {
        body.vel += facing * player.thrust_accel * dt;
    }
    if input.reverse {
        body.vel -= facing * player.reverse_accel * dt;
    }
    if !input.thrust && !input.reverse {
        body.vel *= (1.0 - player.damping * dt).clamp(0.0, 1.0);
    }

    body.integrate(dt);
    apply_wall_policy(body, player.wall, bounds);
}

/// Steer, move and constrain every live enemy
pub fn update_enemies(world: &mut World, dt: f32) {
    let tuning = world.tuning.clone();
    let bounds = world.bounds();
    let target = world
        .player
        .ship
        .is_targetable()
        .then_some(world.player.ship.body.pos);

    for enemy in &mut world.enemies {
        let ship = &mut enemy.ship;
        if ship.destroyed || ship.shrink.is_active() {
            continue;
        }

        if ship.entering {
            // Ballistic until the whole hull is inside the playfield
            ship.body.integrate(dt);
            if ship.body.vel.length_squared() > EPSILON * EPSILON {
                ship.body.angle = heading_of(ship.body.vel);
            }
            if ship.body.fully_inside(bounds.x, bounds.y) {
                ship.entering = false;
                log::debug!("enemy {} entered the playfield", ship.id);
            }
            continue;
        }

        let row = tuning.enemies.get(enemy.kind);
        steer(
            &mut ship.body,
            &mut enemy.steering,
            row.movement,
            row.speed,
            target,
            dt,
        );
        ship.body.integrate(dt);
        apply_wall_policy(&mut ship.body, row.wall, bounds);
    }
}
