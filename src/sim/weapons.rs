//! Weapon systems: firing, projectile flight, missile guidance, railgun
//! kinetics
//!
//! Every projectile inherits the shooter's velocity at launch. The laser
//! lives in its own module since it is a trace, not a body.

use glam::Vec2;

use super::entity::{Body, EntityId, Faction};
use super::state::{Bullet, GameEvent, Missile, RailgunRound, World};
use super::tick::FireInput;
use crate::consts::EPSILON;
use crate::tuning::{ExplosionSize, MissileTuning, RailgunTuning, WeaponKind};
use crate::{angle_delta, bearing, cosine_ease, heading_vec, lerp, rotate_toward, rotate_vec};

/// Spawn a bullet at `mount` flying along `heading`
pub fn fire_bullet(
    world: &mut World,
    owner: Faction,
    fired_by: EntityId,
    mount: Vec2,
    shooter_vel: Vec2,
    heading: f32,
) -> EntityId {
    let id = world.next_entity_id();
    let t = &world.tuning.bullet;
    let (speed, damage) = match owner {
        Faction::Player => (t.player_speed, t.player_damage),
        Faction::Enemy => (t.enemy_speed, t.enemy_damage),
    };
    let mut body = Body::new(mount, heading_vec(heading) * speed + shooter_vel, t.radius, t.max_speed);
    body.angle = heading;
    body.cap_speed();
    world.bullets.push(Bullet {
        id,
        body,
        damage,
        owner,
        fired_by,
        age: 0.0,
        destroyed: false,
    });
    id
}

/// Spawn a missile; it flies unarmed and straight until the arming delay
pub fn fire_missile(
    world: &mut World,
    owner: Faction,
    fired_by: EntityId,
    mount: Vec2,
    shooter_vel: Vec2,
    heading: f32,
) -> EntityId {
    let id = world.next_entity_id();
    let t = &world.tuning.missile;
    let mut body = Body::new(
        mount,
        heading_vec(heading) * t.launch_speed + shooter_vel,
        t.radius,
        t.max_speed,
    );
    body.angle = heading;
    body.cap_speed();
    world.missiles.push(Missile {
        id,
        body,
        owner,
        fired_by,
        age: 0.0,
        thrust_speed: t.launch_speed,
        drift: shooter_vel,
        target: None,
        destroyed: false,
    });
    id
}

pub fn fire_railgun(
    world: &mut World,
    owner: Faction,
    fired_by: EntityId,
    mount: Vec2,
    shooter_vel: Vec2,
    heading: f32,
) -> EntityId {
    let id = world.next_entity_id();
    let t = &world.tuning.railgun;
    let mut body = Body::new(
        mount,
        heading_vec(heading) * t.muzzle_speed + shooter_vel,
        t.radius,
        t.max_speed,
    );
    body.angle = heading;
    body.cap_speed();
    let damage = railgun_damage(body.speed(), t);
    world.rounds.push(RailgunRound {
        id,
        body,
        owner,
        fired_by,
        damage,
        penetrating: t.penetrating,
        slow_time: 0.0,
        pierced: Vec::new(),
        destroyed: false,
    });
    id
}

/// Launch one shot of `weapon` from a ship's mount along its facing
///
/// Returns the new projectile id. The laser is a continuous trace and has
/// no projectile, so it yields `None`.
pub fn fire_weapon(
    world: &mut World,
    weapon: WeaponKind,
    owner: Faction,
    fired_by: EntityId,
    body: &Body,
    mount_offset: f32,
) -> Option<EntityId> {
    let mount = body.mount(mount_offset);
    match weapon {
        WeaponKind::Bullet => Some(fire_bullet(world, owner, fired_by, mount, body.vel, body.angle)),
        WeaponKind::Missile => Some(fire_missile(world, owner, fired_by, mount, body.vel, body.angle)),
        WeaponKind::Railgun => Some(fire_railgun(world, owner, fired_by, mount, body.vel, body.angle)),
        WeaponKind::Laser => None,
    }
}

/// Kinetic damage of a round travelling at `speed`: `min(k·v², cap)`
#[inline]
pub fn railgun_damage(speed: f32, t: &RailgunTuning) -> f32 {
    (t.energy_coefficient * speed * speed).min(t.max_damage)
}

/// Velocity of a round after punching through a target
///
/// `jitter` in [-1, 1] picks the deflection direction and share. Returns
/// `None` when the target soaks up all of the round's damage.
pub fn penetrated_velocity(
    vel: Vec2,
    damage: f32,
    target_health: f32,
    max_deflection: f32,
    jitter: f32,
) -> Option<Vec2> {
    if damage <= target_health || damage <= 0.0 {
        return None;
    }
    let old_speed = vel.length();
    if old_speed <= EPSILON {
        return None;
    }
    let new_speed = old_speed * ((damage - target_health) / damage).sqrt();
    let deflection = jitter.clamp(-1.0, 1.0) * max_deflection * (1.0 - new_speed / old_speed);
    Some(rotate_vec(vel / old_speed * new_speed, deflection))
}

/// Acquisition range for a target `off_axis` degrees from the heading
///
/// `None` beyond the max half-angle: such targets are never selected.
pub fn acquisition_range(off_axis: f32, t: &MissileTuning) -> Option<f32> {
    let off = off_axis.abs();
    if off > t.max_half_angle {
        return None;
    }
    if off <= t.front_half_angle {
        return Some(t.front_range);
    }
    let span = t.max_half_angle - t.front_half_angle;
    let ease = if span > EPSILON {
        cosine_ease((off - t.front_half_angle) / span)
    } else {
        1.0
    };
    Some(lerp(t.front_range, t.side_range, ease))
}

/// Guidance score of a target, higher is better; `None` when out of reach
pub fn score_target(missile_pos: Vec2, heading: f32, target_pos: Vec2, t: &MissileTuning) -> Option<f32> {
    let dist = missile_pos.distance(target_pos);
    let off = bearing(missile_pos, target_pos).map_or(0.0, |b| angle_delta(heading, b).abs());
    let range = acquisition_range(off, t)?;
    if range <= 0.0 || dist > range {
        return None;
    }
    let max_half = t.max_half_angle.max(EPSILON);
    Some(t.distance_weight * (1.0 - dist / range) + t.angle_weight * (1.0 - off / max_half))
}

/// Best opposing ship for an armed missile this frame
fn select_target(world: &World, missile: &Missile) -> Option<(EntityId, Vec2)> {
    let t = &world.tuning.missile;
    let prey = missile.owner.opposing();
    let candidates = std::iter::once(&world.player.ship)
        .chain(world.enemies.iter().map(|e| &e.ship))
        .filter(|s| s.faction == prey && s.is_targetable())
        .map(|s| (s.id, s.body.pos));

    let mut best: Option<(f32, EntityId, Vec2)> = None;
    for (id, pos) in candidates {
        if let Some(score) = score_target(missile.body.pos, missile.body.angle, pos, t) {
            if best.is_none_or(|(top, _, _)| score > top) {
                best = Some((score, id, pos));
            }
        }
    }
    best.map(|(_, id, pos)| (id, pos))
}

/// Advance bullets, railgun rounds and missiles by one timestep
pub fn update_projectiles(world: &mut World, dt: f32) {
    let tuning = world.tuning.clone();

    for bullet in world.bullets.iter_mut().filter(|b| !b.destroyed) {
        bullet.age += dt;
        bullet.body.integrate(dt);
        if bullet.age >= tuning.bullet.lifetime {
            bullet.destroyed = true;
        }
    }

    let rt = &tuning.railgun;
    for round in world.rounds.iter_mut().filter(|r| !r.destroyed) {
        round.body.integrate(dt);
        let speed = round.body.speed();
        round.damage = railgun_damage(speed, rt);
        if speed < rt.slow_threshold {
            round.slow_time += dt;
            if round.slow_time > rt.slow_timeout {
                log::trace!("railgun round {} stalled", round.id);
                round.destroyed = true;
            }
        } else {
            round.slow_time = 0.0;
        }
    }

    let mt = &tuning.missile;
    for i in 0..world.missiles.len() {
        if world.missiles[i].destroyed {
            continue;
        }
        let aim = if world.missiles[i].is_armed(mt.arming_delay) {
            select_target(world, &world.missiles[i])
        } else {
            None
        };

        let missile = &mut world.missiles[i];
        missile.age += dt;
        missile.thrust_speed = (missile.thrust_speed + mt.accel * dt).min(mt.max_speed);
        missile.target = aim.map(|(id, _)| id);
        if let Some(heading) = aim.and_then(|(_, pos)| bearing(missile.body.pos, pos)) {
            missile.body.angle = rotate_toward(missile.body.angle, heading, mt.turn_rate * dt);
        }
        missile.body.vel = heading_vec(missile.body.angle) * missile.thrust_speed + missile.drift;
        missile.body.integrate(dt);

        if missile.age >= mt.lifetime {
            missile.destroyed = true;
            let pos = missile.body.pos;
            world.emit(GameEvent::Explosion {
                pos,
                size: ExplosionSize::Small,
            });
        }
    }
}

/// Enemy weapon cooldowns, energy regeneration and automatic fire
pub fn update_enemy_fire(world: &mut World, dt: f32) {
    let tuning = world.tuning.clone();
    let mut shots: Vec<(usize, WeaponKind, f32)> = Vec::new();

    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if let Some(pool) = enemy.energy.as_mut() {
            pool.regen(dt);
        }
        let ship = &enemy.ship;
        if ship.entering || !ship.is_targetable() {
            continue;
        }
        enemy.shoot_cooldown -= dt;
        if enemy.shoot_cooldown > 0.0 {
            continue;
        }
        if enemy.energy.is_some_and(|pool| !pool.can_fire()) {
            continue;
        }
        let row = tuning.enemies.get(enemy.kind);
        shots.push((i, row.weapon, row.mount_offset));
    }

    for (i, weapon, mount_offset) in shots {
        let row = *tuning.enemies.get(world.enemies[i].kind);
        let body = world.enemies[i].ship.body;
        let id = world.enemies[i].ship.id;
        if fire_weapon(world, weapon, Faction::Enemy, id, &body, mount_offset).is_none() {
            log::warn!("enemy {id} has no projectile weapon; skipping shot");
        }
        let cooldown = super::uniform(&mut world.rng, row.cooldown_min, row.cooldown_max);
        let enemy = &mut world.enemies[i];
        enemy.shoot_cooldown = cooldown;
        if let Some(pool) = enemy.energy.as_mut() {
            pool.spend();
        }
    }
}

/// Player trigger handling for the projectile slots
///
/// The missile trigger fires on the press edge only; bullets and railgun
/// repeat while held. The laser is traced separately.
pub fn update_player_fire(world: &mut World, fire: &FireInput, dt: f32) {
    let tuning = world.tuning.clone();
    let pt = &tuning.player;

    let weapons = &mut world.player.weapons;
    weapons.bullet_cooldown = (weapons.bullet_cooldown - dt).max(0.0);
    weapons.missile_cooldown = (weapons.missile_cooldown - dt).max(0.0);
    weapons.railgun_cooldown = (weapons.railgun_cooldown - dt).max(0.0);
    let pressed = fire.missile && !weapons.missile_latch;
    weapons.missile_latch = fire.missile;

    let ship = &world.player.ship;
    if !ship.is_targetable() {
        return;
    }
    let body = ship.body;
    let id = ship.id;
    let rate = world.player.weapons.fire_rate_multiplier();

    if fire.bullet && world.player.weapons.bullet_cooldown <= 0.0 {
        fire_weapon(world, WeaponKind::Bullet, Faction::Player, id, &body, pt.mount_offset);
        world.player.weapons.bullet_cooldown = pt.bullet_cooldown / rate;
    }
    if pressed && world.player.weapons.missile_cooldown <= 0.0 {
        fire_weapon(world, WeaponKind::Missile, Faction::Player, id, &body, pt.mount_offset);
        world.player.weapons.missile_cooldown = pt.missile_cooldown / rate;
    }
    if fire.railgun && world.player.weapons.railgun_cooldown <= 0.0 {
        fire_weapon(world, WeaponKind::Railgun, Faction::Player, id, &body, pt.mount_offset);
        world.player.weapons.railgun_cooldown = pt.railgun_cooldown / rate;
    }
}
