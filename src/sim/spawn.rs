//! Spawning and lifecycle orchestration
//!
//! Runs after the collision passes: shrink animations, countdown timers,
//! offscreen culling and wrapping, transient spawns, then the final prune.

use glam::Vec2;
use rand::Rng;

use super::entity::EntityId;
use super::state::{NebulaCloud, World};
use super::uniform;
use crate::tuning::{EnemyKind, WallPolicy};

/// Screen edge a transient body enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..4) {
            0 => Edge::Top,
            1 => Edge::Right,
            2 => Edge::Bottom,
            _ => Edge::Left,
        }
    }
}

/// A point `outset` px outside a random edge of the playfield
fn edge_point(rng: &mut impl Rng, bounds: Vec2, outset: f32) -> Vec2 {
    match Edge::random(rng) {
        Edge::Top => Vec2::new(uniform(rng, 0.0, bounds.x), -outset),
        Edge::Right => Vec2::new(bounds.x + outset, uniform(rng, 0.0, bounds.y)),
        Edge::Bottom => Vec2::new(uniform(rng, 0.0, bounds.x), bounds.y + outset),
        Edge::Left => Vec2::new(-outset, uniform(rng, 0.0, bounds.y)),
    }
}

/// A random point in the central `region` fraction of the playfield
fn aim_point(rng: &mut impl Rng, bounds: Vec2, region: f32) -> Vec2 {
    let half = bounds * region.clamp(0.0, 1.0) * 0.5;
    let center = bounds * 0.5;
    Vec2::new(
        uniform(rng, center.x - half.x, center.x + half.x),
        uniform(rng, center.y - half.y, center.y + half.y),
    )
}

/// Velocity of magnitude `speed` from `from` toward `to`
fn toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Step `pos` toward `target` by at most `max_step`
fn pull(pos: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let offset = target - pos;
    let dist = offset.length();
    if dist <= max_step {
        target
    } else {
        pos + offset / dist * max_step
    }
}

/// Spawn an enemy just outside a random edge, flying into the playfield
pub fn spawn_enemy(world: &mut World, kind: EnemyKind) -> EntityId {
    let row = *world.tuning.enemies.get(kind);
    let bounds = world.bounds();
    let region = world.tuning.playfield.aim_region;
    let pos = edge_point(&mut world.rng, bounds, row.radius + 1.0);
    let aim = aim_point(&mut world.rng, bounds, region);
    let id = world.add_enemy(kind, pos, toward(pos, aim, row.speed));
    if let Some(enemy) = world.enemies.last_mut() {
        enemy.ship.entering = true;
    }
    log::info!("spawned {kind:?} {id} at {pos}");
    id
}

pub fn spawn_meteor(world: &mut World) -> EntityId {
    let t = world.tuning.meteors.clone();
    let bounds = world.bounds();
    let region = world.tuning.playfield.aim_region;
    let radius = uniform(&mut world.rng, t.radius_min, t.radius_max);
    let speed = uniform(&mut world.rng, t.speed_min, t.speed_max);
    let pos = edge_point(&mut world.rng, bounds, radius);
    let aim = aim_point(&mut world.rng, bounds, region);
    world.add_meteor(pos, toward(pos, aim, speed), radius)
}

pub fn spawn_planet(world: &mut World) -> EntityId {
    let t = world.tuning.planets.clone();
    let bounds = world.bounds();
    let radius = uniform(&mut world.rng, t.radius_min, t.radius_max);
    let strength = uniform(&mut world.rng, t.strength_min, t.strength_max);
    let speed = uniform(&mut world.rng, t.drift_min, t.drift_max);
    let pos = edge_point(&mut world.rng, bounds, radius);
    let aim = aim_point(&mut world.rng, bounds, 1.0);
    world.add_planet(pos, toward(pos, aim, speed), radius, strength)
}

pub fn spawn_black_hole(world: &mut World) -> EntityId {
    let t = world.tuning.black_holes.clone();
    let bounds = world.bounds();
    let speed = uniform(&mut world.rng, t.drift_min, t.drift_max);
    let pos = edge_point(&mut world.rng, bounds, t.radius);
    let aim = aim_point(&mut world.rng, bounds, 1.0);
    world.add_black_hole(pos, toward(pos, aim, speed))
}

pub fn spawn_nebula(world: &mut World) -> EntityId {
    let t = world.tuning.nebula.clone();
    let bounds = world.bounds();
    let count = if t.clouds_max > t.clouds_min {
        world.rng.random_range(t.clouds_min..=t.clouds_max)
    } else {
        t.clouds_min
    };
    let clouds: Vec<NebulaCloud> = (0..count.max(1))
        .map(|_| {
            let angle = uniform(&mut world.rng, 0.0, 360.0);
            let reach = uniform(&mut world.rng, 0.0, t.spread);
            NebulaCloud {
                offset: crate::heading_vec(angle) * reach,
                radius: uniform(&mut world.rng, t.cloud_radius_min, t.cloud_radius_max),
            }
        })
        .collect();
    let speed = uniform(&mut world.rng, t.drift_min, t.drift_max);
    let pos = edge_point(&mut world.rng, bounds, t.spread + t.cloud_radius_max);
    let aim = aim_point(&mut world.rng, bounds, 1.0);
    world.add_nebula(pos, toward(pos, aim, speed), clouds)
}

/// Count down spawn timers and add transients while under the caps
pub fn update_spawns(world: &mut World, dt: f32) {
    let limits = world.limits.clone();

    world.timers.enemy -= dt;
    if world.timers.enemy <= 0.0 {
        world.timers.enemy = limits.enemy_interval;
        let live = world.enemies.iter().filter(|e| !e.ship.destroyed).count();
        if live < limits.max_enemies && !limits.enemy_kinds.is_empty() {
            let pick = world.rng.random_range(0..limits.enemy_kinds.len());
            spawn_enemy(world, limits.enemy_kinds[pick]);
        }
    }

    world.timers.meteor -= dt;
    if world.timers.meteor <= 0.0 {
        world.timers.meteor = limits.meteor_interval;
        if world.meteors.iter().filter(|m| !m.destroyed).count() < limits.max_meteors {
            spawn_meteor(world);
        }
    }

    world.timers.planet -= dt;
    if world.timers.planet <= 0.0 {
        world.timers.planet = limits.planet_interval;
        if world.planets.iter().filter(|p| !p.destroyed).count() < limits.max_planets {
            spawn_planet(world);
        }
    }

    world.timers.black_hole -= dt;
    if world.timers.black_hole <= 0.0 {
        world.timers.black_hole = limits.black_hole_interval;
        if world.black_holes.iter().filter(|b| !b.destroyed).count() < limits.max_black_holes {
            spawn_black_hole(world);
        }
    }

    world.timers.nebula -= dt;
    if world.timers.nebula <= 0.0 {
        world.timers.nebula = limits.nebula_interval;
        if world.nebulae.len() < limits.max_nebulae {
            spawn_nebula(world);
        }
    }
}

/// Advance absorption: drag shrinking bodies into their hole, remove at 1.0
pub fn update_shrinking(world: &mut World, dt: f32) {
    let duration = world.tuning.lifecycle.shrink_duration;
    let step = world.tuning.lifecycle.shrink_pull * dt;

    let player = &mut world.player.ship;
    if !player.destroyed {
        if let Some(into) = player.shrink.into {
            player.body.pos = pull(player.body.pos, into, step);
        }
        if player.shrink.advance(dt, duration) {
            log::info!("player swallowed by a black hole");
            player.destroyed = true;
        }
    }
    for enemy in world.enemies.iter_mut().filter(|e| !e.ship.destroyed) {
        let ship = &mut enemy.ship;
        if let Some(into) = ship.shrink.into {
            ship.body.pos = pull(ship.body.pos, into, step);
        }
        if ship.shrink.advance(dt, duration) {
            ship.destroyed = true;
        }
    }
    for meteor in world.meteors.iter_mut().filter(|m| !m.destroyed) {
        if let Some(into) = meteor.shrink.into {
            meteor.body.pos = pull(meteor.body.pos, into, step);
        }
        if meteor.shrink.advance(dt, duration) {
            meteor.destroyed = true;
        }
    }
    for planet in world.planets.iter_mut().filter(|p| !p.destroyed) {
        if let Some(into) = planet.shrink.into {
            planet.body.pos = pull(planet.body.pos, into, step);
        }
        if planet.shrink.advance(dt, duration) {
            planet.destroyed = true;
        }
    }
}

/// Damage flashes, pickup ages and the rate-of-fire boost
pub fn update_timers(world: &mut World, dt: f32) {
    let ship = &mut world.player.ship;
    ship.flash = (ship.flash - dt).max(0.0);
    for enemy in &mut world.enemies {
        enemy.ship.flash = (enemy.ship.flash - dt).max(0.0);
    }

    let weapons = &mut world.player.weapons;
    if let Some(boost) = weapons.rapid_fire.as_mut() {
        boost.remaining -= dt;
        if boost.remaining <= 0.0 {
            weapons.rapid_fire = None;
            log::debug!("rapid fire expired");
        }
    }

    let lifetime = world.tuning.pickups.lifetime;
    for pickup in world.pickups.iter_mut().filter(|p| !p.collected) {
        pickup.age += dt;
        if pickup.age >= lifetime {
            // Expired pickups leave through the same flag as collected ones
            pickup.collected = true;
        }
    }
}

/// Wrap a body that has fully left one side onto the opposite side
fn wrap_body(pos: Vec2, radius: f32, bounds: Vec2) -> Vec2 {
    let mut out = pos;
    if pos.x < -radius {
        out.x = bounds.x + radius;
    } else if pos.x > bounds.x + radius {
        out.x = -radius;
    }
    if pos.y < -radius {
        out.y = bounds.y + radius;
    } else if pos.y > bounds.y + radius {
        out.y = -radius;
    }
    out
}

/// Remove or wrap everything that has left the playfield
pub fn cull_offscreen(world: &mut World) {
    let bounds = world.bounds();
    let (w, h) = (bounds.x, bounds.y);
    let near = world.tuning.playfield.offscreen_margin;
    let far = world.tuning.playfield.field_margin;
    let tuning = world.tuning.clone();

    for bullet in &mut world.bullets {
        if bullet.body.beyond(w, h, 0.0) {
            bullet.destroyed = true;
        }
    }
    for round in &mut world.rounds {
        if round.body.beyond(w, h, 0.0) {
            round.destroyed = true;
        }
    }
    for missile in &mut world.missiles {
        if missile.body.beyond(w, h, 0.0) {
            missile.destroyed = true;
        }
    }

    for enemy in world.enemies.iter_mut().filter(|e| !e.ship.destroyed) {
        let wall = tuning.enemies.get(enemy.kind).wall;
        let body = &mut enemy.ship.body;
        if !enemy.ship.entering && wall == WallPolicy::Wrap {
            body.pos = wrap_body(body.pos, body.radius, bounds);
        }
        let margin = if wall == WallPolicy::Ignore { near } else { far };
        if body.beyond(w, h, margin) {
            log::debug!("enemy {} left the playfield", enemy.ship.id);
            enemy.ship.destroyed = true;
        }
    }

    for meteor in &mut world.meteors {
        if meteor.body.beyond(w, h, near + meteor.body.radius) {
            meteor.destroyed = true;
        }
    }
    for planet in &mut world.planets {
        if planet.body.beyond(w, h, far + planet.body.radius) {
            planet.destroyed = true;
        }
    }
    for hole in &mut world.black_holes {
        let p = hole.pos;
        let margin = far + hole.radius;
        if p.x < -margin || p.y < -margin || p.x > w + margin || p.y > h + margin {
            hole.destroyed = true;
        }
    }
}

/// End-of-frame lifecycle pass
pub fn update_lifecycle(world: &mut World, dt: f32) {
    update_shrinking(world, dt);
    update_timers(world, dt);
    cull_offscreen(world);
    update_spawns(world, dt);
    world.prune();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{PickupKind, RapidFire};
    use crate::sim::weapons::fire_bullet;
    use crate::sim::Faction;
    use crate::tuning::SpawnLimits;

    fn quiet_world() -> World {
        let mut world = World::with_default_tuning(17);
        world.set_spawn_limits(SpawnLimits::none());
        world
    }

    #[test]
    fn test_enemy_spawns_outside_and_entering() {
        let mut world = quiet_world();
        world.set_spawn_limits(SpawnLimits {
            max_enemies: 1,
            enemy_interval: 1.0,
            enemy_kinds: vec![EnemyKind::Scout],
            ..SpawnLimits::none()
        });
        world.timers.enemy = 0.0;
        update_spawns(&mut world, 0.1);

        assert_eq!(world.enemies.len(), 1);
        let enemy = &world.enemies[0];
        assert!(enemy.ship.entering);
        let bounds = world.bounds();
        assert!(!enemy.ship.body.fully_inside(bounds.x, bounds.y));
        // Heading for the central region
        let to_center = bounds * 0.5 - enemy.ship.body.pos;
        assert!(enemy.ship.body.vel.dot(to_center) > 0.0);
        let speed = world.tuning.enemies.get(EnemyKind::Scout).speed;
        assert!((enemy.ship.body.speed() - speed).abs() < 1e-2);
    }

    #[test]
    fn test_spawn_cap_respected() {
        let mut world = quiet_world();
        world.set_spawn_limits(SpawnLimits {
            max_meteors: 2,
            meteor_interval: 0.1,
            ..SpawnLimits::none()
        });
        for _ in 0..20 {
            world.timers.meteor = 0.0;
            update_spawns(&mut world, 0.1);
        }
        assert_eq!(world.meteors.len(), 2);
    }

    #[test]
    fn test_no_kinds_means_no_enemies() {
        let mut world = quiet_world();
        world.set_spawn_limits(SpawnLimits {
            max_enemies: 5,
            ..SpawnLimits::none()
        });
        world.timers.enemy = 0.0;
        update_spawns(&mut world, 0.1);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_nebula_spawn_has_clouds() {
        let mut world = quiet_world();
        spawn_nebula(&mut world);
        let t = &world.tuning.nebula;
        let nebula = &world.nebulae[0];
        assert!(nebula.clouds.len() as u32 >= t.clouds_min);
        assert!(nebula.clouds.len() as u32 <= t.clouds_max);
        assert!(nebula.clouds.iter().all(|c| c.radius >= t.cloud_radius_min));
    }

    #[test]
    fn test_shrink_completes_and_removes() {
        let mut world = quiet_world();
        world.add_meteor(Vec2::new(300.0, 300.0), Vec2::ZERO, 20.0);
        world.meteors[0].shrink.start(Vec2::new(320.0, 300.0));
        update_shrinking(&mut world, 0.5);
        assert!(!world.meteors[0].destroyed);
        assert!(world.meteors[0].body.pos.x > 300.0);
        update_shrinking(&mut world, 0.5);
        assert!(world.meteors[0].destroyed);
    }

    #[test]
    fn test_player_shrink_marks_destroyed() {
        let mut world = quiet_world();
        let pos = world.player.ship.body.pos;
        world.player.ship.shrink.start(pos);
        let duration = world.tuning.lifecycle.shrink_duration;
        update_shrinking(&mut world, duration);
        assert!(world.player.ship.destroyed);
    }

    #[test]
    fn test_bullets_culled_offscreen() {
        let mut world = quiet_world();
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(-5.0, 100.0), Vec2::ZERO, 0.0);
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(5.0, 100.0), Vec2::ZERO, 0.0);
        cull_offscreen(&mut world);
        assert!(world.bullets[0].destroyed);
        assert!(!world.bullets[1].destroyed);
    }

    #[test]
    fn test_wrap_enemy_reappears_opposite() {
        let mut world = quiet_world();
        world.add_enemy(EnemyKind::Hunter, Vec2::new(-30.0, 300.0), Vec2::new(-10.0, 0.0));
        cull_offscreen(&mut world);
        let enemy = &world.enemies[0];
        assert!(!enemy.ship.destroyed);
        assert!((enemy.ship.body.pos.x - (world.bounds().x + enemy.ship.body.radius)).abs() < 1e-3);
    }

    #[test]
    fn test_ignore_enemy_culled_past_margin() {
        let mut world = quiet_world();
        let margin = world.tuning.playfield.offscreen_margin;
        world.add_enemy(EnemyKind::Bomber, Vec2::new(-margin - 1.0, 300.0), Vec2::ZERO);
        world.add_enemy(EnemyKind::Bomber, Vec2::new(-margin + 1.0, 300.0), Vec2::ZERO);
        cull_offscreen(&mut world);
        assert!(world.enemies[0].ship.destroyed);
        assert!(!world.enemies[1].ship.destroyed);
    }

    #[test]
    fn test_timers_count_down() {
        let mut world = quiet_world();
        world.player.ship.flash = 0.1;
        world.player.weapons.rapid_fire = Some(RapidFire {
            multiplier: 2.0,
            remaining: 0.15,
        });
        world.add_pickup(PickupKind::Health, Vec2::new(10.0, 10.0));
        world.pickups[0].age = world.tuning.pickups.lifetime - 0.1;

        update_timers(&mut world, 0.2);
        assert_eq!(world.player.ship.flash, 0.0);
        assert!(world.player.weapons.rapid_fire.is_none());
        assert!(world.pickups[0].collected);

        world.prune();
        assert!(world.pickups.is_empty());
    }
}
