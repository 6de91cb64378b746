//! Field forces: drift, gravity, nebula drag and nebula absorption
//!
//! Emitters superpose additively. Every velocity change is followed by a
//! speed cap so no field can push a body past its limit.

use glam::Vec2;

use super::state::World;
use crate::consts::{EPSILON, REFERENCE_FPS};
use crate::falloff;
use crate::tuning::FalloffTuning;

/// A gravity source snapshot, taken before any body moves this pass
#[derive(Debug, Clone, Copy)]
struct Emitter {
    pos: Vec2,
    radius: f32,
    strength: f32,
    shape: FalloffTuning,
    black_hole: bool,
}

/// Velocity change from one emitter on a body at `body_pos`
///
/// Zero outside the field and at (near) zero distance.
pub fn gravity_delta(
    body_pos: Vec2,
    center: Vec2,
    radius: f32,
    strength: f32,
    shape: FalloffTuning,
    multiplier: f32,
    dt: f32,
) -> Vec2 {
    let offset = center - body_pos;
    let dist = offset.length();
    if dist <= EPSILON || dist >= radius {
        return Vec2::ZERO;
    }
    let scale = falloff(dist, radius, shape.floor, shape.ceiling);
    offset / dist * strength * scale * multiplier * dt
}

fn summed_pull(emitters: &[Emitter], pos: Vec2, multiplier: f32, only_black_holes: bool, dt: f32) -> Vec2 {
    emitters
        .iter()
        .filter(|e| !only_black_holes || e.black_hole)
        .map(|e| gravity_delta(pos, e.pos, e.radius, e.strength, e.shape, multiplier, dt))
        .sum()
}

/// Drifting environmental bodies: planets, black holes, meteors, nebulae
pub fn drift(world: &mut World, dt: f32) {
    for planet in world.planets.iter_mut().filter(|p| !p.destroyed && !p.shrink.is_active()) {
        planet.body.integrate(dt);
    }
    for hole in world.black_holes.iter_mut().filter(|b| !b.destroyed) {
        hole.pos += hole.vel * dt;
    }
    for meteor in world.meteors.iter_mut().filter(|m| !m.destroyed && !m.shrink.is_active()) {
        meteor.body.integrate(dt);
    }

    let bounds = world.bounds();
    let margin = world.tuning.playfield.field_margin;
    for nebula in &mut world.nebulae {
        nebula.center += nebula.vel * dt;
        nebula.center = wrap_point(nebula.center, bounds, margin);
    }
}

/// Wrap a point around a `bounds` rectangle grown by `margin` on every side
pub fn wrap_point(mut p: Vec2, bounds: Vec2, margin: f32) -> Vec2 {
    if p.x < -margin {
        p.x = bounds.x + margin;
    } else if p.x > bounds.x + margin {
        p.x = -margin;
    }
    if p.y < -margin {
        p.y = bounds.y + margin;
    } else if p.y > bounds.y + margin {
        p.y = -margin;
    }
    p
}

/// Planets and black holes pull on every body inside their field
pub fn apply_gravity(world: &mut World, dt: f32) {
    let tuning = world.tuning.clone();
    let g = &tuning.gravity;

    let emitters: Vec<Emitter> = world
        .planets
        .iter()
        .filter(|p| !p.destroyed && !p.shrink.is_active())
        .map(|p| Emitter {
            pos: p.body.pos,
            radius: p.gravity_radius,
            strength: p.gravity_strength,
            shape: g.planet,
            black_hole: false,
        })
        .chain(world.black_holes.iter().filter(|b| !b.destroyed).map(|b| Emitter {
            pos: b.pos,
            radius: b.gravity_radius,
            strength: b.gravity_strength,
            shape: g.black_hole,
            black_hole: true,
        }))
        .collect();
    if emitters.is_empty() {
        return;
    }

    let player = &mut world.player.ship;
    if player.is_targetable() {
        player.body.vel += summed_pull(&emitters, player.body.pos, g.ship_multiplier, false, dt);
        player.body.cap_speed();
    }
    for enemy in &mut world.enemies {
        let ship = &mut enemy.ship;
        if ship.entering || !ship.is_targetable() {
            continue;
        }
        ship.body.vel += summed_pull(&emitters, ship.body.pos, g.ship_multiplier, false, dt);
        ship.body.cap_speed();
    }

    for bullet in world.bullets.iter_mut().filter(|b| !b.destroyed) {
        bullet.body.vel += summed_pull(&emitters, bullet.body.pos, g.projectile_multiplier, false, dt);
        bullet.body.cap_speed();
    }
    for round in world.rounds.iter_mut().filter(|r| !r.destroyed) {
        round.body.vel += summed_pull(&emitters, round.body.pos, g.projectile_multiplier, false, dt);
        round.body.cap_speed();
    }
    for missile in world.missiles.iter_mut().filter(|m| !m.destroyed) {
        // Gravity accumulates into drift; thrust is recombined on update
        missile.drift += summed_pull(&emitters, missile.body.pos, g.projectile_multiplier, false, dt);
        missile.drift = crate::cap_speed(missile.drift, missile.body.max_speed);
    }

    for meteor in world.meteors.iter_mut().filter(|m| !m.destroyed && !m.shrink.is_active()) {
        meteor.body.vel += summed_pull(&emitters, meteor.body.pos, g.background_multiplier, false, dt);
        meteor.body.cap_speed();
    }
    for planet in world.planets.iter_mut().filter(|p| !p.destroyed && !p.shrink.is_active()) {
        planet.body.vel += summed_pull(&emitters, planet.body.pos, g.background_multiplier, true, dt);
        planet.body.cap_speed();
    }
}

/// Speed after one drag step: `speed·factor^(dt·60)`, never below `floor`
///
/// Speeds already at or below the floor are returned unchanged.
pub fn drag_speed(speed: f32, factor: f32, floor: f32, dt: f32) -> f32 {
    if speed <= floor {
        return speed;
    }
    let damped = speed * factor.clamp(0.0, 1.0).powf(dt * REFERENCE_FPS);
    damped.max(floor)
}

/// Velocity after one drag step, direction preserved
pub fn drag_velocity(vel: Vec2, factor: f32, floor: f32, dt: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= floor || speed <= EPSILON {
        return vel;
    }
    vel / speed * drag_speed(speed, factor, floor, dt)
}

/// Nebula drag on ships and projectiles inside any cloud
pub fn apply_drag(world: &mut World, dt: f32) {
    if world.nebulae.is_empty() {
        return;
    }
    let tuning = world.tuning.clone();
    let n = &tuning.nebula;
    let nebulae = &world.nebulae;
    let inside_count = |p: Vec2| nebulae.iter().filter(|neb| neb.contains(p)).count();

    let player = &mut world.player.ship;
    if player.is_targetable() {
        for _ in 0..inside_count(player.body.pos) {
            player.body.vel = drag_velocity(player.body.vel, n.ship_factor, n.ship_floor, dt);
        }
    }
    for enemy in &mut world.enemies {
        let ship = &mut enemy.ship;
        if ship.entering || !ship.is_targetable() {
            continue;
        }
        for _ in 0..inside_count(ship.body.pos) {
            ship.body.vel = drag_velocity(ship.body.vel, n.ship_factor, n.ship_floor, dt);
        }
    }
    for bullet in world.bullets.iter_mut().filter(|b| !b.destroyed) {
        for _ in 0..inside_count(bullet.body.pos) {
            bullet.body.vel =
                drag_velocity(bullet.body.vel, n.projectile_factor, n.projectile_floor, dt);
        }
    }
    for round in world.rounds.iter_mut().filter(|r| !r.destroyed) {
        for _ in 0..inside_count(round.body.pos) {
            round.body.vel = drag_velocity(round.body.vel, n.projectile_factor, n.projectile_floor, dt);
        }
    }
    for missile in world.missiles.iter_mut().filter(|m| !m.destroyed) {
        for _ in 0..inside_count(missile.body.pos) {
            missile.thrust_speed =
                drag_speed(missile.thrust_speed, n.projectile_factor, n.projectile_floor, dt);
        }
    }
}

/// Black holes consume overlapping nebula clouds and grow while feeding
pub fn absorb_nebulae(world: &mut World, dt: f32) {
    let shrink_rate = world.tuning.nebula.cloud_shrink_rate;
    let growth_rate = world.tuning.black_holes.nebula_growth_rate;

    for hole in &mut world.black_holes {
        hole.feeding = false;
    }
    if world.black_holes.is_empty() {
        return;
    }

    for nebula in &mut world.nebulae {
        let center = nebula.center;
        for cloud in &mut nebula.clouds {
            let cloud_center = center + cloud.offset;
            let mut consumed = false;
            for hole in world.black_holes.iter_mut().filter(|b| !b.destroyed) {
                if cloud_center.distance(hole.pos) < cloud.radius + hole.radius {
                    hole.feeding = true;
                    consumed = true;
                }
            }
            if consumed {
                cloud.radius -= shrink_rate * dt;
            }
        }
        let before = nebula.clouds.len();
        nebula.clouds.retain(|c| c.radius > 0.0);
        if nebula.clouds.len() < before {
            log::debug!("nebula {} lost {} cloud(s)", nebula.id, before - nebula.clouds.len());
        }
    }

    for hole in world.black_holes.iter_mut().filter(|b| b.feeding) {
        hole.grow_by(growth_rate * dt);
    }
    world.nebulae.retain(|n| !n.clouds.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::NebulaCloud;
    use crate::tuning::{EnemyKind, SpawnLimits};
    use proptest::prelude::*;

    const SHAPE: FalloffTuning = FalloffTuning {
        floor: 0.1,
        ceiling: 1.0,
    };

    fn quiet_world() -> World {
        let mut world = World::with_default_tuning(11);
        world.set_spawn_limits(SpawnLimits::none());
        world
    }

    #[test]
    fn test_gravity_zero_at_center_and_outside() {
        let c = Vec2::new(100.0, 100.0);
        assert_eq!(gravity_delta(c, c, 200.0, 100.0, SHAPE, 1.0, 0.1), Vec2::ZERO);
        assert_eq!(
            gravity_delta(Vec2::new(400.0, 100.0), c, 200.0, 100.0, SHAPE, 1.0, 0.1),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_gravity_points_at_emitter_with_falloff() {
        let c = Vec2::new(100.0, 100.0);
        // Halfway out: falloff 0.1 + 0.5 * 0.9 = 0.55
        let dv = gravity_delta(Vec2::new(200.0, 100.0), c, 200.0, 100.0, SHAPE, 2.0, 0.5);
        assert!(dv.x < 0.0);
        assert!(dv.y.abs() < 1e-6);
        assert!((dv.length() - 100.0 * 0.55 * 2.0 * 0.5).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_gravity_finite_near_center(dx in -1.0f32..1.0, dy in -1.0f32..1.0) {
            let c = Vec2::new(50.0, 50.0);
            let dv = gravity_delta(c + Vec2::new(dx, dy), c, 100.0, 500.0, SHAPE, 2.5, 1.0 / 60.0);
            prop_assert!(dv.is_finite());
            prop_assert!(dv.length() <= 500.0 * 2.5 / 60.0 + 1e-3);
        }

        #[test]
        fn prop_drag_respects_floor(speed in 0.0f32..2000.0, dt in 0.0f32..0.1) {
            let out = drag_speed(speed, 0.95, 150.0, dt);
            prop_assert!(out <= speed + 1e-3);
            if speed > 150.0 {
                prop_assert!(out >= 150.0 - 1e-3);
            } else {
                prop_assert_eq!(out, speed);
            }
        }
    }

    #[test]
    fn test_drag_floor_is_idempotent() {
        let v = Vec2::new(0.0, 60.0);
        let once = drag_velocity(v, 0.5, 60.0, 1.0 / 60.0);
        let twice = drag_velocity(once, 0.5, 60.0, 1.0 / 60.0);
        assert_eq!(once, v);
        assert_eq!(twice, v);
        // A strong factor snaps exactly to the floor
        let fast = drag_velocity(Vec2::new(0.0, 61.0), 0.1, 60.0, 1.0 / 60.0);
        assert!((fast.length() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_is_frame_rate_independent() {
        let one_frame = drag_speed(1000.0, 0.9, 0.0, 1.0 / 30.0);
        let two_frames = drag_speed(drag_speed(1000.0, 0.9, 0.0, 1.0 / 60.0), 0.9, 0.0, 1.0 / 60.0);
        assert!((one_frame - two_frames).abs() < 1e-2);
    }

    #[test]
    fn test_entering_enemy_ignores_gravity() {
        let mut world = quiet_world();
        world.add_planet(Vec2::new(600.0, 360.0), Vec2::ZERO, 50.0, 100.0);
        world.add_enemy(EnemyKind::Bomber, Vec2::new(700.0, 360.0), Vec2::ZERO);
        world.add_enemy(EnemyKind::Bomber, Vec2::new(500.0, 360.0), Vec2::ZERO);
        world.enemies[0].ship.entering = true;

        apply_gravity(&mut world, 0.1);
        assert_eq!(world.enemies[0].ship.body.vel, Vec2::ZERO);
        assert!(world.enemies[1].ship.body.vel.x > 0.0);
    }

    #[test]
    fn test_planets_only_feel_black_holes() {
        let mut world = quiet_world();
        world.add_planet(Vec2::new(300.0, 300.0), Vec2::ZERO, 50.0, 100.0);
        world.add_planet(Vec2::new(400.0, 300.0), Vec2::ZERO, 50.0, 100.0);
        apply_gravity(&mut world, 0.1);
        assert_eq!(world.planets[0].body.vel, Vec2::ZERO);

        world.add_black_hole(Vec2::new(300.0, 500.0), Vec2::ZERO);
        apply_gravity(&mut world, 0.1);
        assert!(world.planets[0].body.vel.y > 0.0);
    }

    #[test]
    fn test_missile_gravity_goes_to_drift() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(300.0, 300.0), Vec2::ZERO);
        crate::sim::weapons::fire_missile(
            &mut world,
            crate::sim::Faction::Player,
            1,
            Vec2::new(300.0, 400.0),
            Vec2::ZERO,
            90.0,
        );
        let vel_before = world.missiles[0].body.vel;
        apply_gravity(&mut world, 0.1);
        let missile = &world.missiles[0];
        assert!(missile.drift.y < 0.0);
        assert_eq!(missile.body.vel, vel_before);
    }

    #[test]
    fn test_nebula_drag_only_inside() {
        let mut world = quiet_world();
        world.add_nebula(
            Vec2::new(200.0, 200.0),
            Vec2::ZERO,
            vec![NebulaCloud {
                offset: Vec2::ZERO,
                radius: 80.0,
            }],
        );
        world.player.ship.body.vel = Vec2::new(300.0, 0.0);
        apply_drag(&mut world, 1.0 / 60.0);
        assert_eq!(world.player.ship.body.vel, Vec2::new(300.0, 0.0));

        world.player.ship.body.pos = Vec2::new(210.0, 200.0);
        apply_drag(&mut world, 1.0 / 60.0);
        let speed = world.player.ship.body.speed();
        assert!((speed - 300.0 * world.tuning.nebula.ship_factor).abs() < 1e-2);
    }

    #[test]
    fn test_black_hole_consumes_cloud_and_grows() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(500.0, 300.0), Vec2::ZERO);
        world.add_nebula(
            Vec2::new(530.0, 300.0),
            Vec2::ZERO,
            vec![
                NebulaCloud {
                    offset: Vec2::ZERO,
                    radius: 10.0,
                },
                NebulaCloud {
                    offset: Vec2::new(0.0, -600.0),
                    radius: 50.0,
                },
            ],
        );
        let r0 = world.black_holes[0].radius;

        absorb_nebulae(&mut world, 0.1);
        assert!(world.black_holes[0].feeding);
        assert!(world.black_holes[0].radius > r0);
        assert!((world.nebulae[0].clouds[0].radius - 7.5).abs() < 1e-4);
        assert_eq!(world.nebulae[0].clouds[1].radius, 50.0);

        for _ in 0..10 {
            absorb_nebulae(&mut world, 0.1);
        }
        assert_eq!(world.nebulae[0].clouds.len(), 1);
        assert!(!world.black_holes[0].feeding);
    }

    #[test]
    fn test_nebula_removed_when_all_clouds_gone() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(500.0, 300.0), Vec2::ZERO);
        world.add_nebula(
            Vec2::new(500.0, 300.0),
            Vec2::ZERO,
            vec![NebulaCloud {
                offset: Vec2::ZERO,
                radius: 1.0,
            }],
        );
        absorb_nebulae(&mut world, 0.1);
        assert!(world.nebulae.is_empty());
    }

    #[test]
    fn test_nebula_center_wraps() {
        let bounds = Vec2::new(100.0, 100.0);
        assert_eq!(wrap_point(Vec2::new(-51.0, 50.0), bounds, 50.0), Vec2::new(150.0, 50.0));
        assert_eq!(wrap_point(Vec2::new(50.0, 151.0), bounds, 50.0), Vec2::new(50.0, -50.0));
        assert_eq!(wrap_point(Vec2::new(10.0, 10.0), bounds, 50.0), Vec2::new(10.0, 10.0));
    }
}
