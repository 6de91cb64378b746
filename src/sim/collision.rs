//! Collision detection and response
//!
//! Exhaustive pairwise circle tests, one pass per category, run in a fixed
//! order. Anything destroyed or shrinking is skipped by every later pass.

use glam::Vec2;
use rand::Rng;

use super::entity::{Faction, Ship};
use super::state::{GameEvent, PickupKind, RapidFire, ShipSlot, World};
use super::weapons::{penetrated_velocity, railgun_damage};
use crate::consts::EPSILON;
use crate::reflect;
use crate::tuning::ExplosionSize;

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the second circle toward the first
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

/// Check overlap between circle A and circle B
///
/// Coincident centers get an arbitrary but stable normal.
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let offset = a_pos - b_pos;
    let dist = offset.length();
    let reach = a_radius + b_radius;
    if dist >= reach {
        return None;
    }
    let normal = if dist > EPSILON { offset / dist } else { Vec2::X };
    Some(Contact {
        normal,
        penetration: reach - dist,
    })
}

/// Elastic bounce along the contact normal
///
/// Only the normal components change, and only while the bodies are
/// closing. `a_recoil` / `b_recoil` scale the share of the impulse each body
/// takes; 1.0 / 1.0 is an equal-mass exchange.
pub fn elastic_bounce(va: Vec2, vb: Vec2, normal: Vec2, a_recoil: f32, b_recoil: f32) -> (Vec2, Vec2) {
    let closing = (va - vb).dot(normal);
    if closing >= 0.0 {
        return (va, vb);
    }
    (
        va - normal * closing * a_recoil,
        vb + normal * closing * b_recoil,
    )
}

/// Position corrections that split an overlap between two bodies
pub fn separation(contact: Contact, a_share: f32, b_share: f32, slop: f32) -> (Vec2, Vec2) {
    let push = contact.normal * (contact.penetration + slop);
    (push * a_share, -push * b_share)
}

/// Bounce a body off a planet surface
///
/// Reflects the velocity when approaching, enforces a minimum escape speed
/// and moves the body fully outside. Returns `(pos, vel)` on contact.
pub fn planet_bounce(
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    planet_pos: Vec2,
    planet_radius: f32,
    min_speed: f32,
) -> Option<(Vec2, Vec2)> {
    let contact = circle_contact(pos, radius, planet_pos, planet_radius)?;
    let n = contact.normal;
    let mut out = vel;
    if vel.dot(n) < 0.0 {
        out = reflect(vel, n);
        let speed = out.length();
        if speed < min_speed {
            out = if speed > EPSILON {
                out / speed * min_speed
            } else {
                n * min_speed
            };
        }
    }
    Some((planet_pos + n * (planet_radius + radius), out))
}

#[inline]
fn is_live(ship: &Ship) -> bool {
    !ship.destroyed && !ship.shrink.is_active()
}

/// Run every collision pass for this frame
pub fn resolve(world: &mut World, dt: f32) {
    laser_damage(world, dt);
    bullets_vs_ships(world);
    rounds_vs_ships(world);
    missiles_vs_ships(world);
    projectiles_vs_projectiles(world);
    ships_vs_ships(world);
    ships_vs_meteors(world);
    meteors_vs_meteors(world);
    bodies_vs_planets(world);
    bodies_vs_black_holes(world);
    projectiles_vs_meteors(world);
    projectiles_vs_fields(world);
    pickups_vs_player(world);
}

/// Remove a ship and emit its death side effects
///
/// Score is awarded only when the player's weapons made the kill.
pub fn destroy_ship(world: &mut World, slot: ShipSlot, killer: Faction) {
    let ship = world.ship_mut(slot);
    if ship.destroyed {
        return;
    }
    ship.destroyed = true;
    let pos = ship.body.pos;
    let id = ship.id;

    match slot {
        ShipSlot::Player => {
            log::info!("player destroyed at {pos}");
            world.emit(GameEvent::Explosion {
                pos,
                size: ExplosionSize::Large,
            });
        }
        ShipSlot::Enemy(i) => {
            let row = *world.tuning.enemies.get(world.enemies[i].kind);
            log::debug!("enemy {id} ({:?}) destroyed", world.enemies[i].kind);
            world.emit(GameEvent::Explosion {
                pos,
                size: row.explosion,
            });
            world.add_pickup(PickupKind::Health, pos);
            if world.rng.random::<f32>() < row.rapid_fire_drop_chance {
                let offset = Vec2::new(world.tuning.pickups.radius * 1.5, 0.0);
                world.add_pickup(PickupKind::RapidFire, pos + offset);
            }
            if killer == Faction::Player {
                world.score += u64::from(row.score);
                world.emit(GameEvent::ScoreDelta(row.score));
            }
        }
    }
}

fn small_explosion(world: &mut World, pos: Vec2) {
    world.emit(GameEvent::Explosion {
        pos,
        size: ExplosionSize::Small,
    });
}

fn laser_damage(world: &mut World, dt: f32) {
    let beam = &world.player.weapons.laser;
    let Some(target) = beam.hit.filter(|_| beam.active) else {
        return;
    };
    let Some(slot) = world.find_ship(target) else {
        return;
    };
    if !is_live(world.ship(slot)) {
        return;
    }
    let damage = world.tuning.laser.dps * dt;
    let flash = world.tuning.player.flash_duration;
    if world.ship_mut(slot).apply_damage(damage, flash) {
        destroy_ship(world, slot, Faction::Player);
    }
}

fn bullets_vs_ships(world: &mut World) {
    let flash = world.tuning.player.flash_duration;
    let slots = world.ship_slots();
    for i in 0..world.bullets.len() {
        if world.bullets[i].destroyed {
            continue;
        }
        let (pos, owner, damage) = {
            let b = &world.bullets[i];
            (b.body.pos, b.owner, b.damage)
        };
        for &slot in &slots {
            let ship = world.ship(slot);
            if !is_live(ship) || ship.faction == owner {
                continue;
            }
            if pos.distance(ship.body.pos) >= ship.body.radius {
                continue;
            }
            world.bullets[i].destroyed = true;
            if world.ship_mut(slot).apply_damage(damage, flash) {
                destroy_ship(world, slot, owner);
            }
            break;
        }
    }
}

fn rounds_vs_ships(world: &mut World) {
    let tuning = world.tuning.clone();
    let rt = &tuning.railgun;
    let flash = tuning.player.flash_duration;
    let slots = world.ship_slots();

    for i in 0..world.rounds.len() {
        for &slot in &slots {
            let round = &world.rounds[i];
            if round.destroyed {
                break;
            }
            let ship = world.ship(slot);
            if !is_live(ship) || ship.faction == round.owner || round.pierced.contains(&ship.id) {
                continue;
            }
            if round.body.pos.distance(ship.body.pos) >= ship.body.radius {
                continue;
            }

            let (target_id, health, target_vel) = (ship.id, ship.health, ship.body.vel);
            let (vel, owner, penetrating) = (round.body.vel, round.owner, round.penetrating);
            // Impact energy comes from the closing speed, not the round's own
            let impact = railgun_damage((vel - target_vel).length(), rt);
            let jitter = world.rng.random_range(-1.0..=1.0);

            if world.ship_mut(slot).apply_damage(impact, flash) {
                destroy_ship(world, slot, owner);
            }

            let through = if penetrating {
                penetrated_velocity(vel, impact, health, rt.max_deflection, jitter)
            } else {
                None
            };
            let round = &mut world.rounds[i];
            match through {
                Some(new_vel) => {
                    log::trace!("round {} pierced ship {target_id}", round.id);
                    round.body.vel = new_vel;
                    round.damage = railgun_damage(new_vel.length(), rt);
                    round.pierced.push(target_id);
                }
                None => round.destroyed = true,
            }
        }
    }
}

fn missiles_vs_ships(world: &mut World) {
    let tuning = world.tuning.clone();
    let mt = &tuning.missile;
    let flash = tuning.player.flash_duration;
    let slots = world.ship_slots();

    for i in 0..world.missiles.len() {
        let missile = &world.missiles[i];
        if missile.destroyed {
            continue;
        }
        let (pos, radius, owner, fired_by) = (
            missile.body.pos,
            missile.body.radius,
            missile.owner,
            missile.fired_by,
        );
        let armed = missile.is_armed(mt.arming_delay);

        for &slot in &slots {
            let ship = world.ship(slot);
            if !is_live(ship) || (ship.id == fired_by && !armed) {
                continue;
            }
            if circle_contact(pos, radius, ship.body.pos, ship.body.radius).is_none() {
                continue;
            }
            world.missiles[i].destroyed = true;
            small_explosion(world, pos);
            if world.ship_mut(slot).apply_damage(mt.damage, flash) {
                destroy_ship(world, slot, owner);
            }
            break;
        }
    }
}

/// Bullets and rounds shoot down opposing missiles
fn projectiles_vs_projectiles(world: &mut World) {
    for m in 0..world.missiles.len() {
        if world.missiles[m].destroyed {
            continue;
        }
        let (pos, radius, owner) = {
            let missile = &world.missiles[m];
            (missile.body.pos, missile.body.radius, missile.owner)
        };

        let bullet = world.bullets.iter_mut().find(|b| {
            !b.destroyed
                && b.owner != owner
                && circle_contact(b.body.pos, b.body.radius, pos, radius).is_some()
        });
        let shot_down = match bullet {
            Some(bullet) => {
                bullet.destroyed = true;
                true
            }
            None => world.rounds.iter().any(|r| {
                !r.destroyed
                    && r.owner != owner
                    && circle_contact(r.body.pos, r.body.radius, pos, radius).is_some()
            }),
        };

        if shot_down {
            world.missiles[m].destroyed = true;
            small_explosion(world, pos);
        }
    }
}

fn ships_vs_ships(world: &mut World) {
    let ct = world.tuning.collision.clone();
    let slots = world.ship_slots();
    for a in 0..slots.len() {
        for b in (a + 1)..slots.len() {
            let (sa, sb) = (world.ship(slots[a]), world.ship(slots[b]));
            if !is_live(sa) || !is_live(sb) {
                continue;
            }
            let (ba, bb) = (sa.body, sb.body);
            let Some(contact) = circle_contact(ba.pos, ba.radius, bb.pos, bb.radius) else {
                continue;
            };
            let (va, vb) = elastic_bounce(ba.vel, bb.vel, contact.normal, 1.0, 1.0);
            let (da, db) = separation(contact, ct.ship_ship_push, ct.ship_ship_push, ct.separation_slop);

            let body = &mut world.ship_mut(slots[a]).body;
            body.vel = va;
            body.pos += da;
            body.cap_speed();
            let body = &mut world.ship_mut(slots[b]).body;
            body.vel = vb;
            body.pos += db;
            body.cap_speed();
        }
    }
}

fn ships_vs_meteors(world: &mut World) {
    let ct = world.tuning.collision.clone();
    let slots = world.ship_slots();
    for &slot in &slots {
        for m in 0..world.meteors.len() {
            let ship = world.ship(slot);
            let meteor = &world.meteors[m];
            if !is_live(ship) || meteor.destroyed || meteor.shrink.is_active() {
                continue;
            }
            let (ship_body, rock) = (ship.body, meteor.body);
            let Some(contact) = circle_contact(ship_body.pos, ship_body.radius, rock.pos, rock.radius) else {
                continue;
            };
            let (vs, vm) = elastic_bounce(ship_body.vel, rock.vel, contact.normal, 1.0, ct.meteor_recoil);
            let (ds, dm) = separation(
                contact,
                ct.ship_meteor_push,
                1.0 - ct.ship_meteor_push,
                ct.separation_slop,
            );

            let body = &mut world.ship_mut(slot).body;
            body.vel = vs;
            body.pos += ds;
            body.cap_speed();
            let body = &mut world.meteors[m].body;
            body.vel = vm;
            body.pos += dm;
            body.cap_speed();
        }
    }
}

fn meteors_vs_meteors(world: &mut World) {
    let slop = world.tuning.collision.separation_slop;
    let count = world.meteors.len();
    for a in 0..count {
        for b in (a + 1)..count {
            let (ma, mb) = (&world.meteors[a], &world.meteors[b]);
            if ma.destroyed || mb.destroyed || ma.shrink.is_active() || mb.shrink.is_active() {
                continue;
            }
            let (ba, bb) = (ma.body, mb.body);
            let Some(contact) = circle_contact(ba.pos, ba.radius, bb.pos, bb.radius) else {
                continue;
            };
            let (va, vb) = elastic_bounce(ba.vel, bb.vel, contact.normal, 1.0, 1.0);
            let (da, db) = separation(contact, 0.5, 0.5, slop);

            let body = &mut world.meteors[a].body;
            body.vel = va;
            body.pos += da;
            body.cap_speed();
            let body = &mut world.meteors[b].body;
            body.vel = vb;
            body.pos += db;
            body.cap_speed();
        }
    }
}

fn bodies_vs_planets(world: &mut World) {
    let escape_factor = world.tuning.gravity.escape_factor;
    let slots = world.ship_slots();

    for p in 0..world.planets.len() {
        let planet = &world.planets[p];
        if planet.destroyed || planet.shrink.is_active() {
            continue;
        }
        let (center, radius) = (planet.body.pos, planet.body.radius);
        let min_speed = escape_factor * planet.gravity_strength;

        for &slot in &slots {
            let ship = world.ship_mut(slot);
            if !is_live(ship) {
                continue;
            }
            let body = &mut ship.body;
            if let Some((pos, vel)) = planet_bounce(body.pos, body.vel, body.radius, center, radius, min_speed) {
                body.pos = pos;
                body.vel = vel;
                body.cap_speed();
            }
        }

        for meteor in world
            .meteors
            .iter_mut()
            .filter(|m| !m.destroyed && !m.shrink.is_active())
        {
            let body = &mut meteor.body;
            if let Some((pos, vel)) = planet_bounce(body.pos, body.vel, body.radius, center, radius, min_speed) {
                body.pos = pos;
                body.vel = vel;
                body.cap_speed();
            }
        }
    }
}

/// Contact with an event horizon starts a one-shot shrink and grows the hole
fn bodies_vs_black_holes(world: &mut World) {
    let growth = world.tuning.black_holes.clone();
    let slots = world.ship_slots();

    for h in 0..world.black_holes.len() {
        if world.black_holes[h].destroyed {
            continue;
        }

        for &slot in &slots {
            let hole = &world.black_holes[h];
            let (center, horizon) = (hole.pos, hole.radius);
            let ship = world.ship_mut(slot);
            if ship.destroyed || circle_contact(ship.body.pos, ship.body.radius, center, horizon).is_none() {
                continue;
            }
            if ship.shrink.start(center) {
                let pos = ship.body.pos;
                log::debug!("ship {} crossed a black hole horizon", ship.id);
                world.black_holes[h].grow(growth.growth_ship);
                world.emit(GameEvent::Absorbed { pos });
            }
        }

        for m in 0..world.meteors.len() {
            let hole = &world.black_holes[h];
            let (center, horizon) = (hole.pos, hole.radius);
            let meteor = &mut world.meteors[m];
            if meteor.destroyed || circle_contact(meteor.body.pos, meteor.body.radius, center, horizon).is_none() {
                continue;
            }
            if meteor.shrink.start(center) {
                let pos = meteor.body.pos;
                world.black_holes[h].grow(growth.growth_meteor);
                world.emit(GameEvent::Absorbed { pos });
            }
        }

        for p in 0..world.planets.len() {
            let hole = &world.black_holes[h];
            let (center, horizon) = (hole.pos, hole.radius);
            let planet = &mut world.planets[p];
            if planet.destroyed || circle_contact(planet.body.pos, planet.body.radius, center, horizon).is_none() {
                continue;
            }
            if planet.shrink.start(center) {
                let pos = planet.body.pos;
                log::debug!("planet {} falling into black hole", planet.id);
                world.black_holes[h].grow(growth.growth_planet);
                world.emit(GameEvent::Absorbed { pos });
            }
        }
    }
}

/// Bullets and rounds glance off meteors; missiles detonate on them
fn projectiles_vs_meteors(world: &mut World) {
    let slop = world.tuning.collision.separation_slop;
    let rocks: Vec<(Vec2, f32)> = world
        .meteors
        .iter()
        .filter(|m| !m.destroyed && !m.shrink.is_active())
        .map(|m| (m.body.pos, m.body.radius))
        .collect();
    if rocks.is_empty() {
        return;
    }

    let deflect = |body: &mut super::entity::Body| {
        for &(center, radius) in &rocks {
            if let Some(contact) = circle_contact(body.pos, body.radius, center, radius) {
                if body.vel.dot(contact.normal) < 0.0 {
                    body.vel = reflect(body.vel, contact.normal);
                    body.angle = crate::heading_of(body.vel);
                }
                body.pos = center + contact.normal * (radius + body.radius + slop);
            }
        }
    };
    for bullet in world.bullets.iter_mut().filter(|b| !b.destroyed) {
        deflect(&mut bullet.body);
    }
    for round in world.rounds.iter_mut().filter(|r| !r.destroyed) {
        deflect(&mut round.body);
    }

    let mut blasts = Vec::new();
    for missile in world.missiles.iter_mut().filter(|m| !m.destroyed) {
        let hit = rocks
            .iter()
            .any(|&(center, radius)| circle_contact(missile.body.pos, missile.body.radius, center, radius).is_some());
        if hit {
            missile.destroyed = true;
            blasts.push(missile.body.pos);
        }
    }
    for pos in blasts {
        small_explosion(world, pos);
    }
}

/// Projectiles that touch a planet or cross an event horizon are destroyed
fn projectiles_vs_fields(world: &mut World) {
    let solids: Vec<(Vec2, f32)> = world
        .planets
        .iter()
        .filter(|p| !p.destroyed)
        .map(|p| (p.body.pos, p.body.radius))
        .collect();
    let holes: Vec<(Vec2, f32)> = world
        .black_holes
        .iter()
        .filter(|b| !b.destroyed)
        .map(|b| (b.pos, b.radius))
        .collect();
    if solids.is_empty() && holes.is_empty() {
        return;
    }
    let swallowed = |pos: Vec2, radius: f32| {
        solids
            .iter()
            .any(|&(c, r)| circle_contact(pos, radius, c, r).is_some())
            || holes.iter().any(|&(c, r)| pos.distance(c) < r)
    };

    let mut blasts = Vec::new();
    for bullet in world.bullets.iter_mut().filter(|b| !b.destroyed) {
        if swallowed(bullet.body.pos, bullet.body.radius) {
            bullet.destroyed = true;
            blasts.push(bullet.body.pos);
        }
    }
    for round in world.rounds.iter_mut().filter(|r| !r.destroyed) {
        if swallowed(round.body.pos, round.body.radius) {
            round.destroyed = true;
            blasts.push(round.body.pos);
        }
    }
    for missile in world.missiles.iter_mut().filter(|m| !m.destroyed) {
        if swallowed(missile.body.pos, missile.body.radius) {
            missile.destroyed = true;
            blasts.push(missile.body.pos);
        }
    }
    for pos in blasts {
        small_explosion(world, pos);
    }
}

fn pickups_vs_player(world: &mut World) {
    if !is_live(&world.player.ship) {
        return;
    }
    let pt = world.tuning.pickups.clone();
    let (pos, radius) = (world.player.ship.body.pos, world.player.ship.body.radius);

    let mut collected = Vec::new();
    for pickup in world.pickups.iter_mut().filter(|p| !p.collected) {
        if circle_contact(pos, radius, pickup.pos, pt.radius).is_some() {
            pickup.collected = true;
            collected.push(pickup.kind);
        }
    }

    for kind in collected {
        match kind {
            PickupKind::Health => world.player.ship.heal(pt.heal_amount),
            PickupKind::RapidFire => {
                world.player.weapons.rapid_fire = Some(RapidFire {
                    multiplier: pt.rapid_fire_multiplier,
                    remaining: pt.rapid_fire_duration,
                });
            }
        }
        world.emit(GameEvent::PickupCollected { kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapons::{fire_bullet, fire_missile, fire_railgun};
    use crate::tuning::{EnemyKind, SpawnLimits};
    use proptest::prelude::*;

    fn quiet_world() -> World {
        let mut world = World::with_default_tuning(13);
        world.set_spawn_limits(SpawnLimits::none());
        world
    }

    #[test]
    fn test_circle_contact() {
        let c = circle_contact(Vec2::new(0.0, 0.0), 10.0, Vec2::new(15.0, 0.0), 10.0).expect("overlap");
        assert!((c.normal - Vec2::new(-1.0, 0.0)).length() < 1e-6);
        assert!((c.penetration - 5.0).abs() < 1e-6);
        assert!(circle_contact(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0).is_none());
        // Coincident centers still produce a usable normal
        let c = circle_contact(Vec2::ONE, 5.0, Vec2::ONE, 5.0).expect("overlap");
        assert!(c.normal.is_finite());
    }

    #[test]
    fn test_equal_mass_head_on_exchange() {
        // A on the left moving right, B on the right moving left
        let normal = Vec2::new(-1.0, 0.0);
        let (va, vb) = elastic_bounce(Vec2::new(100.0, 0.0), Vec2::new(-50.0, 0.0), normal, 1.0, 1.0);
        assert!((va - Vec2::new(-50.0, 0.0)).length() < 1e-4);
        assert!((vb - Vec2::new(100.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_separating_bodies_untouched() {
        let normal = Vec2::new(-1.0, 0.0);
        let va = Vec2::new(-10.0, 5.0);
        let vb = Vec2::new(10.0, 0.0);
        assert_eq!(elastic_bounce(va, vb, normal, 1.0, 1.0), (va, vb));
    }

    proptest! {
        #[test]
        fn prop_symmetric_bounce_conserves_momentum(
            ax in -300.0f32..300.0, ay in -300.0f32..300.0,
            bx in -300.0f32..300.0, by in -300.0f32..300.0,
            angle in 0.0f32..360.0,
        ) {
            let normal = crate::heading_vec(angle);
            let (va, vb) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            let (oa, ob) = elastic_bounce(va, vb, normal, 1.0, 1.0);
            prop_assert!(((oa + ob) - (va + vb)).length() < 1e-2);
            // Tangential components are untouched
            let tangent = normal.perp();
            prop_assert!((oa.dot(tangent) - va.dot(tangent)).abs() < 1e-2);
            prop_assert!((ob.dot(tangent) - vb.dot(tangent)).abs() < 1e-2);
            // Never closing after the bounce
            prop_assert!((oa - ob).dot(normal) >= -1e-2);
        }
    }

    #[test]
    fn test_planet_bounce_enforces_escape_speed() {
        let strength = 100.0;
        let (pos, vel) = planet_bounce(
            Vec2::new(0.0, -100.0),
            Vec2::new(0.0, 50.0),
            30.0,
            Vec2::ZERO,
            80.0,
            2.5 * strength,
        )
        .expect("contact");
        assert!((vel - Vec2::new(0.0, -250.0)).length() < 1e-3);
        assert!((pos - Vec2::new(0.0, -110.0)).length() < 1e-3);
    }

    #[test]
    fn test_planet_bounce_keeps_fast_reflection() {
        let (_, vel) = planet_bounce(
            Vec2::new(0.0, -100.0),
            Vec2::new(0.0, 400.0),
            30.0,
            Vec2::ZERO,
            80.0,
            250.0,
        )
        .expect("contact");
        assert!((vel - Vec2::new(0.0, -400.0)).length() < 1e-3);
    }

    #[test]
    fn test_bullet_kill_scores_and_drops() {
        let mut world = quiet_world();
        let id = world.add_enemy(EnemyKind::Scout, Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.enemies[0].ship.health = 5.0;
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(305.0, 300.0), Vec2::ZERO, 0.0);

        resolve(&mut world, 0.0);

        assert!(world.bullets[0].destroyed);
        assert!(world.enemies[0].ship.destroyed);
        let row = *world.tuning.enemies.get(EnemyKind::Scout);
        assert_eq!(world.score, u64::from(row.score));
        let events = world.events();
        assert!(events.contains(&GameEvent::ScoreDelta(row.score)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Explosion { size, .. } if *size == row.explosion)));
        assert!(world.pickups.iter().any(|p| p.kind == PickupKind::Health));
        assert_ne!(world.find_ship(id), None);
    }

    #[test]
    fn test_bullet_ignores_own_faction() {
        let mut world = quiet_world();
        world.add_enemy(EnemyKind::Scout, Vec2::new(300.0, 300.0), Vec2::ZERO);
        fire_bullet(&mut world, Faction::Enemy, 99, Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0);
        resolve(&mut world, 0.0);
        assert!(!world.bullets[0].destroyed);
        assert_eq!(world.enemies[0].ship.health, world.enemies[0].ship.max_health);
    }

    #[test]
    fn test_enemy_killed_by_enemy_fire_scores_nothing() {
        let mut world = quiet_world();
        world.add_enemy(EnemyKind::Scout, Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.enemies[0].ship.health = 1.0;
        let firer = world.add_enemy(EnemyKind::Bomber, Vec2::new(600.0, 100.0), Vec2::ZERO);
        fire_missile(&mut world, Faction::Enemy, firer, Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0);
        resolve(&mut world, 0.0);
        assert!(world.enemies[0].ship.destroyed);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_unarmed_missile_spares_firer() {
        let mut world = quiet_world();
        let player = world.player.ship.id;
        let pos = world.player.ship.body.pos;
        fire_missile(&mut world, Faction::Player, player, pos, Vec2::ZERO, 0.0);
        resolve(&mut world, 0.0);
        assert!(!world.missiles[0].destroyed);
        assert_eq!(world.player.ship.health, world.player.ship.max_health);

        world.missiles[0].age = world.tuning.missile.arming_delay;
        resolve(&mut world, 0.0);
        assert!(world.missiles[0].destroyed);
        assert!(world.player.ship.health < world.player.ship.max_health);
    }

    #[test]
    fn test_railgun_pierces_weaker_target() {
        let mut world = quiet_world();
        world.add_enemy(EnemyKind::Scout, Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.enemies[0].ship.health = 10.0;
        fire_railgun(&mut world, Faction::Player, 1, Vec2::new(300.0, 300.0), Vec2::ZERO, 90.0);
        let before = world.rounds[0].body.speed();
        let damage = world.rounds[0].damage;
        assert!(damage > 10.0);

        resolve(&mut world, 0.0);

        let round = &world.rounds[0];
        assert!(!round.destroyed);
        assert!(world.enemies[0].ship.destroyed);
        let expected = before * ((damage - 10.0) / damage).sqrt();
        assert!((round.body.speed() - expected).abs() < 1e-2);
        assert_eq!(round.pierced, vec![world.enemies[0].ship.id]);
    }

    #[test]
    fn test_railgun_consumed_by_tough_target() {
        let mut world = quiet_world();
        world.add_enemy(EnemyKind::Bomber, Vec2::new(300.0, 300.0), Vec2::ZERO);
        fire_railgun(&mut world, Faction::Player, 1, Vec2::new(300.0, 300.0), Vec2::ZERO, 90.0);
        let damage = world.rounds[0].damage;
        resolve(&mut world, 0.0);
        assert!(world.rounds[0].destroyed);
        let ship = &world.enemies[0].ship;
        assert!((ship.health - (ship.max_health - damage)).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_shoots_down_missile() {
        let mut world = quiet_world();
        fire_missile(&mut world, Faction::Enemy, 50, Vec2::new(200.0, 200.0), Vec2::ZERO, 0.0);
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(203.0, 200.0), Vec2::ZERO, 0.0);
        resolve(&mut world, 0.0);
        assert!(world.missiles[0].destroyed);
        assert!(world.bullets[0].destroyed);
    }

    #[test]
    fn test_round_survives_shooting_down_missile() {
        let mut world = quiet_world();
        fire_missile(&mut world, Faction::Enemy, 50, Vec2::new(200.0, 200.0), Vec2::ZERO, 0.0);
        fire_railgun(&mut world, Faction::Player, 1, Vec2::new(203.0, 200.0), Vec2::ZERO, 0.0);
        resolve(&mut world, 0.0);
        assert!(world.missiles[0].destroyed);
        assert!(!world.rounds[0].destroyed);
    }

    #[test]
    fn test_black_hole_absorbs_ship_once() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.add_enemy(EnemyKind::Scout, Vec2::new(340.0, 300.0), Vec2::ZERO);
        let r0 = world.black_holes[0].radius;

        resolve(&mut world, 0.0);
        assert!(world.enemies[0].ship.shrink.is_active());
        assert!((world.black_holes[0].radius - r0 * 1.01).abs() < 1e-4);

        resolve(&mut world, 0.0);
        assert!((world.black_holes[0].radius - r0 * 1.01).abs() < 1e-4);
        let absorbed = world
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Absorbed { .. }))
            .count();
        assert_eq!(absorbed, 1);
    }

    #[test]
    fn test_planet_growth_factor() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.add_planet(Vec2::new(350.0, 300.0), Vec2::ZERO, 40.0, 80.0);
        let before = world.black_holes[0].clone();
        resolve(&mut world, 0.0);
        let after = &world.black_holes[0];
        assert!(world.planets[0].shrink.is_active());
        assert!((after.radius - before.radius * 1.5).abs() < 1e-3);
        assert!((after.gravity_radius - before.gravity_radius * 1.5).abs() < 1e-3);
        assert!((after.distortion_radius - before.distortion_radius * 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_glances_off_meteor() {
        let mut world = quiet_world();
        world.add_meteor(Vec2::new(200.0, 200.0), Vec2::ZERO, 20.0);
        // Heading 90 = moving right, into the meteor's left side
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(180.0, 200.0), Vec2::ZERO, 90.0);
        resolve(&mut world, 0.0);
        let bullet = &world.bullets[0];
        assert!(!bullet.destroyed);
        assert!(bullet.body.vel.x < 0.0);
        assert!(bullet.body.pos.distance(Vec2::new(200.0, 200.0)) > 20.0 + bullet.body.radius);
    }

    #[test]
    fn test_missile_detonates_on_meteor() {
        let mut world = quiet_world();
        world.add_meteor(Vec2::new(200.0, 200.0), Vec2::ZERO, 20.0);
        fire_missile(&mut world, Faction::Enemy, 50, Vec2::new(190.0, 200.0), Vec2::ZERO, 90.0);
        resolve(&mut world, 0.0);
        assert!(world.missiles[0].destroyed);
    }

    #[test]
    fn test_projectile_destroyed_by_planet() {
        let mut world = quiet_world();
        world.add_planet(Vec2::new(200.0, 200.0), Vec2::ZERO, 40.0, 80.0);
        fire_bullet(&mut world, Faction::Player, 1, Vec2::new(210.0, 200.0), Vec2::ZERO, 90.0);
        resolve(&mut world, 0.0);
        assert!(world.bullets[0].destroyed);
    }

    #[test]
    fn test_ship_meteor_push_split() {
        let mut world = quiet_world();
        world.player.ship.body.pos = Vec2::new(100.0, 100.0);
        world.add_meteor(Vec2::new(150.0, 100.0), Vec2::ZERO, 30.0);
        resolve(&mut world, 0.0);
        // Overlap 10 px + slop: the ship takes 80 %
        let ship = world.player.ship.body.pos;
        let rock = world.meteors[0].body.pos;
        assert!(ship.x < 100.0 && rock.x > 150.0);
        assert!((100.0 - ship.x) > 3.0 * (rock.x - 150.0));
        assert!(rock.distance(ship) >= 60.0 - 1e-3);
    }

    #[test]
    fn test_ships_push_apart_symmetrically() {
        let mut world = quiet_world();
        world.player.ship.body.pos = Vec2::new(100.0, 100.0);
        world.add_enemy(EnemyKind::Scout, Vec2::new(140.0, 100.0), Vec2::new(-50.0, 0.0));
        resolve(&mut world, 0.0);
        let player = world.player.ship.body;
        let enemy = world.enemies[0].ship.body;
        assert!(((100.0 - player.pos.x) - (enemy.pos.x - 140.0)).abs() < 1e-3);
        // Equal-mass exchange along the normal
        assert!((player.vel.x + 50.0).abs() < 1e-3);
        assert!(enemy.vel.x.abs() < 1e-3);
    }

    #[test]
    fn test_pickup_heal_caps() {
        let mut world = quiet_world();
        world.player.ship.health = 90.0;
        let pos = world.player.ship.body.pos;
        world.add_pickup(PickupKind::Health, pos);
        world.add_pickup(PickupKind::RapidFire, pos);
        resolve(&mut world, 0.0);
        assert_eq!(world.player.ship.health, world.player.ship.max_health);
        assert!(world.pickups.iter().all(|p| p.collected));
        assert!(world.player.weapons.rapid_fire.is_some());
    }

    #[test]
    fn test_laser_damage_applies_dps() {
        let mut world = quiet_world();
        let id = world.add_enemy(EnemyKind::Bomber, Vec2::new(300.0, 300.0), Vec2::ZERO);
        world.player.weapons.laser.active = true;
        world.player.weapons.laser.hit = Some(id);
        resolve(&mut world, 0.5);
        let ship = &world.enemies[0].ship;
        let expected = ship.max_health - world.tuning.laser.dps * 0.5;
        assert!((ship.health - expected).abs() < 1e-3);
    }
}
