//! Laser ray tracing
//!
//! The beam is re-traced every frame it is held. It marches in fixed steps,
//! scatters inside nebulae, bends toward black holes, reflects off planets
//! and meteors, and stops at the first ship or event horizon.

use glam::Vec2;
use rand::Rng;

use super::entity::EntityId;
use super::state::{GameEvent, LaserBeam, World};
use crate::consts::EPSILON;
use crate::{angle_delta, bearing, heading_of, heading_vec, normalize_degrees, reflect};

/// A reflecting circle (planet or meteor)
#[derive(Debug, Clone, Copy)]
struct Mirror {
    center: Vec2,
    radius: f32,
    reflectivity: f32,
}

/// Trace a beam from `origin` along `heading`, ignoring the `owner` ship
pub fn trace(world: &World, origin: Vec2, heading: f32, owner: EntityId, rng: &mut impl Rng) -> LaserBeam {
    let t = &world.tuning.laser;
    let bounds = world.bounds();

    let mirrors: Vec<Mirror> = world
        .planets
        .iter()
        .filter(|p| !p.destroyed && !p.shrink.is_active())
        .map(|p| Mirror {
            center: p.body.pos,
            radius: p.body.radius,
            reflectivity: p.reflectivity,
        })
        .chain(
            world
                .meteors
                .iter()
                .filter(|m| !m.destroyed && !m.shrink.is_active())
                .map(|m| Mirror {
                    center: m.body.pos,
                    radius: m.body.radius,
                    reflectivity: m.reflectivity,
                }),
        )
        .collect();

    let ships: Vec<(EntityId, Vec2, f32)> = std::iter::once(&world.player.ship)
        .chain(world.enemies.iter().map(|e| &e.ship))
        .filter(|s| s.id != owner && !s.destroyed && !s.shrink.is_active())
        .map(|s| (s.id, s.body.pos, s.body.radius))
        .collect();

    let mut beam = LaserBeam {
        active: true,
        points: vec![origin],
        hit: None,
        bounces: 0,
        intensity: 1.0,
    };
    let mut pos = origin;
    let mut dir = heading;
    let mut travelled = 0.0;
    let mut reflect_mult = 1.0;

    'march: for _ in 0..t.max_steps {
        if t.nebula_jitter > 0.0 && world.nebulae.iter().any(|n| n.contains(pos)) {
            dir += rng.random_range(-t.nebula_jitter..=t.nebula_jitter);
        }

        for hole in world.black_holes.iter().filter(|b| !b.destroyed) {
            let d = pos.distance(hole.pos);
            if d <= EPSILON || d >= hole.gravity_radius {
                continue;
            }
            if let Some(toward) = bearing(pos, hole.pos) {
                let diff = angle_delta(dir, toward);
                let bend = (t.bend_strength / (d * d)).min(diff.abs());
                dir += bend * diff.signum();
            }
        }
        dir = normalize_degrees(dir);

        pos += heading_vec(dir) * t.step;
        travelled += t.step;

        if world
            .black_holes
            .iter()
            .any(|b| !b.destroyed && pos.distance(b.pos) < b.radius)
        {
            break 'march;
        }

        for &(id, center, radius) in &ships {
            if pos.distance(center) < radius {
                beam.hit = Some(id);
                break 'march;
            }
        }

        for mirror in &mirrors {
            let offset = pos - mirror.center;
            let d = offset.length();
            if d >= mirror.radius {
                continue;
            }
            let travel = heading_vec(dir);
            let normal = if d > EPSILON { offset / d } else { -travel };
            dir = heading_of(reflect(travel, normal));
            reflect_mult *= mirror.reflectivity;
            beam.bounces += 1;
            pos = mirror.center + normal * (mirror.radius + t.surface_offset);
            beam.points.push(pos);
            break;
        }

        beam.intensity = (-t.decay * travelled).exp() * reflect_mult;
        if beam.intensity < t.min_intensity || beam.bounces > t.max_bounces {
            break;
        }
        if pos.x < -t.margin
            || pos.y < -t.margin
            || pos.x > bounds.x + t.margin
            || pos.y > bounds.y + t.margin
        {
            break;
        }
    }

    beam.intensity = (-t.decay * travelled).exp() * reflect_mult;
    if beam.points.last() != Some(&pos) {
        beam.points.push(pos);
    }
    beam
}

/// Re-trace or clear the player's beam for this frame
pub fn update_laser(world: &mut World, firing: bool) {
    let was_active = world.player.weapons.laser.active;
    let ship = &world.player.ship;

    if firing && ship.is_targetable() {
        let origin = ship.body.mount(world.tuning.player.mount_offset);
        let heading = ship.body.angle;
        let owner = ship.id;
        let mut rng = world.rng.clone();
        let beam = trace(world, origin, heading, owner, &mut rng);
        world.rng = rng;
        world.player.weapons.laser = beam;
    } else {
        world.player.weapons.laser.clear();
    }

    let active = world.player.weapons.laser.active;
    if active != was_active {
        world.emit(GameEvent::LaserActive(active));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{EnemyKind, SpawnLimits};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiet_world() -> World {
        let mut world = World::with_default_tuning(21);
        world.set_spawn_limits(SpawnLimits::none());
        // Park the player out of the way of test rays
        world.player.ship.body.pos = Vec2::new(1200.0, 650.0);
        world
    }

    #[test]
    fn test_reflects_off_planet() {
        let mut world = quiet_world();
        world.add_planet(Vec2::new(300.0, 100.0), Vec2::ZERO, 40.0, 80.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let beam = trace(&world, Vec2::new(300.0, 300.0), 0.0, 1, &mut rng);

        assert_eq!(beam.bounces, 1);
        assert_eq!(beam.hit, None);
        let bounce = beam.points[1];
        assert!((bounce - Vec2::new(300.0, 142.0)).length() < 1e-3);
        // Comes straight back down and leaves the playfield
        let end = *beam.points.last().expect("end point");
        assert!((end.x - 300.0).abs() < 1e-2);
        assert!(end.y > world.bounds().y);
        assert!(beam.intensity < world.tuning.planets.reflectivity);
    }

    #[test]
    fn test_shrinking_bodies_do_not_reflect() {
        let mut world = quiet_world();
        world.add_planet(Vec2::new(300.0, 100.0), Vec2::ZERO, 40.0, 80.0);
        world.add_meteor(Vec2::new(300.0, 200.0), Vec2::ZERO, 20.0);
        world.planets[0].shrink.start(Vec2::new(300.0, 0.0));
        world.meteors[0].shrink.start(Vec2::new(300.0, 0.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let beam = trace(&world, Vec2::new(300.0, 300.0), 0.0, 1, &mut rng);

        assert_eq!(beam.bounces, 0);
        let end = *beam.points.last().expect("end point");
        assert!(end.y < 0.0);
    }

    #[test]
    fn test_stops_at_event_horizon() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(300.0, 100.0), Vec2::ZERO);
        let mut rng = Pcg32::seed_from_u64(1);
        let beam = trace(&world, Vec2::new(300.0, 300.0), 0.0, 1, &mut rng);

        assert_eq!(beam.hit, None);
        assert_eq!(beam.bounces, 0);
        let end = *beam.points.last().expect("end point");
        assert!(end.distance(Vec2::new(300.0, 100.0)) < world.tuning.black_holes.radius);
    }

    #[test]
    fn test_black_hole_bends_passing_ray() {
        let mut world = quiet_world();
        world.add_black_hole(Vec2::new(400.0, 150.0), Vec2::ZERO);
        let mut rng = Pcg32::seed_from_u64(1);
        let beam = trace(&world, Vec2::new(300.0, 600.0), 0.0, 1, &mut rng);
        let end = *beam.points.last().expect("end point");
        // An unbent ray would stay on x = 300
        assert!(end.x > 300.5);
    }

    #[test]
    fn test_reports_ship_hit_and_skips_owner() {
        let mut world = quiet_world();
        let enemy = world.add_enemy(EnemyKind::Bomber, Vec2::new(300.0, 100.0), Vec2::ZERO);
        let mut rng = Pcg32::seed_from_u64(1);
        let beam = trace(&world, Vec2::new(300.0, 300.0), 0.0, 1, &mut rng);
        assert_eq!(beam.hit, Some(enemy));

        // Traced by the enemy itself, the ray passes through
        let beam = trace(&world, Vec2::new(300.0, 300.0), 0.0, enemy, &mut rng);
        assert_eq!(beam.hit, None);
    }

    #[test]
    fn test_laser_active_event_on_toggle() {
        let mut world = quiet_world();
        update_laser(&mut world, true);
        assert!(world.player.weapons.laser.active);
        update_laser(&mut world, true);
        update_laser(&mut world, false);
        assert!(!world.player.weapons.laser.active);
        let toggles: Vec<_> = world
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::LaserActive(on) => Some(on),
                _ => None,
            })
            .collect();
        assert_eq!(toggles, vec![true, false]);
    }
}
