//! Renderer handoff
//!
//! A flat, read-only view of the world for one frame. The presentation
//! layer consumes this plus the drained events and never touches `World`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Ship};
use super::state::{GamePhase, PickupKind, World};
use crate::tuning::EnemyKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Enemy { kind: EnemyKind },
    Bullet,
    Missile,
    RailgunRound,
    Meteor,
    Planet,
    BlackHole,
    /// One sub-region of the nebula with the given id
    NebulaCloud,
    Pickup { kind: PickupKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    /// Field or lensing extent (planets and black holes)
    pub extent: Option<f32>,
    /// Ships only
    pub health: Option<f32>,
    pub flashing: bool,
    /// Absorption progress in [0, 1]
    pub shrink: f32,
    /// Fade-out opacity (pickups), 1.0 otherwise
    pub opacity: f32,
}

impl EntityView {
    fn new(id: EntityId, kind: EntityKind, pos: Vec2, angle: f32, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            angle,
            radius,
            extent: None,
            health: None,
            flashing: false,
            shrink: 0.0,
            opacity: 1.0,
        }
    }

    fn ship(ship: &Ship, kind: EntityKind) -> Self {
        Self {
            health: Some(ship.health_fraction()),
            flashing: ship.flash > 0.0,
            shrink: ship.shrink.progress(),
            ..Self::new(ship.id, kind, ship.body.pos, ship.body.angle, ship.body.radius)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamView {
    pub active: bool,
    pub points: Vec<Vec2>,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub frame: u64,
    pub time: f32,
    pub score: u64,
    pub phase: GamePhase,
    pub entities: Vec<EntityView>,
    pub laser: BeamView,
}

impl Snapshot {
    /// Capture the live (not destroyed) state of `world`
    pub fn capture(world: &World) -> Self {
        let mut entities = Vec::new();
        let pickups = &world.tuning.pickups;

        for nebula in &world.nebulae {
            for cloud in &nebula.clouds {
                entities.push(EntityView::new(
                    nebula.id,
                    EntityKind::NebulaCloud,
                    nebula.cloud_center(cloud),
                    0.0,
                    cloud.radius,
                ));
            }
        }
        for hole in world.black_holes.iter().filter(|b| !b.destroyed) {
            entities.push(EntityView {
                extent: Some(hole.distortion_radius),
                ..EntityView::new(hole.id, EntityKind::BlackHole, hole.pos, 0.0, hole.radius)
            });
        }
        for planet in world.planets.iter().filter(|p| !p.destroyed) {
            entities.push(EntityView {
                extent: Some(planet.gravity_radius),
                shrink: planet.shrink.progress(),
                ..EntityView::new(planet.id, EntityKind::Planet, planet.body.pos, 0.0, planet.body.radius)
            });
        }
        for meteor in world.meteors.iter().filter(|m| !m.destroyed) {
            entities.push(EntityView {
                shrink: meteor.shrink.progress(),
                ..EntityView::new(
                    meteor.id,
                    EntityKind::Meteor,
                    meteor.body.pos,
                    meteor.body.angle,
                    meteor.body.radius,
                )
            });
        }
        for pickup in world.pickups.iter().filter(|p| !p.collected) {
            let bob = (pickup.age * pickups.bob_speed + pickup.bob_phase).sin() * pickups.bob_amplitude;
            let remaining = pickups.lifetime - pickup.age;
            let opacity = if pickups.fade_time > 0.0 {
                (remaining / pickups.fade_time).clamp(0.0, 1.0)
            } else {
                1.0
            };
            entities.push(EntityView {
                opacity,
                ..EntityView::new(
                    pickup.id,
                    EntityKind::Pickup { kind: pickup.kind },
                    pickup.pos + Vec2::new(0.0, bob),
                    0.0,
                    pickups.radius,
                )
            });
        }

        if !world.player.ship.destroyed {
            entities.push(EntityView::ship(&world.player.ship, EntityKind::Player));
        }
        for enemy in world.enemies.iter().filter(|e| !e.ship.destroyed) {
            entities.push(EntityView::ship(&enemy.ship, EntityKind::Enemy { kind: enemy.kind }));
        }

        for bullet in world.bullets.iter().filter(|b| !b.destroyed) {
            let b = &bullet.body;
            entities.push(EntityView::new(bullet.id, EntityKind::Bullet, b.pos, b.angle, b.radius));
        }
        for missile in world.missiles.iter().filter(|m| !m.destroyed) {
            let b = &missile.body;
            entities.push(EntityView::new(missile.id, EntityKind::Missile, b.pos, b.angle, b.radius));
        }
        for round in world.rounds.iter().filter(|r| !r.destroyed) {
            let b = &round.body;
            entities.push(EntityView::new(round.id, EntityKind::RailgunRound, b.pos, b.angle, b.radius));
        }

        let beam = &world.player.weapons.laser;
        Self {
            frame: world.frame,
            time: world.time,
            score: world.score,
            phase: world.phase,
            entities,
            laser: BeamView {
                active: beam.active,
                points: beam.points.clone(),
                intensity: beam.intensity,
            },
        }
    }

    /// Views of one kind, in draw order
    pub fn of_kind(&self, pred: impl Fn(&EntityKind) -> bool) -> impl Iterator<Item = &EntityView> {
        self.entities.iter().filter(move |e| pred(&e.kind))
    }
}
