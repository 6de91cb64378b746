//! Simulation state and entity types
//!
//! Every live entity is owned by exactly one per-type collection on the
//! `World`. Cross references (`fired_by`, missile targets, laser hits) are
//! plain ids used for lookup only.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId, Faction, Ship, Shrink};
use crate::tuning::{EnemyKind, EnergyModel, ExplosionSize, SpawnLimits, Tuning};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Terminal: no further frames are simulated
    GameOver,
}

/// Discrete events for the presentation / audio / scoring layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Explosion { pos: Vec2, size: ExplosionSize },
    PickupSpawned { pos: Vec2, kind: PickupKind },
    PickupCollected { kind: PickupKind },
    ScoreDelta(u32),
    LaserActive(bool),
    Absorbed { pos: Vec2 },
    GameOver { score: u64 },
}

/// Rate-of-fire boost granted by a pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RapidFire {
    pub multiplier: f32,
    pub remaining: f32,
}

/// Result of the most recent laser trace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserBeam {
    pub active: bool,
    /// Muzzle, every bounce point, and the end of the ray
    pub points: Vec<Vec2>,
    pub hit: Option<EntityId>,
    pub bounces: u32,
    /// Intensity at the end of the ray
    pub intensity: f32,
}

impl LaserBeam {
    pub fn clear(&mut self) {
        self.active = false;
        self.points.clear();
        self.hit = None;
        self.bounces = 0;
        self.intensity = 0.0;
    }
}

/// Player weapon slots and their timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerWeapons {
    pub bullet_cooldown: f32,
    pub missile_cooldown: f32,
    pub railgun_cooldown: f32,
    /// Missile trigger held on the previous frame (edge detection)
    pub missile_latch: bool,
    pub rapid_fire: Option<RapidFire>,
    pub laser: LaserBeam,
}

impl PlayerWeapons {
    /// Cooldown divisor from an active rate-of-fire boost
    pub fn fire_rate_multiplier(&self) -> f32 {
        self.rapid_fire
            .map(|boost| boost.multiplier.max(1.0))
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub ship: Ship,
    pub weapons: PlayerWeapons,
}

/// Per-enemy steering memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringState {
    /// Seconds until the next periodic retarget
    pub retarget_timer: f32,
    /// Last computed target heading (degrees)
    pub target_heading: f32,
}

/// Weapon energy pool for archetypes that model it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPool {
    pub current: f32,
    pub model: EnergyModel,
}

impl EnergyPool {
    pub fn full(model: EnergyModel) -> Self {
        Self {
            current: model.max,
            model,
        }
    }

    pub fn regen(&mut self, dt: f32) {
        self.current = (self.current + self.model.regen_rate * dt).min(self.model.max);
    }

    #[inline]
    pub fn can_fire(&self) -> bool {
        self.current >= self.model.shot_cost
    }

    pub fn spend(&mut self) {
        self.current = (self.current - self.model.shot_cost).max(0.0);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub ship: Ship,
    pub kind: EnemyKind,
    pub steering: SteeringState,
    pub shoot_cooldown: f32,
    pub energy: Option<EnergyPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub body: Body,
    pub damage: f32,
    pub owner: Faction,
    pub fired_by: EntityId,
    pub age: f32,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    pub id: EntityId,
    /// `body.vel` is always `heading·thrust_speed + drift`
    pub body: Body,
    pub owner: Faction,
    pub fired_by: EntityId,
    pub age: f32,
    /// Current thrust magnitude, ramping toward max speed
    pub thrust_speed: f32,
    /// Externally accumulated velocity (inherited momentum + gravity)
    pub drift: Vec2,
    /// Aim point chosen this frame
    pub target: Option<EntityId>,
    pub destroyed: bool,
}

impl Missile {
    #[inline]
    pub fn is_armed(&self, arming_delay: f32) -> bool {
        self.age >= arming_delay
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailgunRound {
    pub id: EntityId,
    pub body: Body,
    pub owner: Faction,
    pub fired_by: EntityId,
    /// Kinetic damage at the current speed
    pub damage: f32,
    pub penetrating: bool,
    /// Seconds spent below the low-speed threshold
    pub slow_time: f32,
    /// Ships this round already passed through
    pub pierced: Vec<EntityId>,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: EntityId,
    pub body: Body,
    pub gravity_radius: f32,
    pub gravity_strength: f32,
    pub reflectivity: f32,
    pub shrink: Shrink,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackHole {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Event horizon
    pub radius: f32,
    pub gravity_radius: f32,
    /// Visual lensing extent
    pub distortion_radius: f32,
    pub gravity_strength: f32,
    /// Consuming nebula material this frame
    pub feeding: bool,
    pub destroyed: bool,
}

impl BlackHole {
    /// Multiplicative growth after absorbing a body
    pub fn grow(&mut self, factor: f32) {
        self.radius *= factor;
        self.gravity_radius *= factor;
        self.distortion_radius *= factor;
    }

    /// Linear growth (px) of the horizon; the other radii keep their ratio
    pub fn grow_by(&mut self, amount: f32) {
        if self.radius <= 0.0 {
            return;
        }
        let factor = (self.radius + amount) / self.radius;
        self.grow(factor);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NebulaCloud {
    /// Offset from the nebula center
    pub offset: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nebula {
    pub id: EntityId,
    pub center: Vec2,
    pub vel: Vec2,
    pub clouds: Vec<NebulaCloud>,
}

impl Nebula {
    #[inline]
    pub fn cloud_center(&self, cloud: &NebulaCloud) -> Vec2 {
        self.center + cloud.offset
    }

    /// Whether `p` lies inside any live sub-region
    pub fn contains(&self, p: Vec2) -> bool {
        self.clouds
            .iter()
            .any(|c| c.radius > 0.0 && p.distance_squared(self.cloud_center(c)) < c.radius * c.radius)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub id: EntityId,
    pub body: Body,
    pub reflectivity: f32,
    pub shrink: Shrink,
    pub destroyed: bool,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    RapidFire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub age: f32,
    /// Phase offset of the floating animation
    pub bob_phase: f32,
    pub collected: bool,
}

/// Countdown timers for transient spawns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub enemy: f32,
    pub meteor: f32,
    pub planet: f32,
    pub black_hole: f32,
    pub nebula: f32,
}

/// Addresses one ship regardless of which collection owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipSlot {
    Player,
    Enemy(usize),
}

/// The complete simulation state, passed by `&mut` into each subsystem
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Arc<Tuning>,
    pub limits: SpawnLimits,
    pub seed: u64,
    pub rng: Pcg32,
    /// Frames simulated so far
    pub frame: u64,
    /// Simulated seconds
    pub time: f32,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub missiles: Vec<Missile>,
    pub rounds: Vec<RailgunRound>,
    pub meteors: Vec<Meteor>,
    pub planets: Vec<Planet>,
    pub black_holes: Vec<BlackHole>,
    pub nebulae: Vec<Nebula>,
    pub pickups: Vec<Pickup>,
    pub timers: SpawnTimers,
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl World {
    /// Create a world with the player parked at the center of the playfield
    pub fn new(seed: u64, tuning: Arc<Tuning>) -> Self {
        let center = Vec2::new(tuning.playfield.width, tuning.playfield.height) * 0.5;
        let player_body = Body::new(
            center,
            Vec2::ZERO,
            tuning.player.radius,
            tuning.player.max_speed,
        );
        let player = Player {
            ship: Ship::new(1, Faction::Player, player_body, tuning.player.max_health),
            weapons: PlayerWeapons::default(),
        };
        let limits = tuning.spawn.clone();
        let timers = SpawnTimers {
            enemy: limits.enemy_interval,
            meteor: limits.meteor_interval,
            planet: limits.planet_interval * 0.25,
            black_hole: limits.black_hole_interval,
            nebula: limits.nebula_interval * 0.5,
        };

        Self {
            tuning,
            limits,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
            time: 0.0,
            phase: GamePhase::Playing,
            score: 0,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            missiles: Vec::new(),
            rounds: Vec::new(),
            meteors: Vec::new(),
            planets: Vec::new(),
            black_holes: Vec::new(),
            nebulae: Vec::new(),
            pickups: Vec::new(),
            timers,
            events: Vec::new(),
            next_id: 2,
        }
    }

    /// World with the shipped balance table
    pub fn with_default_tuning(seed: u64) -> Self {
        Self::new(seed, Arc::new(Tuning::default()))
    }

    /// Replace the spawn caps (difficulty tier changed)
    pub fn set_spawn_limits(&mut self, limits: SpawnLimits) {
        self.limits = limits;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    #[inline]
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.tuning.playfield.width, self.tuning.playfield.height)
    }

    pub fn ship(&self, slot: ShipSlot) -> &Ship {
        match slot {
            ShipSlot::Player => &self.player.ship,
            ShipSlot::Enemy(i) => &self.enemies[i].ship,
        }
    }

    pub fn ship_mut(&mut self, slot: ShipSlot) -> &mut Ship {
        match slot {
            ShipSlot::Player => &mut self.player.ship,
            ShipSlot::Enemy(i) => &mut self.enemies[i].ship,
        }
    }

    /// All ship slots, player first
    pub fn ship_slots(&self) -> Vec<ShipSlot> {
        std::iter::once(ShipSlot::Player)
            .chain((0..self.enemies.len()).map(ShipSlot::Enemy))
            .collect()
    }

    pub fn find_ship(&self, id: EntityId) -> Option<ShipSlot> {
        if self.player.ship.id == id {
            return Some(ShipSlot::Player);
        }
        self.enemies
            .iter()
            .position(|e| e.ship.id == id)
            .map(ShipSlot::Enemy)
    }

    /// Insert an active (already inside) enemy of `kind`
    pub fn add_enemy(&mut self, kind: EnemyKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let row = *self.tuning.enemies.get(kind);
        let mut body = Body::new(pos, vel, row.radius, row.max_speed);
        if vel.length_squared() > 0.0 {
            body.angle = crate::heading_of(vel);
        }
        let cooldown = super::uniform(&mut self.rng, row.cooldown_min, row.cooldown_max);
        self.enemies.push(Enemy {
            ship: Ship::new(id, Faction::Enemy, body, row.max_health),
            kind,
            steering: SteeringState {
                retarget_timer: 0.0,
                target_heading: body.angle,
            },
            shoot_cooldown: cooldown,
            energy: row.energy.map(EnergyPool::full),
        });
        id
    }

    pub fn add_meteor(&mut self, pos: Vec2, vel: Vec2, radius: f32) -> EntityId {
        let id = self.next_entity_id();
        let tuning = &self.tuning.meteors;
        self.meteors.push(Meteor {
            id,
            body: Body::new(pos, vel, radius, tuning.max_speed),
            reflectivity: tuning.reflectivity,
            shrink: Shrink::default(),
            destroyed: false,
        });
        id
    }

    pub fn add_planet(&mut self, pos: Vec2, vel: Vec2, radius: f32, strength: f32) -> EntityId {
        let id = self.next_entity_id();
        let tuning = &self.tuning.planets;
        self.planets.push(Planet {
            id,
            body: Body::new(pos, vel, radius, tuning.max_speed),
            gravity_radius: radius * tuning.gravity_radius_factor,
            gravity_strength: strength,
            reflectivity: tuning.reflectivity,
            shrink: Shrink::default(),
            destroyed: false,
        });
        id
    }

    pub fn add_black_hole(&mut self, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let tuning = &self.tuning.black_holes;
        self.black_holes.push(BlackHole {
            id,
            pos,
            vel,
            radius: tuning.radius,
            gravity_radius: tuning.radius * tuning.gravity_radius_factor,
            distortion_radius: tuning.radius * tuning.distortion_radius_factor,
            gravity_strength: tuning.strength,
            feeding: false,
            destroyed: false,
        });
        id
    }

    pub fn add_nebula(&mut self, center: Vec2, vel: Vec2, clouds: Vec<NebulaCloud>) -> EntityId {
        let id = self.next_entity_id();
        self.nebulae.push(Nebula {
            id,
            center,
            vel,
            clouds,
        });
        id
    }

    pub fn add_pickup(&mut self, kind: PickupKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let bob_phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.pickups.push(Pickup {
            id,
            kind,
            pos,
            age: 0.0,
            bob_phase,
            collected: false,
        });
        self.emit(GameEvent::PickupSpawned { pos, kind });
        id
    }

    /// Drop everything flagged for removal this frame
    pub fn prune(&mut self) {
        self.enemies.retain(|e| !e.ship.destroyed);
        self.bullets.retain(|b| !b.destroyed);
        self.missiles.retain(|m| !m.destroyed);
        self.rounds.retain(|r| !r.destroyed);
        self.meteors.retain(|m| !m.destroyed);
        self.planets.retain(|p| !p.destroyed);
        self.black_holes.retain(|b| !b.destroyed);
        self.nebulae.retain(|n| !n.clouds.is_empty());
        self.pickups.retain(|p| !p.collected);
    }
}
