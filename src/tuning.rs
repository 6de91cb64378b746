//! Data-driven game balance
//!
//! Every speed, damage, radius, cooldown band and falloff constant the
//! simulation reads lives here. The table is handed to the world once at
//! construction and never mutated by the core. Loading it from disk is the
//! caller's business; `from_json` is a convenience for callers that keep it
//! as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a ship treats the playfield edges once it is fully inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallPolicy {
    /// Invert the violating velocity component
    Bounce,
    /// Reappear on the opposite edge (handled by the lifecycle pass)
    Wrap,
    /// Clip position into bounds
    Clamp,
    /// Leave the playfield freely; culled once far offscreen
    Ignore,
}

/// Steering behavior of an enemy archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Coast at the current velocity
    None,
    /// Retarget toward the player every `turn_interval` seconds, keep speed
    Periodic { turn_interval: f32, turn_speed: f32 },
    /// Retarget every frame, speed re-derived from the nominal speed
    Continuous { turn_speed: f32 },
    /// Stand off: slow down between `start_distance` and `stop_distance`
    DistanceBased {
        stop_distance: f32,
        start_distance: f32,
        min_speed: f32,
        turn_speed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Bullet,
    Missile,
    Laser,
    Railgun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Scout,
    Hunter,
    Sniper,
    Bomber,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Scout,
        EnemyKind::Hunter,
        EnemyKind::Sniper,
        EnemyKind::Bomber,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplosionSize {
    Small,
    Medium,
    Large,
}

/// Regenerating weapon energy for archetypes that model it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    pub max: f32,
    /// Energy per second
    pub regen_rate: f32,
    pub shot_cost: f32,
}

/// One row of the enemy archetype table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub max_health: f32,
    pub radius: f32,
    /// Nominal cruise speed (px/s)
    pub speed: f32,
    /// Hard speed cap after external forces (px/s)
    pub max_speed: f32,
    pub movement: MovementPolicy,
    pub wall: WallPolicy,
    pub weapon: WeaponKind,
    pub cooldown_min: f32,
    pub cooldown_max: f32,
    pub energy: Option<EnergyModel>,
    pub mount_offset: f32,
    pub score: u32,
    pub explosion: ExplosionSize,
    /// Probability of a rate-of-fire pickup on death
    pub rapid_fire_drop_chance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub scout: EnemyArchetype,
    pub hunter: EnemyArchetype,
    pub sniper: EnemyArchetype,
    pub bomber: EnemyArchetype,
}

impl EnemyTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemyArchetype {
        match kind {
            EnemyKind::Scout => &self.scout,
            EnemyKind::Hunter => &self.hunter,
            EnemyKind::Sniper => &self.sniper,
            EnemyKind::Bomber => &self.bomber,
        }
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            scout: EnemyArchetype {
                max_health: 30.0,
                radius: 22.0,
                speed: 180.0,
                max_speed: 300.0,
                movement: MovementPolicy::Continuous { turn_speed: 120.0 },
                wall: WallPolicy::Bounce,
                weapon: WeaponKind::Bullet,
                cooldown_min: 1.2,
                cooldown_max: 2.4,
                energy: None,
                mount_offset: 24.0,
                score: 100,
                explosion: ExplosionSize::Small,
                rapid_fire_drop_chance: 0.10,
            },
            hunter: EnemyArchetype {
                max_health: 50.0,
                radius: 26.0,
                speed: 220.0,
                max_speed: 320.0,
                movement: MovementPolicy::Periodic {
                    turn_interval: 1.5,
                    turn_speed: 90.0,
                },
                wall: WallPolicy::Wrap,
                weapon: WeaponKind::Bullet,
                cooldown_min: 0.8,
                cooldown_max: 1.6,
                energy: None,
                mount_offset: 28.0,
                score: 150,
                explosion: ExplosionSize::Medium,
                rapid_fire_drop_chance: 0.15,
            },
            sniper: EnemyArchetype {
                max_health: 40.0,
                radius: 24.0,
                speed: 150.0,
                max_speed: 260.0,
                movement: MovementPolicy::DistanceBased {
                    stop_distance: 250.0,
                    start_distance: 450.0,
                    min_speed: 20.0,
                    turn_speed: 90.0,
                },
                wall: WallPolicy::Clamp,
                weapon: WeaponKind::Railgun,
                cooldown_min: 2.5,
                cooldown_max: 4.0,
                energy: Some(EnergyModel {
                    max: 100.0,
                    regen_rate: 20.0,
                    shot_cost: 50.0,
                }),
                mount_offset: 26.0,
                score: 250,
                explosion: ExplosionSize::Medium,
                rapid_fire_drop_chance: 0.25,
            },
            bomber: EnemyArchetype {
                max_health: 120.0,
                radius: 40.0,
                speed: 70.0,
                max_speed: 200.0,
                movement: MovementPolicy::None,
                wall: WallPolicy::Ignore,
                weapon: WeaponKind::Missile,
                cooldown_min: 3.0,
                cooldown_max: 5.0,
                energy: None,
                mount_offset: 42.0,
                score: 300,
                explosion: ExplosionSize::Large,
                rapid_fire_drop_chance: 0.35,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldTuning {
    pub width: f32,
    pub height: f32,
    /// Ships/meteors further than this outside the bounds are culled
    pub offscreen_margin: f32,
    /// Planets and black holes get a wider margin (their fields reach in)
    pub field_margin: f32,
    /// Fraction of the playfield (centered) that spawned bodies aim at
    pub aim_region: f32,
}

impl Default for PlayfieldTuning {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            offscreen_margin: 120.0,
            field_margin: 400.0,
            aim_region: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub radius: f32,
    pub max_speed: f32,
    /// Degrees per second
    pub turn_speed: f32,
    pub thrust_accel: f32,
    pub reverse_accel: f32,
    /// Fraction of velocity shed per second with no thrust
    pub damping: f32,
    pub wall: WallPolicy,
    pub flash_duration: f32,
    pub mount_offset: f32,
    pub bullet_cooldown: f32,
    pub missile_cooldown: f32,
    pub railgun_cooldown: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            radius: 30.0,
            max_speed: 400.0,
            turn_speed: 240.0,
            thrust_accel: 500.0,
            reverse_accel: 300.0,
            damping: 0.5,
            wall: WallPolicy::Clamp,
            flash_duration: 0.15,
            mount_offset: 32.0,
            bullet_cooldown: 0.2,
            missile_cooldown: 1.0,
            railgun_cooldown: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    pub player_speed: f32,
    pub enemy_speed: f32,
    pub player_damage: f32,
    pub enemy_damage: f32,
    pub max_speed: f32,
    pub lifetime: f32,
    pub radius: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            player_speed: 600.0,
            enemy_speed: 350.0,
            player_damage: 10.0,
            enemy_damage: 10.0,
            max_speed: 900.0,
            lifetime: 3.0,
            radius: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileTuning {
    pub launch_speed: f32,
    pub accel: f32,
    pub max_speed: f32,
    /// Degrees per second
    pub turn_rate: f32,
    pub arming_delay: f32,
    pub damage: f32,
    pub lifetime: f32,
    pub radius: f32,
    /// Full acquisition range inside this half-angle (degrees)
    pub front_half_angle: f32,
    /// Nothing is tracked beyond this half-angle (degrees)
    pub max_half_angle: f32,
    pub front_range: f32,
    pub side_range: f32,
    pub distance_weight: f32,
    pub angle_weight: f32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            launch_speed: 120.0,
            accel: 400.0,
            max_speed: 450.0,
            turn_rate: 180.0,
            arming_delay: 0.5,
            damage: 40.0,
            lifetime: 6.0,
            radius: 8.0,
            front_half_angle: 20.0,
            max_half_angle: 75.0,
            front_range: 600.0,
            side_range: 250.0,
            distance_weight: 1.0,
            angle_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    /// March step length (px)
    pub step: f32,
    pub max_steps: u32,
    /// Exponential intensity decay per pixel travelled
    pub decay: f32,
    pub min_intensity: f32,
    pub max_bounces: u32,
    /// How far past the playfield the ray may travel before it is cut
    pub margin: f32,
    /// Max random deflection per step inside a nebula (degrees)
    pub nebula_jitter: f32,
    /// Bend per step toward a black hole is `bend_strength / d²` degrees
    pub bend_strength: f32,
    /// Distance the ray is moved off a reflecting surface
    pub surface_offset: f32,
    /// Damage per second while the beam rests on a ship
    pub dps: f32,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            step: 6.0,
            max_steps: 600,
            decay: 0.0015,
            min_intensity: 0.15,
            max_bounces: 4,
            margin: 50.0,
            nebula_jitter: 1.5,
            bend_strength: 4000.0,
            surface_offset: 2.0,
            dps: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailgunTuning {
    pub muzzle_speed: f32,
    pub max_speed: f32,
    /// damage = min(energy_coefficient · v², max_damage)
    pub energy_coefficient: f32,
    pub max_damage: f32,
    pub penetrating: bool,
    /// Deflection (degrees) applied when a round keeps almost none of its speed
    pub max_deflection: f32,
    pub slow_threshold: f32,
    pub slow_timeout: f32,
    pub radius: f32,
}

impl Default for RailgunTuning {
    fn default() -> Self {
        Self {
            muzzle_speed: 900.0,
            max_speed: 1100.0,
            energy_coefficient: 0.0001,
            max_damage: 120.0,
            penetrating: true,
            max_deflection: 25.0,
            slow_threshold: 150.0,
            slow_timeout: 1.5,
            radius: 3.0,
        }
    }
}

/// Falloff shape of one emitter family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FalloffTuning {
    /// Strength fraction at the field edge
    pub floor: f32,
    /// Strength fraction at the center
    pub ceiling: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityTuning {
    pub planet: FalloffTuning,
    pub black_hole: FalloffTuning,
    pub ship_multiplier: f32,
    pub projectile_multiplier: f32,
    /// Meteors and planets
    pub background_multiplier: f32,
    /// Minimum speed after bouncing off a planet, as a multiple of its strength
    pub escape_factor: f32,
}

impl Default for GravityTuning {
    fn default() -> Self {
        Self {
            planet: FalloffTuning {
                floor: 0.1,
                ceiling: 1.0,
            },
            black_hole: FalloffTuning {
                floor: 0.25,
                ceiling: 1.0,
            },
            ship_multiplier: 1.0,
            projectile_multiplier: 2.5,
            background_multiplier: 0.6,
            escape_factor: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetTuning {
    pub radius_min: f32,
    pub radius_max: f32,
    /// Gravity radius as a multiple of the body radius
    pub gravity_radius_factor: f32,
    pub strength_min: f32,
    pub strength_max: f32,
    pub drift_min: f32,
    pub drift_max: f32,
    pub reflectivity: f32,
    pub max_speed: f32,
}

impl Default for PlanetTuning {
    fn default() -> Self {
        Self {
            radius_min: 40.0,
            radius_max: 80.0,
            gravity_radius_factor: 4.0,
            strength_min: 60.0,
            strength_max: 120.0,
            drift_min: 8.0,
            drift_max: 20.0,
            reflectivity: 0.7,
            max_speed: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackHoleTuning {
    pub radius: f32,
    pub gravity_radius_factor: f32,
    pub distortion_radius_factor: f32,
    pub strength: f32,
    pub drift_min: f32,
    pub drift_max: f32,
    pub growth_ship: f32,
    pub growth_meteor: f32,
    pub growth_planet: f32,
    /// Linear radius growth (px/s) while a nebula cloud is being consumed
    pub nebula_growth_rate: f32,
}

impl Default for BlackHoleTuning {
    fn default() -> Self {
        Self {
            radius: 30.0,
            gravity_radius_factor: 8.0,
            distortion_radius_factor: 3.0,
            strength: 220.0,
            drift_min: 5.0,
            drift_max: 12.0,
            growth_ship: 1.01,
            growth_meteor: 1.10,
            growth_planet: 1.5,
            nebula_growth_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NebulaTuning {
    pub clouds_min: u32,
    pub clouds_max: u32,
    pub cloud_radius_min: f32,
    pub cloud_radius_max: f32,
    /// Max offset of a cloud from the nebula center
    pub spread: f32,
    pub drift_min: f32,
    pub drift_max: f32,
    /// Velocity multiplier per 60 Hz frame
    pub ship_factor: f32,
    pub ship_floor: f32,
    pub projectile_factor: f32,
    pub projectile_floor: f32,
    /// Cloud radius lost per second while overlapping a black hole
    pub cloud_shrink_rate: f32,
}

impl Default for NebulaTuning {
    fn default() -> Self {
        Self {
            clouds_min: 3,
            clouds_max: 6,
            cloud_radius_min: 60.0,
            cloud_radius_max: 120.0,
            spread: 90.0,
            drift_min: 10.0,
            drift_max: 25.0,
            ship_factor: 0.97,
            ship_floor: 60.0,
            projectile_factor: 0.95,
            projectile_floor: 150.0,
            cloud_shrink_rate: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteorTuning {
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub max_speed: f32,
    pub reflectivity: f32,
}

impl Default for MeteorTuning {
    fn default() -> Self {
        Self {
            radius_min: 14.0,
            radius_max: 36.0,
            speed_min: 40.0,
            speed_max: 120.0,
            max_speed: 260.0,
            reflectivity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Share of the overlap each ship is pushed back in a ship/ship contact
    pub ship_ship_push: f32,
    /// Share of the overlap the ship takes in a ship/meteor contact
    pub ship_meteor_push: f32,
    /// Fraction of the bounce impulse a meteor absorbs
    pub meteor_recoil: f32,
    /// Extra separation added when pushing bodies apart (px)
    pub separation_slop: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            ship_ship_push: 0.5,
            ship_meteor_push: 0.8,
            meteor_recoil: 0.5,
            separation_slop: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub radius: f32,
    pub lifetime: f32,
    /// Final seconds of the lifetime during which the pickup fades out
    pub fade_time: f32,
    pub heal_amount: f32,
    pub rapid_fire_multiplier: f32,
    pub rapid_fire_duration: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            radius: 16.0,
            lifetime: 10.0,
            fade_time: 2.0,
            heal_amount: 25.0,
            rapid_fire_multiplier: 2.0,
            rapid_fire_duration: 8.0,
            bob_amplitude: 4.0,
            bob_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    /// Seconds from absorption contact to removal
    pub shrink_duration: f32,
    /// Speed (px/s) at which a shrinking body is dragged into its black hole
    pub shrink_pull: f32,
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            shrink_duration: 1.0,
            shrink_pull: 60.0,
        }
    }
}

/// Spawn caps and cadence, supplied by the external difficulty layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnLimits {
    pub max_enemies: usize,
    pub enemy_interval: f32,
    pub enemy_kinds: Vec<EnemyKind>,
    pub max_meteors: usize,
    pub meteor_interval: f32,
    pub max_planets: usize,
    pub planet_interval: f32,
    pub max_black_holes: usize,
    pub black_hole_interval: f32,
    pub max_nebulae: usize,
    pub nebula_interval: f32,
}

impl Default for SpawnLimits {
    fn default() -> Self {
        Self {
            max_enemies: 6,
            enemy_interval: 2.5,
            enemy_kinds: EnemyKind::ALL.to_vec(),
            max_meteors: 4,
            meteor_interval: 4.0,
            max_planets: 1,
            planet_interval: 20.0,
            max_black_holes: 1,
            black_hole_interval: 30.0,
            max_nebulae: 1,
            nebula_interval: 25.0,
        }
    }
}

impl SpawnLimits {
    /// Limits that never spawn anything (scripted scenarios, tests)
    pub fn none() -> Self {
        Self {
            max_enemies: 0,
            enemy_kinds: Vec::new(),
            max_meteors: 0,
            max_planets: 0,
            max_black_holes: 0,
            max_nebulae: 0,
            ..Self::default()
        }
    }
}

/// The complete static parameter table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: PlayfieldTuning,
    pub player: PlayerTuning,
    pub enemies: EnemyTable,
    pub bullet: BulletTuning,
    pub missile: MissileTuning,
    pub laser: LaserTuning,
    pub railgun: RailgunTuning,
    pub gravity: GravityTuning,
    pub planets: PlanetTuning,
    pub black_holes: BlackHoleTuning,
    pub nebula: NebulaTuning,
    pub meteors: MeteorTuning,
    pub collision: CollisionTuning,
    pub pickups: PickupTuning,
    pub lifecycle: LifecycleTuning,
    pub spawn: SpawnLimits,
}

/// Problems found while loading or validating a tuning table
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    Parse(String),
    NonPositive { field: &'static str, value: f32 },
    InvertedRange { field: &'static str, min: f32, max: f32 },
    FractionOutOfRange { field: &'static str, value: f32 },
    UnsupportedEnemyWeapon { kind: EnemyKind, weapon: WeaponKind },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "tuning parse error: {msg}"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::InvertedRange { field, min, max } => {
                write!(f, "{field}: min {min} exceeds max {max}")
            }
            Self::FractionOutOfRange { field, value } => {
                write!(f, "{field} must lie in [0, 1], got {value}")
            }
            Self::UnsupportedEnemyWeapon { kind, weapon } => {
                write!(f, "enemy archetype {kind:?} cannot carry {weapon:?}")
            }
        }
    }
}

impl std::error::Error for TuningError {}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), TuningError> {
    if min <= max {
        Ok(())
    } else {
        Err(TuningError::InvertedRange { field, min, max })
    }
}

fn fraction(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::FractionOutOfRange { field, value })
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning table (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("playfield.width", self.playfield.width)?;
        positive("playfield.height", self.playfield.height)?;
        fraction("playfield.aim_region", self.playfield.aim_region)?;

        positive("player.max_health", self.player.max_health)?;
        positive("player.radius", self.player.radius)?;
        positive("player.max_speed", self.player.max_speed)?;

        for kind in EnemyKind::ALL {
            let row = self.enemies.get(kind);
            positive("enemy.max_health", row.max_health)?;
            positive("enemy.radius", row.radius)?;
            positive("enemy.max_speed", row.max_speed)?;
            ordered("enemy.cooldown", row.cooldown_min, row.cooldown_max)?;
            fraction("enemy.rapid_fire_drop_chance", row.rapid_fire_drop_chance)?;
            if row.weapon == WeaponKind::Laser {
                return Err(TuningError::UnsupportedEnemyWeapon {
                    kind,
                    weapon: row.weapon,
                });
            }
            if let MovementPolicy::DistanceBased {
                stop_distance,
                start_distance,
                ..
            } = row.movement
            {
                ordered("enemy.movement.distance", stop_distance, start_distance)?;
            }
            if let MovementPolicy::Periodic { turn_interval, .. } = row.movement {
                positive("enemy.movement.turn_interval", turn_interval)?;
            }
        }

        positive("bullet.max_speed", self.bullet.max_speed)?;
        positive("missile.max_speed", self.missile.max_speed)?;
        ordered(
            "missile.half_angle",
            self.missile.front_half_angle,
            self.missile.max_half_angle,
        )?;
        positive("missile.max_half_angle", self.missile.max_half_angle)?;
        ordered("missile.range", self.missile.side_range, self.missile.front_range)?;

        positive("laser.step", self.laser.step)?;
        positive("railgun.max_speed", self.railgun.max_speed)?;
        positive("railgun.max_damage", self.railgun.max_damage)?;

        fraction("gravity.planet.floor", self.gravity.planet.floor)?;
        fraction("gravity.black_hole.floor", self.gravity.black_hole.floor)?;
        ordered(
            "gravity.planet",
            self.gravity.planet.floor,
            self.gravity.planet.ceiling,
        )?;
        ordered(
            "gravity.black_hole",
            self.gravity.black_hole.floor,
            self.gravity.black_hole.ceiling,
        )?;

        ordered("planets.radius", self.planets.radius_min, self.planets.radius_max)?;
        ordered(
            "planets.strength",
            self.planets.strength_min,
            self.planets.strength_max,
        )?;
        ordered("planets.drift", self.planets.drift_min, self.planets.drift_max)?;
        ordered(
            "black_holes.drift",
            self.black_holes.drift_min,
            self.black_holes.drift_max,
        )?;
        ordered("nebula.clouds", self.nebula.clouds_min as f32, self.nebula.clouds_max as f32)?;
        ordered(
            "nebula.cloud_radius",
            self.nebula.cloud_radius_min,
            self.nebula.cloud_radius_max,
        )?;
        ordered("nebula.drift", self.nebula.drift_min, self.nebula.drift_max)?;
        fraction("nebula.ship_factor", self.nebula.ship_factor)?;
        fraction("nebula.projectile_factor", self.nebula.projectile_factor)?;
        ordered("meteors.radius", self.meteors.radius_min, self.meteors.radius_max)?;
        ordered("meteors.speed", self.meteors.speed_min, self.meteors.speed_max)?;

        fraction("collision.ship_ship_push", self.collision.ship_ship_push)?;
        fraction("collision.ship_meteor_push", self.collision.ship_meteor_push)?;
        fraction("collision.meteor_recoil", self.collision.meteor_recoil)?;

        positive("pickups.lifetime", self.pickups.lifetime)?;
        positive("lifecycle.shrink_duration", self.lifecycle.shrink_duration)?;

        if self.spawn.max_enemies > 0 && self.spawn.enemy_kinds.is_empty() {
            log::warn!("spawn.max_enemies > 0 but no enemy kinds are allowed");
        }
        Ok(())
    }
}
