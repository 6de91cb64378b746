//! Entity base model
//!
//! Kinematic state shared by everything that moves, plus the hull state
//! shared by the player and enemy ships.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{cap_speed, heading_vec};

/// Stable identifier handed out by the world's id counter
pub type EntityId = u32;

/// Which side fired a projectile / owns a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opposing(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Kinematic state common to ships, projectiles and environmental bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position (px)
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    /// Facing in degrees, 0 = up
    pub angle: f32,
    /// Collision radius (px)
    pub radius: f32,
    pub max_speed: f32,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, max_speed: f32) -> Self {
        Self {
            pos,
            vel,
            angle: 0.0,
            radius,
            max_speed,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        heading_vec(self.angle)
    }

    /// Enforce the speed cap; run after every velocity change
    #[inline]
    pub fn cap_speed(&mut self) {
        self.vel = cap_speed(self.vel, self.max_speed);
    }

    /// Cap, then advance position by one timestep
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.cap_speed();
        self.pos += self.vel * dt;
    }

    /// Top-left corner of the body's square bounding box
    #[inline]
    pub fn corner(&self) -> Vec2 {
        self.pos - Vec2::splat(self.radius)
    }

    /// Edge length of the bounding box
    #[inline]
    pub fn size(&self) -> f32 {
        self.radius * 2.0
    }

    /// Whether the bounding box lies fully inside a `width` x `height` field
    pub fn fully_inside(&self, width: f32, height: f32) -> bool {
        let corner = self.corner();
        let size = self.size();
        (0.0..=width - size).contains(&corner.x) && (0.0..=height - size).contains(&corner.y)
    }

    /// Whether the center lies more than `margin` outside the field
    pub fn beyond(&self, width: f32, height: f32, margin: f32) -> bool {
        self.pos.x < -margin
            || self.pos.x > width + margin
            || self.pos.y < -margin
            || self.pos.y > height + margin
    }

    /// Mount point `offset` px ahead of the center along the facing
    #[inline]
    pub fn mount(&self, offset: f32) -> Vec2 {
        self.pos + self.facing() * offset
    }
}

/// Shrink-to-destroy animation state (black hole absorption)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shrink {
    progress: Option<f32>,
    /// Black hole that triggered the shrink (pull target)
    pub into: Option<Vec2>,
}

impl Shrink {
    /// Start shrinking. Returns false when already shrinking (no-op).
    pub fn start(&mut self, into: Vec2) -> bool {
        if self.progress.is_some() {
            return false;
        }
        self.progress = Some(0.0);
        self.into = Some(into);
        true
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.progress.is_some()
    }

    /// Progress in [0, 1]; 0 when not shrinking
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress.unwrap_or(0.0)
    }

    /// Advance by `dt`. Returns true once the shrink has completed.
    pub fn advance(&mut self, dt: f32, duration: f32) -> bool {
        match self.progress.as_mut() {
            Some(p) => {
                let step = if duration > 0.0 { dt / duration } else { 1.0 };
                *p = (*p + step).min(1.0);
                *p >= 1.0
            }
            None => false,
        }
    }
}

/// Hull and lifecycle state shared by the player and enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: EntityId,
    pub faction: Faction,
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    /// Seconds of damage flash remaining
    pub flash: f32,
    pub shrink: Shrink,
    /// Still flying in from the spawn edge
    pub entering: bool,
    /// Removed this frame; later passes must skip it
    pub destroyed: bool,
}

impl Ship {
    pub fn new(id: EntityId, faction: Faction, body: Body, max_health: f32) -> Self {
        Self {
            id,
            faction,
            body,
            health: max_health,
            max_health,
            flash: 0.0,
            shrink: Shrink::default(),
            entering: false,
            destroyed: false,
        }
    }

    /// Alive, not shrinking, not already removed
    #[inline]
    pub fn is_targetable(&self) -> bool {
        !self.destroyed && !self.shrink.is_active() && self.health > 0.0
    }

    /// Apply damage, clamped to [0, max]. Returns true if this hit was lethal.
    pub fn apply_damage(&mut self, amount: f32, flash_duration: f32) -> bool {
        if self.destroyed || self.health <= 0.0 {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        self.flash = flash_duration;
        self.health <= 0.0
    }

    /// Heal, capped at max health
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
    }

    #[inline]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship() -> Ship {
        Ship::new(
            1,
            Faction::Enemy,
            Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0, 300.0),
            50.0,
        )
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut s = ship();
        assert!(!s.apply_damage(20.0, 0.1));
        assert_eq!(s.health, 30.0);
        assert!(s.flash > 0.0);
        assert!(s.apply_damage(500.0, 0.1));
        assert_eq!(s.health, 0.0);
        // Already dead: no second kill
        assert!(!s.apply_damage(10.0, 0.1));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut s = ship();
        s.apply_damage(10.0, 0.0);
        s.heal(1000.0);
        assert_eq!(s.health, 50.0);
    }

    #[test]
    fn test_shrink_is_one_shot() {
        let mut shrink = Shrink::default();
        assert!(shrink.start(Vec2::ZERO));
        assert!(!shrink.start(Vec2::ONE));
        assert_eq!(shrink.into, Some(Vec2::ZERO));
        assert!(!shrink.advance(0.5, 1.0));
        assert!((shrink.progress() - 0.5).abs() < 1e-6);
        assert!(shrink.advance(0.6, 1.0));
        assert_eq!(shrink.progress(), 1.0);
    }

    #[test]
    fn test_fully_inside_uses_bounding_box() {
        let mut body = Body::new(Vec2::new(20.0, 50.0), Vec2::ZERO, 20.0, 100.0);
        assert!(body.fully_inside(200.0, 200.0));
        body.pos.x = 19.0;
        assert!(!body.fully_inside(200.0, 200.0));
        body.pos.x = 180.0;
        assert!(body.fully_inside(200.0, 200.0));
        body.pos.x = 181.0;
        assert!(!body.fully_inside(200.0, 200.0));
    }

    #[test]
    fn test_integrate_caps_before_moving() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(1000.0, 0.0), 5.0, 100.0);
        body.integrate(1.0);
        assert!((body.pos.x - 100.0).abs() < 1e-3);
        assert!((body.speed() - 100.0).abs() < 1e-3);
    }
}
