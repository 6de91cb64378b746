//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one `Pcg32` stream owned by the `World`)
//! - Stable iteration order (collection order, ids allocated monotonically)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod fields;
pub mod laser;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod steering;
pub mod tick;
pub mod weapons;

use rand::Rng;

pub use collision::{Contact, circle_contact, elastic_bounce, planet_bounce};
pub use entity::{Body, EntityId, Faction, Ship, Shrink};
pub use snapshot::{BeamView, EntityKind, EntityView, Snapshot};
pub use state::{
    BlackHole, Bullet, Enemy, GameEvent, GamePhase, LaserBeam, Meteor, Missile, Nebula,
    NebulaCloud, Pickup, PickupKind, Planet, Player, RailgunRound, ShipSlot, World,
};
pub use tick::{FireInput, FrameClock, FrameInput, tick};

/// Uniform sample from `[min, max)`, or `min` when the band is empty
pub fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
