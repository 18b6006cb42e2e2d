//! The host actor contract the hostile population controller is written against.
use std::fmt;

use bevy::prelude::Vec3;

use super::metadata::{ActorMetadata, MetaValue};

/// Stable identifier for an actor, preserved in persisted metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(u64);

impl ActorId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ACT-{:04}", self.0)
    }
}

/// Tunable actor attributes the host exposes setters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    MaxHealth,
    AttackDamage,
    MovementSpeed,
    KnockbackResistance,
    FollowRange,
    Scale,
}

impl Attribute {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn label(self) -> &'static str {
        match self {
            Self::MaxHealth => "max health",
            Self::AttackDamage => "attack damage",
            Self::MovementSpeed => "movement speed",
            Self::KnockbackResistance => "knockback resistance",
            Self::FollowRange => "follow range",
            Self::Scale => "scale",
        }
    }
}

/// Boolean presentation flags an actor can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorFlag {
    Glowing,
    Invisible,
    Silent,
}

/// Orientation of an actor in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
    pub head_yaw: f32,
}

impl Facing {
    pub fn new(yaw: f32, pitch: f32, head_yaw: f32) -> Self {
        Self {
            yaw,
            pitch,
            head_yaw,
        }
    }

    /// Facing that looks from `from` toward `to`.
    pub fn looking_at(from: Vec3, to: Vec3) -> Self {
        let delta = to - from;
        let yaw = delta.z.atan2(delta.x).to_degrees() - 90.0;
        let horizontal = (delta.x * delta.x + delta.z * delta.z).sqrt();
        let pitch = -delta.y.atan2(horizontal).to_degrees();
        Self::new(yaw, pitch, yaw)
    }
}

/// An observer (player) found by a proximity scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverSighting {
    pub observer: ActorId,
    pub position: Vec3,
    pub distance: f32,
}

/// Operations the hosting world provides to the hostile population controller.
///
/// Every call runs on the simulation thread. Lookups on unknown actors return
/// `None`/`false` instead of panicking.
pub trait ActorHost {
    /// Current world time in simulation ticks.
    fn current_tick(&self) -> u64;

    /// True when at least one observer (player) is present in the world.
    fn observers_present(&mut self) -> bool;

    /// Creates an actor of `type_id` at `position` without inserting it into the world.
    fn create(&mut self, type_id: &str, position: Vec3) -> Option<ActorId>;

    /// Inserts a created actor into the world.
    fn spawn(&mut self, actor: ActorId) -> bool;

    /// Removes an actor immediately, whether created, spawned, or dead.
    fn discard(&mut self, actor: ActorId);

    /// Drops the actor's health to zero so the host's death handling takes over.
    fn kill(&mut self, actor: ActorId);

    /// True for spawned actors that have not died.
    fn is_alive(&self, actor: ActorId) -> bool;

    /// Whether the actor's type is able to carry autonomous behavior.
    fn supports_behavior(&self, actor: ActorId) -> bool;

    /// Attaches hostile autonomous behavior. Returns false when the actor cannot carry it.
    fn attach_autonomous_behavior(&mut self, actor: ActorId, detection_range: f32) -> bool;

    fn set_attribute(&mut self, actor: ActorId, attribute: Attribute, value: f32) -> bool;

    fn health(&self, actor: ActorId) -> Option<f32>;

    fn set_health(&mut self, actor: ActorId, value: f32);

    fn set_nameplate(&mut self, actor: ActorId, text: &str, visible: bool);

    fn set_flag(&mut self, actor: ActorId, flag: ActorFlag, enabled: bool);

    /// Makes `rider` ride `vehicle`.
    fn mount(&mut self, rider: ActorId, vehicle: ActorId) -> bool;

    fn facing(&self, actor: ActorId) -> Option<Facing>;

    fn set_facing(&mut self, actor: ActorId, facing: Facing);

    fn position(&self, actor: ActorId) -> Option<Vec3>;

    fn metadata(&self, actor: ActorId) -> Option<&ActorMetadata>;

    fn write_metadata(&mut self, actor: ActorId, key: &str, value: MetaValue) -> bool;

    /// Every spawned actor, alive or dead. Observers are not included.
    fn actors(&mut self) -> Vec<ActorId>;

    /// Spawned actors whose position lies inside the box `[min, max]`.
    fn actors_within(&mut self, min: Vec3, max: Vec3) -> Vec<ActorId>;

    /// Nearest observer within `range` of `origin`.
    fn nearest_observer(&mut self, origin: Vec3, range: f32) -> Option<ObserverSighting>;

    /// Applies damage to an actor or observer.
    fn damage(&mut self, target: ActorId, amount: f32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_looks_toward_target() {
        let facing = Facing::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert!(facing.yaw.abs() < 1e-4);
        assert!(facing.pitch.abs() < 1e-4);
        assert_eq!(facing.yaw, facing.head_yaw);

        let above = Facing::looking_at(Vec3::ZERO, Vec3::new(0.0, 5.0, 5.0));
        assert!((above.pitch + 45.0).abs() < 1e-3);
    }

    #[test]
    fn actor_id_display_is_padded() {
        assert_eq!(ActorId::new(7).to_string(), "ACT-0007");
        assert_eq!(ActorId::new(7).value(), 7);
    }
}
