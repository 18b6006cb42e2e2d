//! Messages the host world broadcasts to simulation plugins.
use bevy::prelude::{Entity, Message, Vec3};

use super::api::ActorId;

/// Fired once when an actor's health is first observed at zero.
#[derive(Message, Debug, Clone)]
pub struct ActorDied {
    pub actor: ActorId,
    pub entity: Entity,
}

/// Fired when a region around an observer becomes active, and again on every rescan.
#[derive(Message, Debug, Clone, Copy)]
pub struct RegionActivated {
    pub min: Vec3,
    pub max: Vec3,
}
