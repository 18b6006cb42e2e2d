//! Components backing actors and observers in the host world.
use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

use super::{
    api::{ActorId, Attribute, Facing},
    catalog::ActorCategory,
};

/// Links an entity to its stable actor id.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorUid(pub ActorId);

/// The catalog type an actor was created from.
#[derive(Component, Debug, Clone)]
pub struct ActorKind {
    pub type_id: String,
    pub category: ActorCategory,
    pub behavior_slots: bool,
}

/// Created but not yet inserted into the world.
#[derive(Component, Debug, Default)]
pub struct Pending;

/// Death has been observed and announced; the corpse is removed after the tick.
#[derive(Component, Debug, Default)]
pub struct Dead;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Vitality {
    pub current: f32,
    pub max: f32,
}

impl Vitality {
    pub fn full(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct Attributes {
    values: BTreeMap<Attribute, f32>,
}

impl Attributes {
    pub fn set(&mut self, attribute: Attribute, value: f32) {
        self.values.insert(attribute, value);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get(&self, attribute: Attribute) -> Option<f32> {
        self.values.get(&attribute).copied()
    }
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Orientation(pub Facing);

#[derive(Component, Debug, Clone, Default)]
pub struct Nameplate {
    pub text: String,
    pub visible: bool,
}

#[derive(Component, Debug, Default)]
pub struct Glowing;

#[derive(Component, Debug, Default)]
pub struct Invisible;

#[derive(Component, Debug, Default)]
pub struct Silent;

/// Hostile autonomous behavior supplied by the host.
#[derive(Component, Debug, Clone, Copy)]
pub struct HostileBehavior {
    pub detection_range: f32,
}

/// Rides on top of another actor and follows its position.
#[derive(Component, Debug, Clone, Copy)]
pub struct Rider {
    pub vehicle: Entity,
}

/// A player; the presence of any observer enables hostile population upkeep.
#[derive(Component, Debug, Default)]
pub struct Observer;

/// Maps stable actor ids to live entities and issues new ids.
#[derive(Resource, Debug, Default)]
pub struct ActorDirectory {
    next: u64,
    entities: HashMap<ActorId, Entity>,
}

impl ActorDirectory {
    pub fn issue(&mut self) -> ActorId {
        let id = ActorId::new(self.next);
        self.next += 1;
        id
    }

    pub fn bind(&mut self, actor: ActorId, entity: Entity) {
        if actor.value() >= self.next {
            self.next = actor.value() + 1;
        }
        self.entities.insert(actor, entity);
    }

    pub fn unbind(&mut self, actor: ActorId) -> Option<Entity> {
        self.entities.remove(&actor)
    }

    pub fn entity(&self, actor: ActorId) -> Option<Entity> {
        self.entities.get(&actor).copied()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_issues_past_rebound_ids() {
        let mut directory = ActorDirectory::default();
        let first = directory.issue();
        assert_eq!(first, ActorId::new(0));

        directory.bind(ActorId::new(41), Entity::PLACEHOLDER);
        assert_eq!(directory.issue(), ActorId::new(42));
        assert_eq!(directory.entity(ActorId::new(41)), Some(Entity::PLACEHOLDER));
        assert_eq!(directory.unbind(ActorId::new(41)), Some(Entity::PLACEHOLDER));
        assert!(directory.is_empty());
    }

    #[test]
    fn vitality_clamps_negative_maximum() {
        let vitality = Vitality::full(-3.0);
        assert_eq!(vitality.max, 0.0);
        assert!(vitality.is_depleted());
        assert!(!Vitality::full(20.0).is_depleted());
    }
}
