//! `ActorHost` implementation over a bevy `World`.
use bevy::prelude::*;

use crate::core::SimulationTick;

use super::{
    api::{ActorFlag, ActorHost, ActorId, Attribute, Facing, ObserverSighting},
    catalog::ActorTypeCatalog,
    components::{
        ActorDirectory, ActorKind, ActorUid, Attributes, Dead, Glowing, HostileBehavior,
        Invisible, Nameplate, Observer, Orientation, Pending, Rider, Silent, Vitality,
    },
    metadata::{ActorMetadata, MetaValue},
};

/// Borrows the world for the duration of one hostile tick.
pub struct EcsHost<'w> {
    world: &'w mut World,
}

impl<'w> EcsHost<'w> {
    pub fn new(world: &'w mut World) -> Self {
        if !world.contains_resource::<ActorDirectory>() {
            world.insert_resource(ActorDirectory::default());
        }
        if !world.contains_resource::<ActorTypeCatalog>() {
            world.insert_resource(ActorTypeCatalog::default());
        }
        Self { world }
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Adds an observer (player) to the world.
    pub fn enroll_observer(&mut self, position: Vec3, health: f32) -> ActorId {
        let actor = self.world.resource_mut::<ActorDirectory>().issue();
        let entity = self
            .world
            .spawn((
                ActorUid(actor),
                Observer,
                Transform::from_translation(position),
                Vitality::full(health),
            ))
            .id();
        self.world
            .resource_mut::<ActorDirectory>()
            .bind(actor, entity);
        actor
    }

    fn entity(&self, actor: ActorId) -> Option<Entity> {
        let entity = self.world.resource::<ActorDirectory>().entity(actor)?;
        self.world.get_entity(entity).is_ok().then_some(entity)
    }

    fn spawned(&self, actor: ActorId) -> Option<Entity> {
        let entity = self.entity(actor)?;
        self.world
            .get::<Pending>(entity)
            .is_none()
            .then_some(entity)
    }

    fn toggle<C: Component + Default>(&mut self, entity: Entity, enabled: bool) {
        if let Ok(mut entity) = self.world.get_entity_mut(entity) {
            if enabled {
                entity.insert(C::default());
            } else {
                entity.remove::<C>();
            }
        }
    }
}

impl ActorHost for EcsHost<'_> {
    fn current_tick(&self) -> u64 {
        self.world
            .get_resource::<SimulationTick>()
            .map(|tick| tick.current())
            .unwrap_or(0)
    }

    fn observers_present(&mut self) -> bool {
        let mut query = self.world.query_filtered::<Entity, With<Observer>>();
        query.iter(self.world).next().is_some()
    }

    fn create(&mut self, type_id: &str, position: Vec3) -> Option<ActorId> {
        let spec = self
            .world
            .resource::<ActorTypeCatalog>()
            .get(type_id)?
            .clone();
        let actor = self.world.resource_mut::<ActorDirectory>().issue();
        let entity = self
            .world
            .spawn((
                ActorUid(actor),
                ActorKind {
                    type_id: spec.id,
                    category: spec.category,
                    behavior_slots: spec.behavior_slots,
                },
                Transform::from_translation(position),
                Vitality::full(spec.health),
                Attributes::default(),
                Orientation::default(),
                ActorMetadata::default(),
                Pending,
            ))
            .id();
        self.world
            .resource_mut::<ActorDirectory>()
            .bind(actor, entity);
        Some(actor)
    }

    fn spawn(&mut self, actor: ActorId) -> bool {
        let Some(entity) = self.entity(actor) else {
            return false;
        };
        match self.world.get_entity_mut(entity) {
            Ok(mut entity) if entity.contains::<Pending>() => {
                entity.remove::<Pending>();
                true
            }
            _ => false,
        }
    }

    fn discard(&mut self, actor: ActorId) {
        let Some(entity) = self
            .world
            .resource_mut::<ActorDirectory>()
            .unbind(actor)
        else {
            return;
        };
        if let Ok(entity) = self.world.get_entity_mut(entity) {
            entity.despawn();
        }
    }

    fn kill(&mut self, actor: ActorId) {
        if let Some(entity) = self.spawned(actor) {
            if let Some(mut vitality) = self.world.get_mut::<Vitality>(entity) {
                vitality.current = 0.0;
            }
        }
    }

    fn is_alive(&self, actor: ActorId) -> bool {
        let Some(entity) = self.spawned(actor) else {
            return false;
        };
        if self.world.get::<Dead>(entity).is_some() {
            return false;
        }
        self.world
            .get::<Vitality>(entity)
            .map(|vitality| !vitality.is_depleted())
            .unwrap_or(true)
    }

    fn supports_behavior(&self, actor: ActorId) -> bool {
        self.entity(actor)
            .and_then(|entity| self.world.get::<ActorKind>(entity))
            .map(|kind| kind.category.carries_behavior())
            .unwrap_or(false)
    }

    fn attach_autonomous_behavior(&mut self, actor: ActorId, detection_range: f32) -> bool {
        let Some(entity) = self.entity(actor) else {
            return false;
        };
        let slots = self
            .world
            .get::<ActorKind>(entity)
            .map(|kind| kind.behavior_slots)
            .unwrap_or(false);
        if !slots {
            return false;
        }
        match self.world.get_entity_mut(entity) {
            Ok(mut entity) => {
                entity.insert(HostileBehavior {
                    detection_range: detection_range.max(0.0),
                });
                true
            }
            Err(_) => false,
        }
    }

    fn set_attribute(&mut self, actor: ActorId, attribute: Attribute, value: f32) -> bool {
        let Some(entity) = self.entity(actor) else {
            return false;
        };
        match self.world.get_mut::<Attributes>(entity) {
            Some(mut attributes) => attributes.set(attribute, value),
            None => return false,
        }

        if attribute == Attribute::MaxHealth {
            if let Some(mut vitality) = self.world.get_mut::<Vitality>(entity) {
                vitality.max = value.max(0.0);
                vitality.current = vitality.current.min(vitality.max);
            }
        }
        true
    }

    fn health(&self, actor: ActorId) -> Option<f32> {
        let entity = self.entity(actor)?;
        self.world
            .get::<Vitality>(entity)
            .map(|vitality| vitality.current)
    }

    fn set_health(&mut self, actor: ActorId, value: f32) {
        if let Some(entity) = self.entity(actor) {
            if let Some(mut vitality) = self.world.get_mut::<Vitality>(entity) {
                vitality.current = value.clamp(0.0, vitality.max);
            }
        }
    }

    fn set_nameplate(&mut self, actor: ActorId, text: &str, visible: bool) {
        if let Some(entity) = self.entity(actor) {
            if let Ok(mut entity) = self.world.get_entity_mut(entity) {
                entity.insert(Nameplate {
                    text: text.to_string(),
                    visible,
                });
            }
        }
    }

    fn set_flag(&mut self, actor: ActorId, flag: ActorFlag, enabled: bool) {
        let Some(entity) = self.entity(actor) else {
            return;
        };
        match flag {
            ActorFlag::Glowing => self.toggle::<Glowing>(entity, enabled),
            ActorFlag::Invisible => self.toggle::<Invisible>(entity, enabled),
            ActorFlag::Silent => self.toggle::<Silent>(entity, enabled),
        }
    }

    fn mount(&mut self, rider: ActorId, vehicle: ActorId) -> bool {
        if rider == vehicle {
            return false;
        }
        let (Some(rider), Some(vehicle)) = (self.spawned(rider), self.spawned(vehicle)) else {
            return false;
        };
        let Some(anchor) = self
            .world
            .get::<Transform>(vehicle)
            .map(|transform| transform.translation)
        else {
            return false;
        };
        match self.world.get_entity_mut(rider) {
            Ok(mut rider) => {
                rider.insert(Rider { vehicle });
                if let Some(mut transform) = rider.get_mut::<Transform>() {
                    transform.translation = anchor;
                }
                true
            }
            Err(_) => false,
        }
    }

    fn facing(&self, actor: ActorId) -> Option<Facing> {
        let entity = self.entity(actor)?;
        self.world
            .get::<Orientation>(entity)
            .map(|orientation| orientation.0)
    }

    fn set_facing(&mut self, actor: ActorId, facing: Facing) {
        if let Some(entity) = self.entity(actor) {
            if let Some(mut orientation) = self.world.get_mut::<Orientation>(entity) {
                orientation.0 = facing;
            }
        }
    }

    fn position(&self, actor: ActorId) -> Option<Vec3> {
        let entity = self.entity(actor)?;
        self.world
            .get::<Transform>(entity)
            .map(|transform| transform.translation)
    }

    fn metadata(&self, actor: ActorId) -> Option<&ActorMetadata> {
        let entity = self.entity(actor)?;
        self.world.get::<ActorMetadata>(entity)
    }

    fn write_metadata(&mut self, actor: ActorId, key: &str, value: MetaValue) -> bool {
        let Some(entity) = self.entity(actor) else {
            return false;
        };
        match self.world.get_mut::<ActorMetadata>(entity) {
            Some(mut metadata) => {
                metadata.insert(key, value);
                true
            }
            None => false,
        }
    }

    fn actors(&mut self) -> Vec<ActorId> {
        let mut query = self
            .world
            .query_filtered::<&ActorUid, (Without<Pending>, Without<Observer>)>();
        query.iter(self.world).map(|uid| uid.0).collect()
    }

    fn actors_within(&mut self, min: Vec3, max: Vec3) -> Vec<ActorId> {
        let mut query = self
            .world
            .query_filtered::<(&ActorUid, &Transform), (Without<Pending>, Without<Observer>)>();
        query
            .iter(self.world)
            .filter(|(_, transform)| {
                let position = transform.translation;
                position.cmpge(min).all() && position.cmple(max).all()
            })
            .map(|(uid, _)| uid.0)
            .collect()
    }

    fn nearest_observer(&mut self, origin: Vec3, range: f32) -> Option<ObserverSighting> {
        let mut query = self
            .world
            .query_filtered::<(&ActorUid, &Transform, &Vitality), With<Observer>>();
        query
            .iter(self.world)
            .filter(|(_, _, vitality)| !vitality.is_depleted())
            .map(|(uid, transform, _)| ObserverSighting {
                observer: uid.0,
                position: transform.translation,
                distance: transform.translation.distance(origin),
            })
            .filter(|sighting| sighting.distance <= range)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn damage(&mut self, target: ActorId, amount: f32) -> bool {
        let Some(entity) = self.entity(target) else {
            return false;
        };
        match self.world.get_mut::<Vitality>(entity) {
            Some(mut vitality) => {
                vitality.current = (vitality.current - amount.max(0.0)).max(0.0);
                true
            }
            None => false,
        }
    }
}
