//! Persisted metadata marking actors the controller owns.
use crate::host::{metadata::ActorMetadata, metadata::MetaValue, ActorHost, ActorId};

use super::definition::DefinitionId;

pub const KEY_DEFINITION: &str = "hordekeeper:definition";
pub const KEY_BASE_TYPE: &str = "hordekeeper:base_type";
pub const KEY_DRIVER: &str = "hordekeeper:driver";
pub const KEY_DISPLAY: &str = "hordekeeper:display";
pub const KEY_PARTNER: &str = "hordekeeper:partner";

/// Managed-actor tag as read back from metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedTag {
    /// `None` when the stored id is malformed; such actors are orphans.
    pub definition: Option<DefinitionId>,
    pub base_type: String,
    pub is_driver: bool,
    pub is_display: bool,
    pub partner: Option<ActorId>,
}

impl ManagedTag {
    pub fn standard(definition: DefinitionId, base_type: &str) -> Self {
        Self {
            definition: Some(definition),
            base_type: base_type.to_string(),
            is_driver: false,
            is_display: false,
            partner: None,
        }
    }

    /// Reads the tag; actors without a definition key are not managed.
    pub fn read(metadata: &ActorMetadata) -> Option<Self> {
        if !metadata.contains(KEY_DEFINITION) {
            return None;
        }
        let definition = metadata
            .int(KEY_DEFINITION)
            .and_then(|raw| u32::try_from(raw).ok())
            .map(DefinitionId::new);
        Some(Self {
            definition,
            base_type: metadata.text(KEY_BASE_TYPE).unwrap_or_default().to_string(),
            is_driver: metadata.flag(KEY_DRIVER),
            is_display: metadata.flag(KEY_DISPLAY),
            partner: metadata.actor(KEY_PARTNER),
        })
    }

    pub fn of(host: &impl ActorHost, actor: ActorId) -> Option<Self> {
        host.metadata(actor).and_then(Self::read)
    }

    /// Writes every key; returns `false` if the actor has no metadata store.
    pub fn write(&self, host: &mut impl ActorHost, actor: ActorId) -> bool {
        let definition = self
            .definition
            .map(|id| i64::from(id.value()))
            .unwrap_or(-1);
        let mut written = host.write_metadata(actor, KEY_DEFINITION, MetaValue::Int(definition))
            && host.write_metadata(actor, KEY_BASE_TYPE, MetaValue::Text(self.base_type.clone()))
            && host.write_metadata(actor, KEY_DRIVER, MetaValue::Flag(self.is_driver))
            && host.write_metadata(actor, KEY_DISPLAY, MetaValue::Flag(self.is_display));
        if let Some(partner) = self.partner {
            written = written && host.write_metadata(actor, KEY_PARTNER, MetaValue::Actor(partner));
        }
        written
    }
}

/// Records `partner` on an already tagged actor.
pub fn link_partner(host: &mut impl ActorHost, actor: ActorId, partner: ActorId) -> bool {
    host.write_metadata(actor, KEY_PARTNER, MetaValue::Actor(partner))
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::host::EcsHost;

    #[test]
    fn tags_round_trip_through_metadata() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let actor = host.create("zombie", Vec3::ZERO).expect("zombie");
        let partner = host.create("villager", Vec3::ZERO).expect("villager");

        assert!(ManagedTag::of(&host, actor).is_none());

        let tag = ManagedTag {
            is_driver: true,
            ..ManagedTag::standard(DefinitionId::new(4), "minecraft:villager")
        };
        assert!(tag.write(&mut host, actor));
        assert!(link_partner(&mut host, actor, partner));

        let read = ManagedTag::of(&host, actor).expect("managed");
        assert_eq!(read.definition, Some(DefinitionId::new(4)));
        assert_eq!(read.base_type, "minecraft:villager");
        assert!(read.is_driver);
        assert!(!read.is_display);
        assert_eq!(read.partner, Some(partner));
    }

    #[test]
    fn malformed_ids_read_as_orphans() {
        let mut metadata = ActorMetadata::default();
        metadata.insert(KEY_DEFINITION, MetaValue::Int(-3));
        let tag = ManagedTag::read(&metadata).expect("still managed");
        assert!(tag.definition.is_none());

        metadata.insert(KEY_DEFINITION, MetaValue::Text("seven".into()));
        assert!(ManagedTag::read(&metadata).expect("managed").definition.is_none());
    }
}
