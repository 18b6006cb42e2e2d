//! Turns a definition into live actors: one standard actor or a hybrid pair.
use bevy::prelude::*;

use crate::host::{ActorFlag, ActorHost, ActorId, Attribute};

use super::{
    assailant::ScriptedAssailants,
    config::{AssailantSettings, HybridSettings},
    definition::{Definition, Stats},
    hybrid::HybridPairs,
    tags::ManagedTag,
};

/// Whether a base type can carry hostile behavior on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Capable,
    Incapable,
}

/// Classifies `type_id` with a throwaway probe. `None` for unknown types.
pub fn classify(host: &mut impl ActorHost, type_id: &str) -> Option<Capability> {
    let probe = host.create(type_id, Vec3::ZERO)?;
    let capable = host.supports_behavior(probe);
    host.discard(probe);
    Some(if capable {
        Capability::Capable
    } else {
        Capability::Incapable
    })
}

/// Writes core stats (everything except glow) onto an actor.
pub fn apply_stats(host: &mut impl ActorHost, actor: ActorId, stats: &Stats) {
    host.set_attribute(actor, Attribute::MaxHealth, stats.health);
    host.set_health(actor, stats.health);
    host.set_attribute(actor, Attribute::AttackDamage, stats.attack_damage);
    host.set_attribute(actor, Attribute::MovementSpeed, stats.speed);
    host.set_attribute(actor, Attribute::KnockbackResistance, stats.knockback_resistance);
    host.set_attribute(actor, Attribute::FollowRange, stats.detection_range);
}

/// Tracks every actor created in one attempt so a failure can remove them all.
struct Attempt {
    created: Vec<ActorId>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            created: Vec::new(),
        }
    }

    fn create(&mut self, host: &mut impl ActorHost, type_id: &str, position: Vec3) -> Option<ActorId> {
        let actor = host.create(type_id, position)?;
        self.created.push(actor);
        Some(actor)
    }

    fn unwind(self, host: &mut impl ActorHost) {
        for actor in self.created {
            host.discard(actor);
        }
    }
}

pub struct SpawnStrategy {
    hybrid: HybridSettings,
    pairs: HybridPairs,
    assailants: ScriptedAssailants,
}

impl SpawnStrategy {
    pub fn new(hybrid: HybridSettings, assailant: AssailantSettings) -> Self {
        Self {
            hybrid,
            pairs: HybridPairs::default(),
            assailants: ScriptedAssailants::new(assailant),
        }
    }

    pub fn pairs(&self) -> &HybridPairs {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut HybridPairs {
        &mut self.pairs
    }

    pub fn assailants(&self) -> &ScriptedAssailants {
        &self.assailants
    }

    pub fn assailants_mut(&mut self) -> &mut ScriptedAssailants {
        &mut self.assailants
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.assailants.clear();
    }

    /// Creates and spawns one instance of `definition` at `position`.
    ///
    /// Returns the canonical actor to register (the driver for hybrids). On any
    /// failure every actor created by this attempt is discarded.
    pub fn materialize(
        &mut self,
        host: &mut impl ActorHost,
        definition: &Definition,
        position: Vec3,
    ) -> Option<ActorId> {
        let Some(capability) = classify(host, &definition.base_actor_type) else {
            warn!(
                "Definition {} uses unknown actor type '{}'",
                definition.id, definition.base_actor_type
            );
            return None;
        };

        let mut attempt = Attempt::new();
        let result = match capability {
            Capability::Capable => self.materialize_standard(host, &mut attempt, definition, position),
            Capability::Incapable => self.materialize_hybrid(host, &mut attempt, definition, position),
        };

        match result {
            Some(actor) => Some(actor),
            None => {
                for actor in &attempt.created {
                    self.pairs.unlink(*actor);
                    self.assailants.dismiss(*actor);
                }
                attempt.unwind(host);
                None
            }
        }
    }

    fn materialize_standard(
        &mut self,
        host: &mut impl ActorHost,
        attempt: &mut Attempt,
        definition: &Definition,
        position: Vec3,
    ) -> Option<ActorId> {
        let actor = attempt.create(host, &definition.base_actor_type, position)?;
        if !ManagedTag::standard(definition.id, &definition.base_actor_type).write(host, actor) {
            return None;
        }
        host.set_nameplate(actor, definition.display_name(), true);
        apply_stats(host, actor, &definition.stats);
        host.set_flag(actor, ActorFlag::Glowing, definition.stats.glowing);

        if !host.spawn(actor) {
            warn!("Host refused to insert {} for {}", actor, definition.id);
            return None;
        }
        self.arm(host, actor, &definition.stats);
        Some(actor)
    }

    fn materialize_hybrid(
        &mut self,
        host: &mut impl ActorHost,
        attempt: &mut Attempt,
        definition: &Definition,
        position: Vec3,
    ) -> Option<ActorId> {
        if !self.hybrid.enabled {
            warn!(
                "Definition {} needs a hybrid actor for '{}' but hybrid spawning is disabled",
                definition.id, definition.base_actor_type
            );
            return None;
        }

        let driver = attempt.create(host, &self.hybrid.chassis, position)?;
        let display = attempt.create(host, &definition.base_actor_type, position)?;
        let stats = &definition.stats;
        let base = ManagedTag::standard(definition.id, &definition.base_actor_type);

        host.set_flag(driver, ActorFlag::Invisible, true);
        host.set_flag(driver, ActorFlag::Silent, true);
        host.set_attribute(driver, Attribute::Scale, self.hybrid.driver_scale);
        host.set_nameplate(driver, definition.display_name(), false);
        apply_stats(host, driver, stats);

        host.set_nameplate(display, definition.display_name(), true);
        host.set_attribute(display, Attribute::MaxHealth, stats.health);
        host.set_health(display, stats.health);
        host.set_flag(display, ActorFlag::Glowing, stats.glowing);

        let tagged = ManagedTag {
            is_driver: true,
            partner: Some(display),
            ..base.clone()
        }
        .write(host, driver)
            && ManagedTag {
                is_display: true,
                partner: Some(driver),
                ..base
            }
            .write(host, display);
        if !tagged {
            return None;
        }

        if !host.spawn(display) || !host.spawn(driver) {
            warn!("Host refused to insert hybrid pair for {}", definition.id);
            return None;
        }
        if !host.mount(driver, display) {
            let display_id = display;
            warn!("Failed to mount hybrid driver {} on {}", driver, display_id);
            return None;
        }

        self.arm(host, driver, stats);
        self.pairs.link(driver, display);
        Some(driver)
    }

    fn arm(&mut self, host: &mut impl ActorHost, actor: ActorId, stats: &Stats) {
        if !host.attach_autonomous_behavior(actor, stats.detection_range) {
            self.assailants
                .enlist(actor, stats.detection_range, stats.attack_damage);
        }
    }

    /// Re-applies current stats to a live instance and its display half.
    pub fn restat(&mut self, host: &mut impl ActorHost, actor: ActorId, stats: &Stats) {
        apply_stats(host, actor, stats);
        match self.pairs.display_of(actor) {
            Some(display) => {
                host.set_attribute(display, Attribute::MaxHealth, stats.health);
                host.set_health(display, stats.health);
                host.set_flag(display, ActorFlag::Glowing, stats.glowing);
            }
            None => host.set_flag(actor, ActorFlag::Glowing, stats.glowing),
        }
        self.assailants
            .retune(actor, stats.detection_range, stats.attack_damage);
    }

    /// Force-destroys an instance together with its hybrid partner.
    pub fn discard_instance(&mut self, host: &mut impl ActorHost, actor: ActorId) {
        let partner = self
            .pairs
            .unlink(actor)
            .or_else(|| ManagedTag::of(&*host, actor).and_then(|tag| tag.partner));
        self.assailants.dismiss(actor);
        host.discard(actor);
        if let Some(partner) = partner {
            self.assailants.dismiss(partner);
            host.discard(partner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{
            components::{Glowing, HostileBehavior, Invisible, Nameplate, Rider},
            EcsHost,
        },
        hostile::{
            config::HostileSettings,
            definition::DefinitionId,
            region::SpawnRegion,
        },
    };

    fn strategy(hybrid_enabled: bool) -> SpawnStrategy {
        let settings = HostileSettings::default();
        SpawnStrategy::new(
            HybridSettings {
                enabled: hybrid_enabled,
                ..settings.hybrid
            },
            settings.assailant,
        )
    }

    fn definition(base: &str) -> Definition {
        let mut definition = Definition::new(
            DefinitionId::new(9),
            "Warden",
            base,
            SpawnRegion::from_corners(Vec3::ZERO, Vec3::splat(4.0)),
        );
        definition.stats = Stats {
            health: 30.0,
            glowing: true,
            ..Stats::default()
        };
        definition
    }

    fn entity(host: &EcsHost<'_>, actor: ActorId) -> Entity {
        host.world()
            .resource::<crate::host::components::ActorDirectory>()
            .entity(actor)
            .expect("bound actor")
    }

    #[test]
    fn classification_uses_a_discarded_probe() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        assert_eq!(classify(&mut host, "zombie"), Some(Capability::Capable));
        assert_eq!(classify(&mut host, "armor_stand"), Some(Capability::Incapable));
        assert_eq!(classify(&mut host, "pig"), Some(Capability::Incapable));
        assert_eq!(classify(&mut host, "dragon"), None);
        assert!(host
            .world()
            .resource::<crate::host::components::ActorDirectory>()
            .is_empty());
    }

    #[test]
    fn standard_instances_are_tagged_and_armed() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let mut strategy = strategy(false);

        let actor = strategy
            .materialize(&mut host, &definition("zombie"), Vec3::ONE)
            .expect("standard spawn");
        let tag = ManagedTag::of(&host, actor).expect("tagged");
        assert_eq!(tag.definition, Some(DefinitionId::new(9)));
        assert!(!tag.is_driver && !tag.is_display);
        assert!(host.is_alive(actor));
        assert_eq!(host.health(actor), Some(30.0));

        let entity = entity(&host, actor);
        assert!(host.world().get::<HostileBehavior>(entity).is_some());
        assert!(host.world().get::<Glowing>(entity).is_some());
        assert_eq!(
            host.world().get::<Nameplate>(entity).map(|plate| plate.text.clone()),
            Some("Warden".to_string())
        );
        assert!(strategy.assailants().is_empty());
    }

    #[test]
    fn behaviorless_capable_types_fall_back_to_scripted_assailants() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let mut strategy = strategy(false);

        let actor = strategy
            .materialize(&mut host, &definition("shulker"), Vec3::ONE)
            .expect("standard spawn");
        assert!(strategy.assailants().contains(actor));
    }

    #[test]
    fn hybrid_gate_fails_closed() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let mut strategy = strategy(false);

        assert!(strategy
            .materialize(&mut host, &definition("villager"), Vec3::ONE)
            .is_none());
        assert!(host.actors().is_empty());
        assert!(host
            .world()
            .resource::<crate::host::components::ActorDirectory>()
            .is_empty());
    }

    #[test]
    fn hybrid_instances_pair_driver_and_display() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let mut strategy = strategy(true);

        let driver = strategy
            .materialize(&mut host, &definition("villager"), Vec3::new(2.0, 0.0, 2.0))
            .expect("hybrid spawn");
        let display = strategy.pairs().display_of(driver).expect("paired");

        let driver_tag = ManagedTag::of(&host, driver).expect("driver tag");
        let display_tag = ManagedTag::of(&host, display).expect("display tag");
        assert!(driver_tag.is_driver);
        assert_eq!(driver_tag.partner, Some(display));
        assert!(display_tag.is_display);
        assert_eq!(display_tag.partner, Some(driver));
        assert_eq!(host.health(display), Some(30.0));

        let driver_entity = entity(&host, driver);
        let display_entity = entity(&host, display);
        assert!(host.world().get::<Invisible>(driver_entity).is_some());
        assert!(host.world().get::<Glowing>(display_entity).is_some());
        assert!(host.world().get::<Glowing>(driver_entity).is_none());
        assert_eq!(
            host.world().get::<Rider>(driver_entity).map(|rider| rider.vehicle),
            Some(display_entity)
        );

        strategy.discard_instance(&mut host, driver);
        assert!(host.actors().is_empty());
        assert!(strategy.pairs().is_empty());
    }

    #[test]
    fn unknown_chassis_leaves_nothing_behind() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let settings = HostileSettings::default();
        let mut strategy = SpawnStrategy::new(
            HybridSettings {
                enabled: true,
                chassis: "dragon".to_string(),
                driver_scale: 0.0625,
            },
            settings.assailant,
        );

        assert!(strategy
            .materialize(&mut host, &definition("villager"), Vec3::ONE)
            .is_none());
        assert!(strategy
            .materialize(&mut host, &definition("dragon"), Vec3::ONE)
            .is_none());
        assert!(host
            .world()
            .resource::<crate::host::components::ActorDirectory>()
            .is_empty());
        assert!(strategy.pairs().is_empty());
    }
}
