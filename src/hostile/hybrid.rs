//! Driver/display pairs that stand in for hostiles of behaviorless types.
use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::host::{ActorHost, ActorId};

use super::tags::ManagedTag;

/// Live hybrid pairs keyed by driver.
#[derive(Debug, Clone, Default)]
pub struct HybridPairs {
    pairs: BTreeMap<ActorId, ActorId>,
}

impl HybridPairs {
    pub fn link(&mut self, driver: ActorId, display: ActorId) {
        self.pairs.insert(driver, display);
    }

    /// Forgets the pair containing `actor` and returns the other half.
    pub fn unlink(&mut self, actor: ActorId) -> Option<ActorId> {
        if let Some(display) = self.pairs.remove(&actor) {
            return Some(display);
        }
        let driver = self
            .pairs
            .iter()
            .find_map(|(driver, display)| (*display == actor).then_some(*driver))?;
        self.pairs.remove(&driver);
        Some(driver)
    }

    pub fn partner_of(&self, actor: ActorId) -> Option<ActorId> {
        self.pairs.get(&actor).copied().or_else(|| {
            self.pairs
                .iter()
                .find_map(|(driver, display)| (*display == actor).then_some(*driver))
        })
    }

    pub fn display_of(&self, driver: ActorId) -> Option<ActorId> {
        self.pairs.get(&driver).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// One synchronisation pass. Returns the number of pairs that ended this tick.
    pub fn sync(&mut self, host: &mut impl ActorHost) -> usize {
        let mut ended = 0;
        self.pairs.retain(|driver, display| {
            let driver_alive = host.is_alive(*driver);
            let display_alive = host.is_alive(*display);
            if !driver_alive || !display_alive {
                if driver_alive {
                    host.kill(*driver);
                }
                if display_alive {
                    host.kill(*display);
                }
                let display_id = *display;
                debug!("Hybrid pair {}/{} lost a half; ended", driver, display_id);
                ended += 1;
                return false;
            }

            if let Some(facing) = host.facing(*driver) {
                host.set_facing(*display, facing);
            }

            let (Some(driver_health), Some(display_health)) =
                (host.health(*driver), host.health(*display))
            else {
                return true;
            };
            let shared = driver_health.min(display_health);
            if shared <= 0.0 {
                host.kill(*driver);
                host.kill(*display);
                ended += 1;
                return false;
            }
            if driver_health > shared {
                host.set_health(*driver, shared);
            } else if display_health > shared {
                host.set_health(*display, shared);
            }
            true
        });
        ended
    }

    /// Re-pairs live drivers and displays from their persisted partner ids.
    pub fn rebuild_from_world(&mut self, host: &mut impl ActorHost) -> usize {
        self.pairs.clear();
        for actor in host.actors() {
            if !host.is_alive(actor) {
                continue;
            }
            let Some(tag) = ManagedTag::of(&*host, actor).filter(|tag| tag.is_driver) else {
                continue;
            };
            let Some(display) = tag.partner else {
                continue;
            };
            let display_matches = host.is_alive(display)
                && ManagedTag::of(&*host, display)
                    .map(|partner| partner.is_display && partner.partner == Some(actor))
                    .unwrap_or(false);
            if display_matches {
                self.pairs.insert(actor, display);
            }
        }
        self.pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{EcsHost, Facing},
        hostile::{definition::DefinitionId, tags::link_partner},
    };

    fn spawn_pair(host: &mut EcsHost<'_>) -> (ActorId, ActorId) {
        let driver = host.create("zombie", Vec3::ZERO).expect("driver");
        let display = host.create("villager", Vec3::ZERO).expect("display");
        host.spawn(display);
        host.spawn(driver);
        (driver, display)
    }

    #[test]
    fn sync_copies_facing_and_shares_damage() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let (driver, display) = spawn_pair(&mut host);
        let mut pairs = HybridPairs::default();
        pairs.link(driver, display);

        host.set_facing(driver, Facing::new(45.0, -10.0, 50.0));
        host.damage(display, 6.0);

        assert_eq!(pairs.sync(&mut host), 0);
        assert_eq!(host.facing(display), Some(Facing::new(45.0, -10.0, 50.0)));
        assert_eq!(host.health(driver), Some(14.0));
        assert_eq!(host.health(display), Some(14.0));

        host.damage(driver, 4.0);
        pairs.sync(&mut host);
        assert_eq!(host.health(display), Some(10.0));
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn depleted_half_ends_the_pair_in_one_sync() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let (driver, display) = spawn_pair(&mut host);
        let mut pairs = HybridPairs::default();
        pairs.link(driver, display);

        host.damage(display, 100.0);
        assert_eq!(pairs.sync(&mut host), 1);
        assert!(!host.is_alive(driver));
        assert!(!host.is_alive(display));
        assert!(pairs.is_empty());
    }

    #[test]
    fn depleted_driver_ends_the_pair_in_one_sync() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let (driver, display) = spawn_pair(&mut host);
        let mut pairs = HybridPairs::default();
        pairs.link(driver, display);

        host.damage(driver, 100.0);
        assert_eq!(pairs.sync(&mut host), 1);
        assert!(!host.is_alive(driver));
        assert!(!host.is_alive(display));
        assert_eq!(host.health(display), Some(0.0));
        assert!(pairs.is_empty());
    }

    #[test]
    fn missing_half_takes_the_survivor_down() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let (driver, display) = spawn_pair(&mut host);
        let mut pairs = HybridPairs::default();
        pairs.link(driver, display);

        host.discard(driver);
        assert_eq!(pairs.sync(&mut host), 1);
        assert!(!host.is_alive(display));
        assert_eq!(pairs.partner_of(display), None);
    }

    #[test]
    fn pairs_are_rebuilt_from_metadata() {
        let mut world = World::new();
        let mut host = EcsHost::new(&mut world);
        let (driver, display) = spawn_pair(&mut host);
        let (lonely, _) = spawn_pair(&mut host);

        let base = ManagedTag::standard(DefinitionId::new(1), "minecraft:villager");
        ManagedTag { is_driver: true, ..base.clone() }.write(&mut host, driver);
        ManagedTag { is_display: true, ..base.clone() }.write(&mut host, display);
        link_partner(&mut host, driver, display);
        link_partner(&mut host, display, driver);
        ManagedTag { is_driver: true, ..base }.write(&mut host, lonely);

        let mut pairs = HybridPairs::default();
        assert_eq!(pairs.rebuild_from_world(&mut host), 1);
        assert_eq!(pairs.display_of(driver), Some(display));
        assert_eq!(pairs.partner_of(display), Some(driver));
        assert_eq!(pairs.unlink(display), Some(driver));
        assert!(pairs.is_empty());
    }
}
