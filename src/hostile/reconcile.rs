//! Orphan cleanup for managed actors whose definition no longer exists.
use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::host::{ActorHost, ActorId};

use super::{store::DefinitionStore, tags::ManagedTag, tracker::PopulationTracker};

#[derive(Resource, Debug, Default)]
pub struct RegionReconciler {
    cleaned_total: u64,
}

impl RegionReconciler {
    /// Actors removed by this reconciler since startup.
    pub fn cleaned_total(&self) -> u64 {
        self.cleaned_total
    }

    /// Destroys orphaned managed actors inside `min..=max`, partners included.
    pub fn on_region_activated(
        &mut self,
        host: &mut impl ActorHost,
        store: &DefinitionStore,
        tracker: &mut PopulationTracker,
        min: Vec3,
        max: Vec3,
    ) -> usize {
        let mut handled: BTreeSet<ActorId> = BTreeSet::new();
        let mut cleaned = 0;

        for actor in host.actors_within(min, max) {
            if handled.contains(&actor) {
                continue;
            }
            let Some(tag) = ManagedTag::of(&*host, actor) else {
                continue;
            };
            let known = tag.definition.is_some_and(|id| store.contains(id));
            if known {
                continue;
            }

            handled.insert(actor);
            cleaned += 1;
            if let Some(partner) = tag.partner {
                if handled.insert(partner) && host.position(partner).is_some() {
                    cleaned += 1;
                }
                tracker.forget(partner);
            }
            tracker.destroy_instance(host, actor);
        }

        if cleaned > 0 {
            info!("Removed {} orphaned hostile actors from an activated region", cleaned);
            self.cleaned_total += cleaned as u64;
        }
        cleaned
    }

    /// World-start purge: destroys every managed actor and resets the tracker.
    pub fn purge_all(&mut self, host: &mut impl ActorHost, tracker: &mut PopulationTracker) -> usize {
        let managed: Vec<ActorId> = host
            .actors()
            .into_iter()
            .filter(|actor| ManagedTag::of(&*host, *actor).is_some())
            .collect();
        for actor in &managed {
            host.discard(*actor);
        }
        tracker.clear();

        if !managed.is_empty() {
            info!("Purged {} managed hostile actors at world start", managed.len());
            self.cleaned_total += managed.len() as u64;
        }
        managed.len()
    }
}
