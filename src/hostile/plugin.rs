//! HostilePlugin wires the definition store, population tracker, and reconciler.
use bevy::prelude::*;

use crate::host::HostObserveSet;

use super::{
    config::HostileSettings,
    events::PopulationCommand,
    reconcile::RegionReconciler,
    storage::TomlFileStorage,
    store::DefinitionStore,
    systems::{
        collect_actor_deaths, collect_population_commands, collect_region_activations,
        purge_on_world_start, release_on_exit, run_hostile_tick, HostileInbox,
    },
    tracker::PopulationTracker,
};

pub struct HostilePlugin;

impl Plugin for HostilePlugin {
    fn build(&self, app: &mut App) {
        let settings = HostileSettings::load_or_default();
        let store = DefinitionStore::open(Box::new(TomlFileStorage::new(
            &settings.definitions_path,
        )));
        let tracker = PopulationTracker::new(&settings);
        info!(
            "Hostile controller ready: {} definitions, hybrid spawning {}",
            store.len(),
            if settings.hybrid.enabled { "enabled" } else { "disabled" }
        );
        for definition in store.list_all() {
            debug!(
                "{}: {} x{} ({}), respawn after {} ticks",
                definition.id,
                definition.display_name(),
                definition.max_count,
                definition.base_actor_type,
                definition.respawn_delay_ticks
            );
        }

        app.insert_resource(settings)
            .insert_resource(store)
            .insert_resource(tracker)
            .init_resource::<RegionReconciler>()
            .init_resource::<HostileInbox>()
            .add_message::<PopulationCommand>()
            .add_systems(PostStartup, purge_on_world_start)
            .add_systems(Last, release_on_exit)
            .add_systems(
                FixedUpdate,
                (
                    (
                        collect_population_commands,
                        collect_actor_deaths,
                        collect_region_activations,
                    ),
                    run_hostile_tick,
                )
                    .chain()
                    .after(HostObserveSet),
            );
    }
}
