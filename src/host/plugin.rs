//! HostPlugin wires actor bookkeeping, death detection, and region loading.
use bevy::prelude::*;

use super::{
    catalog::ActorTypeCatalog,
    components::ActorDirectory,
    events::{ActorDied, RegionActivated},
    regions::{track_loaded_regions, LoadedRegions, RegionSettings},
    systems::{carry_riders, detect_actor_deaths, remove_corpses, spawn_debug_observer},
};

/// Host systems other plugins order themselves after.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostObserveSet;

pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        let catalog = ActorTypeCatalog::load_or_default();
        let regions = RegionSettings::load_or_default();
        info!(
            "Host world configured: {} actor types, region size {:.0}, view radius {}",
            catalog.len(),
            regions.size,
            regions.view_radius
        );

        app.insert_resource(catalog)
            .insert_resource(LoadedRegions::new(regions))
            .init_resource::<ActorDirectory>()
            .add_message::<ActorDied>()
            .add_message::<RegionActivated>()
            .add_systems(Startup, spawn_debug_observer)
            .add_systems(
                FixedUpdate,
                (carry_riders, detect_actor_deaths, track_loaded_regions)
                    .chain()
                    .in_set(HostObserveSet),
            )
            .add_systems(FixedPostUpdate, remove_corpses);
    }
}
