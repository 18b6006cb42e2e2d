use bevy::prelude::*;

use crate::host::{
    events::{ActorDied, RegionActivated},
    metadata::ActorMetadata,
    ActorHost, ActorId, EcsHost,
};

use super::{
    definition::DefinitionId,
    events::PopulationCommand,
    reconcile::RegionReconciler,
    store::DefinitionStore,
    tags::ManagedTag,
    tracker::PopulationTracker,
};

/// Inputs gathered from messages, drained once per hostile tick.
#[derive(Resource, Debug, Default)]
pub struct HostileInbox {
    pub commands: Vec<PopulationCommand>,
    pub deaths: Vec<(DefinitionId, ActorId)>,
    pub regions: Vec<(Vec3, Vec3)>,
}

impl HostileInbox {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.deaths.is_empty() && self.regions.is_empty()
    }
}

pub fn collect_population_commands(
    mut reader: MessageReader<PopulationCommand>,
    mut inbox: ResMut<HostileInbox>,
) {
    inbox.commands.extend(reader.read().copied());
}

/// Forwards deaths of managed actors. Display halves are skipped; their driver reports.
pub fn collect_actor_deaths(
    mut reader: MessageReader<ActorDied>,
    metadata: Query<&ActorMetadata>,
    mut inbox: ResMut<HostileInbox>,
) {
    for died in reader.read() {
        let Some(tag) = metadata
            .get(died.entity)
            .ok()
            .and_then(ManagedTag::read)
        else {
            continue;
        };
        if tag.is_display {
            continue;
        }
        if let Some(definition) = tag.definition {
            inbox.deaths.push((definition, died.actor));
        }
    }
}

pub fn collect_region_activations(
    mut reader: MessageReader<RegionActivated>,
    mut inbox: ResMut<HostileInbox>,
) {
    inbox
        .regions
        .extend(reader.read().map(|region| (region.min, region.max)));
}

/// Drives the whole controller for one fixed tick.
pub fn run_hostile_tick(world: &mut World) {
    if !world.contains_resource::<DefinitionStore>()
        || !world.contains_resource::<PopulationTracker>()
        || !world.contains_resource::<RegionReconciler>()
    {
        return;
    }
    let inbox = world
        .get_resource_mut::<HostileInbox>()
        .map(|mut inbox| std::mem::take(&mut *inbox))
        .unwrap_or_default();

    world.resource_scope(|world, mut store: Mut<DefinitionStore>| {
        world.resource_scope(|world, mut tracker: Mut<PopulationTracker>| {
            world.resource_scope(|world, mut reconciler: Mut<RegionReconciler>| {
                let mut host = EcsHost::new(world);

                for command in inbox.commands {
                    apply_command(&mut host, &mut store, &mut tracker, command);
                }
                for (definition, actor) in inbox.deaths {
                    tracker.notify_death(&mut host, &store, definition, actor);
                }

                tracker.drive_instances(&mut host);
                tracker.tick(&mut host, &store);

                for (min, max) in inbox.regions {
                    reconciler.on_region_activated(&mut host, &store, &mut tracker, min, max);
                }
            });
        });
    });
}

fn apply_command(
    host: &mut impl ActorHost,
    store: &mut DefinitionStore,
    tracker: &mut PopulationTracker,
    command: PopulationCommand,
) {
    match command {
        PopulationCommand::Spawn(definition) => {
            if !tracker.spawn(host, store, definition) {
                info!("Spawn request for {} was not fulfilled", definition);
            }
        }
        PopulationCommand::Despawn(definition) => {
            tracker.despawn(host, definition);
        }
        PopulationCommand::RefreshStats(definition) => {
            let refreshed = tracker.refresh_stats(host, store, definition);
            debug!("Refreshed stats on {} instances of {}", refreshed, definition);
        }
        PopulationCommand::Remove(definition) => {
            tracker.despawn(host, definition);
            if store.remove(definition).is_none() {
                warn!("Remove request for unknown definition {}", definition);
            }
        }
    }
}

/// Clears leftovers from a previous session before the first tick.
pub fn purge_on_world_start(world: &mut World) {
    release_population(world);
}

/// Tears the population down when the app is shutting down.
pub fn release_on_exit(mut exits: MessageReader<AppExit>, mut commands: Commands) {
    if exits.read().last().is_some() {
        commands.queue(release_population);
    }
}

/// Destroys every managed actor and resets the tracker.
pub fn release_population(world: &mut World) {
    if !world.contains_resource::<PopulationTracker>()
        || !world.contains_resource::<RegionReconciler>()
    {
        return;
    }
    world.resource_scope(|world, mut tracker: Mut<PopulationTracker>| {
        world.resource_scope(|world, mut reconciler: Mut<RegionReconciler>| {
            let mut host = EcsHost::new(world);
            reconciler.purge_all(&mut host, &mut tracker);
        });
    });
}

#[cfg(test)]
mod tests {
    use bevy::ecs::{message::Messages, system::RunSystemOnce};

    use super::*;
    use crate::{
        core::SimulationTick,
        host::components::Dead,
        hostile::{
            config::HostileSettings, region::SpawnRegion, storage::MemoryStorage,
        },
    };

    fn world_with_controller() -> (World, DefinitionId) {
        let mut world = World::new();
        world.insert_resource(SimulationTick::starting_at(1));
        let mut store = DefinitionStore::open(Box::new(MemoryStorage::default()));
        let id = store.register(
            "Grunt",
            "zombie",
            SpawnRegion::from_corners(Vec3::ZERO, Vec3::splat(4.0)),
        );
        store.set_population(id, 2, 10);
        world.insert_resource(store);
        world.insert_resource(PopulationTracker::new(&HostileSettings {
            rng_seed: Some(5),
            ..HostileSettings::default()
        }));
        world.init_resource::<RegionReconciler>();
        world.init_resource::<HostileInbox>();
        EcsHost::new(&mut world).enroll_observer(Vec3::new(2.0, 0.0, 2.0), 20.0);
        (world, id)
    }

    fn live(world: &mut World, id: DefinitionId) -> usize {
        world.resource_scope(|world, tracker: Mut<PopulationTracker>| {
            tracker.live_count(&mut EcsHost::new(world), id)
        })
    }

    #[test]
    fn hostile_tick_populates_and_handles_commands() {
        let (mut world, id) = world_with_controller();
        run_hostile_tick(&mut world);
        assert_eq!(live(&mut world, id), 2);

        world
            .resource_mut::<HostileInbox>()
            .commands
            .push(PopulationCommand::Despawn(id));
        run_hostile_tick(&mut world);
        assert_eq!(live(&mut world, id), 0);
        assert!(world.resource::<HostileInbox>().is_empty());

        world
            .resource_mut::<HostileInbox>()
            .commands
            .push(PopulationCommand::Remove(id));
        run_hostile_tick(&mut world);
        assert!(world.resource::<DefinitionStore>().is_empty());
    }

    #[test]
    fn reported_deaths_start_respawn_timers() {
        let (mut world, id) = world_with_controller();
        run_hostile_tick(&mut world);

        let actor = world.resource::<PopulationTracker>().instances_of(id)[0];
        EcsHost::new(&mut world).kill(actor);
        world.resource_mut::<HostileInbox>().deaths.push((id, actor));
        run_hostile_tick(&mut world);

        assert_eq!(world.resource::<PopulationTracker>().pending_timer(id), Some(9));
        assert_eq!(world.resource::<PopulationTracker>().definition_of(actor), None);
    }

    #[test]
    fn app_exit_releases_the_population() {
        let (mut world, id) = world_with_controller();
        world.init_resource::<Messages<AppExit>>();
        run_hostile_tick(&mut world);
        assert_eq!(live(&mut world, id), 2);

        world.run_system_once(release_on_exit).expect("system runs");
        assert_eq!(live(&mut world, id), 2);

        world.write_message(AppExit::Success);
        world.run_system_once(release_on_exit).expect("system runs");
        assert_eq!(live(&mut world, id), 0);
        assert!(EcsHost::new(&mut world).actors().is_empty());
        assert!(world.resource::<PopulationTracker>().instances_of(id).is_empty());
        assert_eq!(world.resource::<RegionReconciler>().cleaned_total(), 2);
    }

    #[test]
    fn death_collection_skips_display_halves() {
        let mut world = World::new();
        world.init_resource::<HostileInbox>();
        world.init_resource::<Messages<ActorDied>>();

        let (driver, display, bystander) = {
            let mut host = EcsHost::new(&mut world);
            let driver = host.create("zombie", Vec3::ZERO).expect("driver");
            let display = host.create("villager", Vec3::ZERO).expect("display");
            let bystander = host.create("pig", Vec3::ZERO).expect("pig");
            let base = ManagedTag::standard(DefinitionId::new(2), "minecraft:villager");
            ManagedTag { is_driver: true, ..base.clone() }.write(&mut host, driver);
            ManagedTag { is_display: true, ..base }.write(&mut host, display);
            (driver, display, bystander)
        };

        for actor in [driver, display, bystander] {
            let entity = world
                .resource::<crate::host::components::ActorDirectory>()
                .entity(actor)
                .expect("bound");
            world.entity_mut(entity).insert(Dead);
            world.write_message(ActorDied { actor, entity });
        }
        world
            .run_system_once(collect_actor_deaths)
            .expect("system runs");

        assert_eq!(
            world.resource::<HostileInbox>().deaths,
            vec![(DefinitionId::new(2), driver)]
        );
    }
}
