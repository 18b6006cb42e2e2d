//! Host-side systems: death detection, rider carrying, corpse removal.
use bevy::prelude::*;

use super::{
    components::{ActorDirectory, ActorUid, Dead, Observer, Pending, Rider, Vitality},
    ecs::EcsHost,
    events::ActorDied,
};

const DEBUG_OBSERVER_HEALTH: f32 = 20.0;

/// Marks actors whose health reached zero and announces each death once.
pub fn detect_actor_deaths(
    mut commands: Commands,
    actors: Query<
        (Entity, &ActorUid, &Vitality),
        (Without<Dead>, Without<Pending>, Without<Observer>),
    >,
    mut writer: MessageWriter<ActorDied>,
) {
    for (entity, uid, vitality) in actors.iter() {
        if !vitality.is_depleted() {
            continue;
        }
        commands.entity(entity).insert(Dead);
        writer.write(ActorDied {
            actor: uid.0,
            entity,
        });
    }
}

/// Keeps riders on top of their vehicles.
pub fn carry_riders(
    mut commands: Commands,
    riders: Query<(Entity, &Rider)>,
    mut transforms: Query<&mut Transform>,
) {
    for (entity, rider) in riders.iter() {
        let anchor = match transforms.get(rider.vehicle) {
            Ok(vehicle) => vehicle.translation,
            Err(_) => {
                commands.entity(entity).remove::<Rider>();
                continue;
            }
        };
        if let Ok(mut transform) = transforms.get_mut(entity) {
            transform.translation = anchor;
        }
    }
}

/// Removes dead actors once every plugin had a chance to react to their death.
pub fn remove_corpses(
    mut commands: Commands,
    corpses: Query<(Entity, &ActorUid), With<Dead>>,
    mut directory: ResMut<ActorDirectory>,
) {
    for (entity, uid) in corpses.iter() {
        directory.unbind(uid.0);
        commands.entity(entity).despawn();
    }
}

/// Places a stand-in observer at the origin so a headless session loads regions.
pub fn spawn_debug_observer(world: &mut World) {
    let observer = EcsHost::new(world).enroll_observer(Vec3::ZERO, DEBUG_OBSERVER_HEALTH);
    info!("Spawned debug observer {} at the origin", observer);
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::host::{
        api::ActorHost,
        ecs::EcsHost,
    };

    #[test]
    fn corpses_leave_the_directory() {
        let mut world = World::new();
        let actor = {
            let mut host = EcsHost::new(&mut world);
            let actor = host.create("zombie", Vec3::ZERO).expect("zombie");
            host.spawn(actor);
            actor
        };
        let entity = world
            .resource::<ActorDirectory>()
            .entity(actor)
            .expect("bound");
        world.entity_mut(entity).insert(Dead);

        world
            .run_system_once(remove_corpses)
            .expect("system should run");

        assert!(world.resource::<ActorDirectory>().entity(actor).is_none());
        assert!(world.get_entity(entity).is_err());
    }

    #[test]
    fn riders_follow_vehicles() {
        let mut world = World::new();
        let (rider, vehicle) = {
            let mut host = EcsHost::new(&mut world);
            let vehicle = host.create("villager", Vec3::ZERO).expect("villager");
            let rider = host.create("zombie", Vec3::ZERO).expect("zombie");
            host.spawn(vehicle);
            host.spawn(rider);
            assert!(host.mount(rider, vehicle));
            (rider, vehicle)
        };
        let vehicle_entity = world
            .resource::<ActorDirectory>()
            .entity(vehicle)
            .expect("vehicle");
        world
            .entity_mut(vehicle_entity)
            .insert(Transform::from_xyz(4.0, 1.0, -2.0));

        world
            .run_system_once(carry_riders)
            .expect("system should run");

        let host = EcsHost::new(&mut world);
        assert_eq!(host.position(rider), Some(Vec3::new(4.0, 1.0, -2.0)));
    }
}
