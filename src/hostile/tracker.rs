//! Population tracker: keeps every definition at its configured headcount.
use std::collections::{BTreeMap, VecDeque};

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::host::{ActorHost, ActorId};

use super::{
    config::HostileSettings,
    definition::DefinitionId,
    store::DefinitionStore,
    strategy::SpawnStrategy,
    tags::ManagedTag,
};

/// Counters from one tracker tick, used for debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Live-instance bookkeeping and respawn scheduling.
///
/// The instance maps are a cache; headcounts always come from a world scan.
#[derive(Resource)]
pub struct PopulationTracker {
    instances: BTreeMap<ActorId, DefinitionId>,
    by_definition: BTreeMap<DefinitionId, Vec<ActorId>>,
    timers: BTreeMap<DefinitionId, u32>,
    queued: VecDeque<DefinitionId>,
    strategy: SpawnStrategy,
    rng: StdRng,
    top_up_interval: u64,
    cleanup_interval: u64,
    initialized: bool,
}

impl PopulationTracker {
    pub fn new(settings: &HostileSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            instances: BTreeMap::new(),
            by_definition: BTreeMap::new(),
            timers: BTreeMap::new(),
            queued: VecDeque::new(),
            strategy: SpawnStrategy::new(settings.hybrid.clone(), settings.assailant),
            rng,
            top_up_interval: settings.top_up_interval_ticks,
            cleanup_interval: settings.cleanup_interval_ticks,
            initialized: false,
        }
    }

    pub fn strategy(&self) -> &SpawnStrategy {
        &self.strategy
    }

    /// Checked insert into both maps. Refuses an actor that is already registered.
    pub fn register_instance(&mut self, actor: ActorId, definition: DefinitionId) -> bool {
        if let Some(existing) = self.instances.get(&actor) {
            warn!(
                "Refusing to register {} for {}: already tracked under {}",
                actor, definition, existing
            );
            return false;
        }
        self.instances.insert(actor, definition);
        self.by_definition.entry(definition).or_default().push(actor);
        true
    }

    /// Drops `actor` from both maps without touching the world or timers.
    pub fn forget(&mut self, actor: ActorId) -> Option<DefinitionId> {
        let definition = self.instances.remove(&actor)?;
        if let Some(actors) = self.by_definition.get_mut(&definition) {
            actors.retain(|candidate| *candidate != actor);
            if actors.is_empty() {
                self.by_definition.remove(&definition);
            }
        }
        Some(definition)
    }

    /// Destroys an instance (and its hybrid partner) and forgets it.
    pub fn destroy_instance(&mut self, host: &mut impl ActorHost, actor: ActorId) {
        self.forget(actor);
        self.strategy.discard_instance(host, actor);
    }

    /// Live managed actors of `definition`, counted by scanning the world.
    pub fn live_count(&self, host: &mut impl ActorHost, definition: DefinitionId) -> usize {
        host.actors()
            .into_iter()
            .filter(|actor| host.is_alive(*actor))
            .filter(|actor| {
                ManagedTag::of(&*host, *actor)
                    .map(|tag| tag.definition == Some(definition) && !tag.is_display)
                    .unwrap_or(false)
            })
            .count()
    }

    /// Attempts one spawn for `definition`. Refused when the headcount is already met.
    pub fn spawn(
        &mut self,
        host: &mut impl ActorHost,
        store: &DefinitionStore,
        definition: DefinitionId,
    ) -> bool {
        let Some(template) = store.get(definition) else {
            debug!("Spawn for unknown definition {} ignored", definition);
            return false;
        };
        let live = self.live_count(host, definition);
        if live >= template.max_count as usize {
            debug!(
                "{} already at {}/{}; spawn refused",
                definition, live, template.max_count
            );
            return false;
        }

        let position = template.spawn_region.random_point(&mut self.rng);
        match self.strategy.materialize(host, template, position) {
            Some(actor) => {
                self.register_instance(actor, definition);
                debug!(
                    "Spawned {} for {} at ({:.1}, {:.1}, {:.1})",
                    actor, definition, position.x, position.y, position.z
                );
                true
            }
            None => {
                warn!("Failed to materialise an instance of {}", definition);
                false
            }
        }
    }

    /// Cancels the pending timer and destroys every instance of `definition`.
    pub fn despawn(&mut self, host: &mut impl ActorHost, definition: DefinitionId) -> usize {
        self.timers.remove(&definition);
        self.queued.retain(|queued| *queued != definition);

        let mut destroyed = 0;
        for actor in self.by_definition.remove(&definition).unwrap_or_default() {
            self.instances.remove(&actor);
            self.strategy.discard_instance(host, actor);
            destroyed += 1;
        }

        let stragglers: Vec<ActorId> = host
            .actors()
            .into_iter()
            .filter(|actor| {
                ManagedTag::of(&*host, *actor)
                    .map(|tag| tag.definition == Some(definition))
                    .unwrap_or(false)
            })
            .collect();
        for actor in stragglers {
            // Already removed as the partner of an earlier straggler.
            if host.position(actor).is_none() {
                continue;
            }
            self.strategy.discard_instance(host, actor);
            destroyed += 1;
        }

        if destroyed > 0 {
            info!("Despawned {} actors of {}", destroyed, definition);
        }
        destroyed
    }

    /// Handles a reported death, starting a respawn timer when there is a deficit.
    pub fn notify_death(
        &mut self,
        host: &mut impl ActorHost,
        store: &DefinitionStore,
        definition: DefinitionId,
        actor: ActorId,
    ) {
        self.forget(actor);
        self.strategy.assailants_mut().dismiss(actor);

        let Some(template) = store.get(definition) else {
            return;
        };
        if !template.persistent || self.timers.contains_key(&definition) {
            return;
        }
        if self.live_count(host, definition) < template.max_count as usize {
            self.timers.insert(definition, template.respawn_delay_ticks);
            debug!(
                "{} died; {} respawns in {} ticks",
                actor, definition, template.respawn_delay_ticks
            );
        }
    }

    /// One scheduler step. Does nothing while no observers are present.
    pub fn tick(&mut self, host: &mut impl ActorHost, store: &DefinitionStore) -> TickReport {
        let mut report = TickReport::default();
        if !host.observers_present() {
            return report;
        }
        if !self.initialized {
            self.initialize_population(host, store);
        }
        let now = host.current_tick();

        let mut expired = Vec::new();
        self.timers.retain(|definition, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(*definition);
                false
            } else {
                true
            }
        });
        self.queued.extend(expired);

        while let Some(definition) = self.queued.pop_front() {
            if self.spawn(host, store, definition) {
                report.spawned += 1;
            } else {
                report.failed += 1;
            }
        }

        if now % self.top_up_interval == 0 {
            let (spawned, failed) = self.top_up(host, store, true);
            report.spawned += spawned;
            report.failed += failed;
        }

        if now % self.cleanup_interval == 0 {
            report.pruned = self.sweep(host);
        }

        if report != TickReport::default() {
            debug!(
                "Tick {}: spawned {}, failed {}, pruned {}",
                now, report.spawned, report.failed, report.pruned
            );
        }
        report
    }

    /// Rebuilds the maps from the world and fills every definition immediately.
    pub fn initialize_population(&mut self, host: &mut impl ActorHost, store: &DefinitionStore) {
        self.initialized = true;
        let adopted = self.rebuild_from_world(host, store);
        let (spawned, failed) = self.top_up(host, store, false);
        info!(
            "Hostile population initialised: {} adopted, {} spawned, {} failed",
            adopted, spawned, failed
        );
    }

    /// Clears the maps and re-registers live managed actors from their metadata.
    pub fn rebuild_from_world(&mut self, host: &mut impl ActorHost, store: &DefinitionStore) -> usize {
        self.instances.clear();
        self.by_definition.clear();
        self.strategy.pairs_mut().rebuild_from_world(host);

        let mut adopted = 0;
        for actor in host.actors() {
            if !host.is_alive(actor) {
                continue;
            }
            let Some(tag) = ManagedTag::of(&*host, actor) else {
                continue;
            };
            if tag.is_display {
                continue;
            }
            if let Some(definition) = tag.definition.filter(|id| store.contains(*id)) {
                if self.register_instance(actor, definition) {
                    adopted += 1;
                }
            }
        }
        adopted
    }

    /// Re-applies the stored stats to every registered live instance.
    pub fn refresh_stats(
        &mut self,
        host: &mut impl ActorHost,
        store: &DefinitionStore,
        definition: DefinitionId,
    ) -> usize {
        let Some(template) = store.get(definition) else {
            return 0;
        };
        let actors = self.instances_of(definition).to_vec();
        let mut refreshed = 0;
        for actor in actors {
            if !host.is_alive(actor) {
                continue;
            }
            self.strategy.restat(host, actor, &template.stats);
            refreshed += 1;
        }
        refreshed
    }

    /// Runs the hybrid pair sync and scripted assailants for this tick.
    pub fn drive_instances(&mut self, host: &mut impl ActorHost) {
        self.strategy.pairs_mut().sync(host);
        self.strategy.assailants_mut().tick(host);
    }

    /// Drops all state. The next tick with observers re-initialises from the world.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.by_definition.clear();
        self.timers.clear();
        self.queued.clear();
        self.strategy.clear();
        self.initialized = false;
    }

    pub fn pending_timer(&self, definition: DefinitionId) -> Option<u32> {
        self.timers.get(&definition).copied()
    }

    pub fn instances_of(&self, definition: DefinitionId) -> &[ActorId] {
        self.by_definition
            .get(&definition)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn definition_of(&self, actor: ActorId) -> Option<DefinitionId> {
        self.instances.get(&actor).copied()
    }

    pub fn tracked(&self) -> usize {
        self.instances.len()
    }

    /// True when both maps describe exactly the same registrations.
    pub fn is_consistent(&self) -> bool {
        let forward = self.instances.iter().all(|(actor, definition)| {
            self.instances_of(*definition)
                .iter()
                .filter(|candidate| *candidate == actor)
                .count()
                == 1
        });
        let listed: usize = self.by_definition.values().map(Vec::len).sum();
        let backward = self.by_definition.iter().all(|(definition, actors)| {
            !actors.is_empty()
                && actors
                    .iter()
                    .all(|actor| self.instances.get(actor) == Some(definition))
        });
        forward && backward && listed == self.instances.len()
    }

    fn top_up(
        &mut self,
        host: &mut impl ActorHost,
        store: &DefinitionStore,
        persistent_only: bool,
    ) -> (usize, usize) {
        let (mut spawned, mut failed) = (0, 0);
        for template in store.iter() {
            if persistent_only && (!template.persistent || self.timers.contains_key(&template.id)) {
                continue;
            }
            let deficit =
                (template.max_count as usize).saturating_sub(self.live_count(host, template.id));
            for _ in 0..deficit {
                if self.spawn(host, store, template.id) {
                    spawned += 1;
                } else {
                    failed += 1;
                    break;
                }
            }
        }
        (spawned, failed)
    }

    fn sweep(&mut self, host: &mut impl ActorHost) -> usize {
        let gone: Vec<ActorId> = self
            .instances
            .keys()
            .copied()
            .filter(|actor| !host.is_alive(*actor))
            .collect();
        for actor in &gone {
            self.forget(*actor);
        }
        gone.len()
    }
}
