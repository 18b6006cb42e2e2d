//! Scripted melee handler for hostiles that could not take autonomous behavior.
use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::host::{ActorHost, ActorId, Facing};

use super::config::AssailantSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Assailant {
    detection_range: f32,
    attack_damage: f32,
    last_strike: Option<u64>,
}

/// Actors driven by the scripted fallback. No navigation: they turn and swing.
#[derive(Debug, Clone)]
pub struct ScriptedAssailants {
    settings: AssailantSettings,
    enlisted: BTreeMap<ActorId, Assailant>,
}

impl ScriptedAssailants {
    pub fn new(settings: AssailantSettings) -> Self {
        Self {
            settings,
            enlisted: BTreeMap::new(),
        }
    }

    pub fn enlist(&mut self, actor: ActorId, detection_range: f32, attack_damage: f32) {
        debug!("Enlisted {} as scripted assailant", actor);
        self.enlisted.insert(
            actor,
            Assailant {
                detection_range: detection_range.max(0.0),
                attack_damage: attack_damage.max(0.0),
                last_strike: None,
            },
        );
    }

    /// Updates the stats used by an already enlisted actor.
    pub fn retune(&mut self, actor: ActorId, detection_range: f32, attack_damage: f32) {
        if let Some(assailant) = self.enlisted.get_mut(&actor) {
            assailant.detection_range = detection_range.max(0.0);
            assailant.attack_damage = attack_damage.max(0.0);
        }
    }

    pub fn dismiss(&mut self, actor: ActorId) {
        self.enlisted.remove(&actor);
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.enlisted.contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.enlisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enlisted.is_empty()
    }

    pub fn clear(&mut self) {
        self.enlisted.clear();
    }

    /// Runs one tick for every enlisted actor and returns the number of strikes landed.
    pub fn tick(&mut self, host: &mut impl ActorHost) -> usize {
        let now = host.current_tick();
        let settings = self.settings;
        let mut strikes = 0;

        self.enlisted.retain(|actor, assailant| {
            if !host.is_alive(*actor) {
                return false;
            }
            let Some(origin) = host.position(*actor) else {
                return false;
            };
            let Some(target) = host.nearest_observer(origin, assailant.detection_range) else {
                return true;
            };

            host.set_facing(*actor, Facing::looking_at(origin, target.position));

            let cooled = assailant
                .last_strike
                .map(|tick| now.saturating_sub(tick) >= settings.cooldown_ticks)
                .unwrap_or(true);
            if target.distance <= settings.attack_range
                && cooled
                && host.damage(target.observer, assailant.attack_damage)
            {
                assailant.last_strike = Some(now);
                strikes += 1;
            }
            true
        });

        strikes
    }
}
