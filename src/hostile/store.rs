//! Definition store: CRUD over hostile definitions with write-through persistence.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    definition::{
        Definition, DefinitionId, Stats, DEFAULT_MAX_COUNT, DEFAULT_RESPAWN_DELAY_TICKS,
    },
    errors::StoreError,
    region::SpawnRegion,
    storage::DefinitionStorage,
};

const DEFAULT_BASE_TYPE: &str = "zombie";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DefinitionDocument {
    #[serde(default)]
    definitions: Vec<RawDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDefinition {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default = "default_base_type")]
    base_actor_type: String,
    #[serde(default = "default_max_count")]
    max_count: u32,
    #[serde(default = "default_respawn_delay")]
    respawn_delay_ticks: u32,
    #[serde(default = "default_persistent")]
    persistent: bool,
    #[serde(default)]
    spawn_region: RawSpawnRegion,
    #[serde(default)]
    stats: RawStats,
}

fn default_base_type() -> String {
    DEFAULT_BASE_TYPE.to_string()
}

fn default_max_count() -> u32 {
    DEFAULT_MAX_COUNT
}

fn default_respawn_delay() -> u32 {
    DEFAULT_RESPAWN_DELAY_TICKS
}

fn default_persistent() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawSpawnRegion {
    min: [f32; 3],
    max: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RawStats {
    health: f32,
    attack_damage: f32,
    speed: f32,
    knockback_resistance: f32,
    detection_range: f32,
    glowing: bool,
}

impl Default for RawStats {
    fn default() -> Self {
        Stats::default().into()
    }
}

impl From<Stats> for RawStats {
    fn from(stats: Stats) -> Self {
        Self {
            health: stats.health,
            attack_damage: stats.attack_damage,
            speed: stats.speed,
            knockback_resistance: stats.knockback_resistance,
            detection_range: stats.detection_range,
            glowing: stats.glowing,
        }
    }
}

impl From<RawStats> for Stats {
    fn from(raw: RawStats) -> Self {
        Stats {
            health: raw.health,
            attack_damage: raw.attack_damage,
            speed: raw.speed,
            knockback_resistance: raw.knockback_resistance,
            detection_range: raw.detection_range,
            glowing: raw.glowing,
        }
        .sanitised()
    }
}

impl From<&Definition> for RawDefinition {
    fn from(definition: &Definition) -> Self {
        let region = definition.spawn_region;
        Self {
            id: definition.id.value(),
            name: definition.name.clone(),
            base_actor_type: definition.base_actor_type.clone(),
            max_count: definition.max_count,
            respawn_delay_ticks: definition.respawn_delay_ticks,
            persistent: definition.persistent,
            spawn_region: RawSpawnRegion {
                min: region.min().to_array(),
                max: region.max().to_array(),
            },
            stats: definition.stats.into(),
        }
    }
}

impl From<RawDefinition> for Definition {
    fn from(raw: RawDefinition) -> Self {
        let base_actor_type = if raw.base_actor_type.trim().is_empty() {
            default_base_type()
        } else {
            raw.base_actor_type
        };
        Definition {
            id: DefinitionId::new(raw.id),
            name: raw.name,
            base_actor_type,
            spawn_region: SpawnRegion::from_corners(
                Vec3::from_array(raw.spawn_region.min),
                Vec3::from_array(raw.spawn_region.max),
            ),
            stats: raw.stats.into(),
            max_count: raw.max_count,
            respawn_delay_ticks: raw.respawn_delay_ticks,
            persistent: raw.persistent,
        }
    }
}

fn parse_document(contents: &str) -> Result<Vec<Definition>, StoreError> {
    let document: DefinitionDocument = toml::from_str(contents)?;
    let mut definitions: Vec<Definition> =
        document.definitions.into_iter().map(Definition::from).collect();
    definitions.sort_by_key(|definition| definition.id);
    definitions.dedup_by_key(|definition| definition.id);
    Ok(definitions)
}

fn render_document(definitions: &[Definition]) -> Result<String, StoreError> {
    let document = DefinitionDocument {
        definitions: definitions.iter().map(RawDefinition::from).collect(),
    };
    Ok(toml::to_string_pretty(&document)?)
}

/// Every hostile definition known to the server, kept in id order.
#[derive(Resource)]
pub struct DefinitionStore {
    definitions: Vec<Definition>,
    next_id: u32,
    storage: Box<dyn DefinitionStorage>,
}

impl DefinitionStore {
    /// Loads the store from `storage`. Unreadable documents leave the store empty.
    pub fn open(storage: Box<dyn DefinitionStorage>) -> Self {
        let mut store = Self {
            definitions: Vec::new(),
            next_id: 1,
            storage,
        };
        store.reload();
        store
    }

    /// Re-reads the document, replacing the in-memory collection. Returns `false` on failure.
    pub fn reload(&mut self) -> bool {
        let loaded = match self.storage.read_document() {
            Ok(Some(contents)) => parse_document(&contents),
            Ok(None) => {
                info!(
                    "No hostile definitions at {}; starting with an empty store.",
                    self.storage.describe()
                );
                self.definitions.clear();
                self.persist();
                return true;
            }
            Err(err) => Err(err),
        };

        match loaded {
            Ok(definitions) => {
                let highest = definitions
                    .iter()
                    .map(|definition| definition.id.value())
                    .max()
                    .unwrap_or(0);
                self.next_id = self.next_id.max(highest.saturating_add(1));
                self.definitions = definitions;
                info!(
                    "Loaded {} hostile definitions from {}",
                    self.definitions.len(),
                    self.storage.describe()
                );
                true
            }
            Err(err) => {
                error!(
                    "Failed to load hostile definitions from {}: {}. Starting empty.",
                    self.storage.describe(),
                    err
                );
                self.definitions.clear();
                false
            }
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        base_actor_type: impl Into<String>,
        spawn_region: SpawnRegion,
    ) -> DefinitionId {
        let id = DefinitionId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let definition = Definition::new(id, name, base_actor_type, spawn_region);
        info!(
            "Registered hostile definition {} ({}) as {}",
            id,
            definition.display_name(),
            definition.base_actor_type
        );
        self.definitions.push(definition);
        self.persist();
        id
    }

    /// Removes the record only; live instances must be despawned by the caller first.
    pub fn remove(&mut self, id: DefinitionId) -> Option<Definition> {
        let index = self.index_of(id)?;
        let removed = self.definitions.remove(index);
        info!("Removed hostile definition {}", id);
        self.persist();
        Some(removed)
    }

    pub fn set_stats(&mut self, id: DefinitionId, stats: Stats) -> bool {
        self.mutate(id, |definition| definition.stats = stats.sanitised())
    }

    pub fn set_spawn_region(&mut self, id: DefinitionId, region: SpawnRegion) -> bool {
        self.mutate(id, |definition| definition.spawn_region = region)
    }

    pub fn set_population(
        &mut self,
        id: DefinitionId,
        max_count: u32,
        respawn_delay_ticks: u32,
    ) -> bool {
        self.mutate(id, |definition| {
            definition.max_count = max_count;
            definition.respawn_delay_ticks = respawn_delay_ticks;
        })
    }

    pub fn set_persistent(&mut self, id: DefinitionId, persistent: bool) -> bool {
        self.mutate(id, |definition| definition.persistent = persistent)
    }

    /// Drops every definition. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.definitions.clear();
        self.persist();
    }

    pub fn get(&self, id: DefinitionId) -> Option<&Definition> {
        self.index_of(id).map(|index| &self.definitions[index])
    }

    pub fn contains(&self, id: DefinitionId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn list_all(&self) -> Vec<Definition> {
        self.definitions.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    pub fn ids(&self) -> Vec<DefinitionId> {
        self.definitions.iter().map(|definition| definition.id).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn index_of(&self, id: DefinitionId) -> Option<usize> {
        self.definitions
            .binary_search_by_key(&id, |definition| definition.id)
            .ok()
    }

    fn mutate(&mut self, id: DefinitionId, apply: impl FnOnce(&mut Definition)) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        apply(&mut self.definitions[index]);
        self.persist();
        true
    }

    fn persist(&self) {
        let result = render_document(&self.definitions)
            .and_then(|contents| self.storage.write_document(&contents));
        if let Err(err) = result {
            error!(
                "Failed to save hostile definitions to {}: {}",
                self.storage.describe(),
                err
            );
        }
    }
}
