//! Admin-declared templates for hostile actors.
use std::fmt;

use super::region::SpawnRegion;

pub const DEFAULT_MAX_COUNT: u32 = 1;
pub const DEFAULT_RESPAWN_DELAY_TICKS: u32 = 200;

/// Unique identifier for a definition, assigned monotonically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionId(u32);

impl DefinitionId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DEF-{:04}", self.0)
    }
}

/// Stat customisation applied to every instance of a definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub health: f32,
    pub attack_damage: f32,
    pub speed: f32,
    /// 0.0 to 1.0.
    pub knockback_resistance: f32,
    pub detection_range: f32,
    pub glowing: bool,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: 20.0,
            attack_damage: 2.0,
            speed: 1.0,
            knockback_resistance: 0.0,
            detection_range: 16.0,
            glowing: false,
        }
    }
}

impl Stats {
    /// Clamps values into ranges the host accepts.
    pub fn sanitised(self) -> Self {
        Self {
            health: self.health.max(1.0),
            attack_damage: self.attack_damage.max(0.0),
            speed: self.speed.max(0.0),
            knockback_resistance: self.knockback_resistance.clamp(0.0, 1.0),
            detection_range: self.detection_range.max(0.0),
            glowing: self.glowing,
        }
    }
}

/// One class of hostile actor the population tracker keeps alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub id: DefinitionId,
    pub name: String,
    pub base_actor_type: String,
    pub spawn_region: SpawnRegion,
    pub stats: Stats,
    pub max_count: u32,
    pub respawn_delay_ticks: u32,
    /// Persistent definitions are topped up and respawned after deaths.
    pub persistent: bool,
}

impl Definition {
    pub fn new(
        id: DefinitionId,
        name: impl Into<String>,
        base_actor_type: impl Into<String>,
        spawn_region: SpawnRegion,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            base_actor_type: base_actor_type.into(),
            spawn_region,
            stats: Stats::default(),
            max_count: DEFAULT_MAX_COUNT,
            respawn_delay_ticks: DEFAULT_RESPAWN_DELAY_TICKS,
            persistent: true,
        }
    }

    /// Name shown above instances; falls back to the base type.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.base_actor_type
        } else {
            &self.name
        }
    }
}
