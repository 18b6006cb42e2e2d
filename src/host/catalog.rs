//! Actor type catalog loaded from `config/actors.toml`.
use std::{collections::HashMap, fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/actors.toml";
const DEFAULT_NAMESPACE: &str = "minecraft";

/// Broad class of an actor type, used to decide how it can be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorCategory {
    Hostile,
    Neutral,
    Passive,
    Decorative,
}

impl ActorCategory {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn label(self) -> &'static str {
        match self {
            Self::Hostile => "hostile",
            Self::Neutral => "neutral",
            Self::Passive => "passive",
            Self::Decorative => "decorative",
        }
    }

    /// Passive and decorative actors never drive hostile behavior themselves.
    pub fn carries_behavior(self) -> bool {
        matches!(self, Self::Hostile | Self::Neutral)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawCatalog {
    #[serde(default = "default_raw_types")]
    types: Vec<RawActorType>,
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self {
            types: default_raw_types(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawActorType {
    id: String,
    category: ActorCategory,
    #[serde(default = "default_health")]
    health: f32,
    #[serde(default = "default_behavior_slots")]
    behavior_slots: bool,
}

fn default_health() -> f32 {
    20.0
}

fn default_behavior_slots() -> bool {
    true
}

fn default_raw_types() -> Vec<RawActorType> {
    let entry = |id: &str, category, health, behavior_slots| RawActorType {
        id: id.to_string(),
        category,
        health,
        behavior_slots,
    };

    vec![
        entry("zombie", ActorCategory::Hostile, 20.0, true),
        entry("skeleton", ActorCategory::Hostile, 20.0, true),
        entry("spider", ActorCategory::Hostile, 16.0, true),
        entry("wolf", ActorCategory::Neutral, 8.0, true),
        entry("villager", ActorCategory::Passive, 20.0, true),
        entry("pig", ActorCategory::Passive, 10.0, true),
        entry("armor_stand", ActorCategory::Decorative, 20.0, false),
        entry("mannequin", ActorCategory::Decorative, 20.0, false),
        entry("shulker", ActorCategory::Hostile, 30.0, false),
    ]
}

/// Properties of a single actor type.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorTypeSpec {
    pub id: String,
    pub category: ActorCategory,
    pub health: f32,
    pub behavior_slots: bool,
}

/// Registry of actor types the host can create.
#[derive(Resource, Debug, Clone)]
pub struct ActorTypeCatalog {
    types: HashMap<String, ActorTypeSpec>,
}

impl ActorTypeCatalog {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<RawCatalog>(&raw) {
                Ok(parsed) => parsed.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to built-in actor types.",
                        CONFIG_PATH, err
                    );
                    RawCatalog::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to built-in actor types.",
                    CONFIG_PATH, err
                );
                RawCatalog::default().into()
            }
        }
    }

    /// Looks up a type by id; `zombie` and `minecraft:zombie` resolve to the same entry.
    pub fn get(&self, type_id: &str) -> Option<&ActorTypeSpec> {
        self.types.get(&normalise_type_id(type_id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ActorTypeCatalog {
    fn default() -> Self {
        RawCatalog::default().into()
    }
}

impl From<RawCatalog> for ActorTypeCatalog {
    fn from(value: RawCatalog) -> Self {
        let types = value
            .types
            .into_iter()
            .filter(|raw| !raw.id.trim().is_empty())
            .map(|raw| {
                let id = normalise_type_id(&raw.id);
                let spec = ActorTypeSpec {
                    id: id.clone(),
                    category: raw.category,
                    health: raw.health.max(1.0),
                    behavior_slots: raw.behavior_slots,
                };
                (id, spec)
            })
            .collect();
        Self { types }
    }
}

/// Lower-cases and namespaces a type id (`Zombie` -> `minecraft:zombie`).
pub fn normalise_type_id(type_id: &str) -> String {
    let trimmed = type_id.trim().to_ascii_lowercase();
    if trimmed.contains(':') {
        trimmed
    } else {
        format!("{}:{}", DEFAULT_NAMESPACE, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_resolves_namespaced_ids() {
        let catalog = ActorTypeCatalog::default();
        let zombie = catalog.get("zombie").expect("zombie should be built in");
        assert_eq!(zombie.id, "minecraft:zombie");
        assert_eq!(catalog.get("minecraft:zombie"), Some(zombie));
        assert_eq!(catalog.get(" Zombie "), Some(zombie));
        assert!(catalog.get("dragon").is_none());
    }

    #[test]
    fn parses_catalog_overrides() {
        let raw: RawCatalog = toml::from_str(
            r#"
            [[types]]
            id = "custom:golem"
            category = "decorative"
            health = 0.0
            behavior_slots = false
            "#,
        )
        .expect("catalog should parse");
        let catalog = ActorTypeCatalog::from(raw);

        assert_eq!(catalog.len(), 1);
        let golem = catalog.get("custom:golem").expect("golem entry");
        assert_eq!(golem.category, ActorCategory::Decorative);
        assert_eq!(golem.health, 1.0);
        assert!(!golem.category.carries_behavior());
    }
}
