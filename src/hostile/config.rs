use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/hostile_spawns.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawHostileConfig {
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    population: RawPopulation,
    #[serde(default)]
    hybrid: RawHybrid,
    #[serde(default)]
    assailant: RawAssailant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawStorage {
    definitions_path: String,
}

impl Default for RawStorage {
    fn default() -> Self {
        Self {
            definitions_path: "data/hostile_definitions.toml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawPopulation {
    top_up_interval_ticks: u64,
    cleanup_interval_ticks: u64,
    rng_seed: Option<u64>,
}

impl Default for RawPopulation {
    fn default() -> Self {
        Self {
            top_up_interval_ticks: 100,
            cleanup_interval_ticks: 40,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHybrid {
    enabled: bool,
    chassis: String,
    driver_scale: f32,
}

impl Default for RawHybrid {
    fn default() -> Self {
        Self {
            enabled: false,
            chassis: "zombie".to_string(),
            driver_scale: 0.0625,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawAssailant {
    attack_range: f32,
    cooldown_ticks: u64,
}

impl Default for RawAssailant {
    fn default() -> Self {
        Self {
            attack_range: 2.0,
            cooldown_ticks: 20,
        }
    }
}

/// Tuning for the hostile population controller.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HostileSettings {
    pub definitions_path: String,
    pub top_up_interval_ticks: u64,
    pub cleanup_interval_ticks: u64,
    /// Fixed seed for spawn placement; entropy when unset.
    pub rng_seed: Option<u64>,
    pub hybrid: HybridSettings,
    pub assailant: AssailantSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HybridSettings {
    /// Hybrid materialisation fails closed while disabled.
    pub enabled: bool,
    pub chassis: String,
    pub driver_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssailantSettings {
    pub attack_range: f32,
    pub cooldown_ticks: u64,
}

impl HostileSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawHostileConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawHostileConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawHostileConfig::default().into()
            }
        }
    }
}

impl Default for HostileSettings {
    fn default() -> Self {
        RawHostileConfig::default().into()
    }
}

impl From<RawHostileConfig> for HostileSettings {
    fn from(value: RawHostileConfig) -> Self {
        let chassis = value.hybrid.chassis.trim();
        Self {
            definitions_path: value.storage.definitions_path,
            top_up_interval_ticks: value.population.top_up_interval_ticks.max(1),
            cleanup_interval_ticks: value.population.cleanup_interval_ticks.max(1),
            rng_seed: value.population.rng_seed,
            hybrid: HybridSettings {
                enabled: value.hybrid.enabled,
                chassis: if chassis.is_empty() {
                    RawHybrid::default().chassis
                } else {
                    chassis.to_string()
                },
                driver_scale: value.hybrid.driver_scale.clamp(0.0625, 1.0),
            },
            assailant: AssailantSettings {
                attack_range: value.assailant.attack_range.max(0.0),
                cooldown_ticks: value.assailant.cooldown_ticks.max(1),
            },
        }
    }
}
