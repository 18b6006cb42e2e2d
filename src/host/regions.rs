//! Loaded-region tracking around observers.
use std::{collections::BTreeSet, fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::SimulationTick;

use super::{components::Observer, events::RegionActivated};

const CONFIG_PATH: &str = "config/regions.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawRegionConfig {
    #[serde(default)]
    regions: RawRegionSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRegionSection {
    size: f32,
    view_radius: i32,
    floor: f32,
    ceiling: f32,
    rescan_interval_ticks: u64,
}

impl Default for RawRegionSection {
    fn default() -> Self {
        Self {
            size: 16.0,
            view_radius: 4,
            floor: -64.0,
            ceiling: 2048.0,
            rescan_interval_ticks: 40,
        }
    }
}

/// Geometry of the square column regions that load around observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSettings {
    pub size: f32,
    pub view_radius: i32,
    pub floor: f32,
    pub ceiling: f32,
    pub rescan_interval_ticks: u64,
}

impl RegionSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawRegionConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawRegionConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawRegionConfig::default().into()
            }
        }
    }
}

impl Default for RegionSettings {
    fn default() -> Self {
        RawRegionConfig::default().into()
    }
}

impl From<RawRegionConfig> for RegionSettings {
    fn from(value: RawRegionConfig) -> Self {
        let section = value.regions;
        Self {
            size: section.size.max(1.0),
            view_radius: section.view_radius.max(0),
            floor: section.floor.min(section.ceiling),
            ceiling: section.ceiling.max(section.floor),
            rescan_interval_ticks: section.rescan_interval_ticks,
        }
    }
}

/// Set of region cells currently loaded around observers.
#[derive(Resource, Debug)]
pub struct LoadedRegions {
    settings: RegionSettings,
    loaded: BTreeSet<(i32, i32)>,
}

impl LoadedRegions {
    pub fn new(settings: RegionSettings) -> Self {
        Self {
            settings,
            loaded: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &RegionSettings {
        &self.settings
    }

    pub fn is_loaded(&self, cell: (i32, i32)) -> bool {
        self.loaded.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn cell_of(&self, position: Vec3) -> (i32, i32) {
        (
            (position.x / self.settings.size).floor() as i32,
            (position.z / self.settings.size).floor() as i32,
        )
    }

    /// World-space bounds of a cell, spanning the full configured height.
    pub fn bounds(&self, cell: (i32, i32)) -> (Vec3, Vec3) {
        let size = self.settings.size;
        let min = Vec3::new(cell.0 as f32 * size, self.settings.floor, cell.1 as f32 * size);
        let max = Vec3::new(min.x + size, self.settings.ceiling, min.z + size);
        (min, max)
    }

    /// Recomputes the loaded set from observer positions and returns newly loaded cells.
    pub fn refresh(&mut self, observers: impl IntoIterator<Item = Vec3>) -> Vec<(i32, i32)> {
        let radius = self.settings.view_radius;
        let mut desired = BTreeSet::new();
        for position in observers {
            let (cx, cz) = self.cell_of(position);
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    desired.insert((cx + dx, cz + dz));
                }
            }
        }

        let activated = desired.difference(&self.loaded).copied().collect();
        self.loaded = desired;
        activated
    }

    pub fn loaded_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.loaded.iter().copied()
    }
}

/// Loads regions around observers and announces activations.
pub fn track_loaded_regions(
    observers: Query<&Transform, With<Observer>>,
    tick: Res<SimulationTick>,
    mut regions: ResMut<LoadedRegions>,
    mut writer: MessageWriter<RegionActivated>,
) {
    let activated = regions.refresh(observers.iter().map(|transform| transform.translation));

    let cells: Vec<(i32, i32)> = if tick.is_multiple_of(regions.settings().rescan_interval_ticks) {
        regions.loaded_cells().collect()
    } else {
        activated
    };

    for cell in cells {
        let (min, max) = regions.bounds(cell);
        writer.write(RegionActivated { min, max });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(view_radius: i32) -> LoadedRegions {
        LoadedRegions::new(RegionSettings {
            view_radius,
            ..RegionSettings::default()
        })
    }

    #[test]
    fn refresh_reports_only_new_cells() {
        let mut loaded = regions(1);

        let first = loaded.refresh([Vec3::new(8.0, 64.0, 8.0)]);
        assert_eq!(first.len(), 9);
        assert!(loaded.is_loaded((0, 0)));
        assert!(loaded.is_loaded((-1, -1)));

        let second = loaded.refresh([Vec3::new(8.0, 64.0, 8.0)]);
        assert!(second.is_empty());

        let moved = loaded.refresh([Vec3::new(24.0, 64.0, 8.0)]);
        assert_eq!(moved, vec![(2, -1), (2, 0), (2, 1)]);
        assert!(!loaded.is_loaded((-1, 0)));
        assert_eq!(loaded.len(), 9);
    }

    #[test]
    fn refresh_without_observers_unloads_everything() {
        let mut loaded = regions(0);
        loaded.refresh([Vec3::ZERO]);
        assert_eq!(loaded.len(), 1);
        assert!(loaded.refresh(std::iter::empty()).is_empty());
        assert_eq!(loaded.len(), 0);
    }

    #[test]
    fn bounds_cover_negative_cells() {
        let loaded = regions(0);
        assert_eq!(loaded.cell_of(Vec3::new(-0.5, 0.0, 15.9)), (-1, 0));

        let (min, max) = loaded.bounds((-1, 0));
        assert_eq!(min, Vec3::new(-16.0, -64.0, 0.0));
        assert_eq!(max, Vec3::new(0.0, 2048.0, 16.0));
    }
}
