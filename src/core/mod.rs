//! Core module exposes the fixed tick clock shared by every simulation plugin.
pub mod plugin;

pub use plugin::{CorePlugin, SimulationTick};
