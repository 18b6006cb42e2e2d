//! Hostile module keeps admin-defined hostile populations alive in the world.
pub mod assailant;
pub mod config;
pub mod definition;
pub mod errors;
pub mod events;
pub mod hybrid;
pub mod plugin;
pub mod reconcile;
pub mod region;
pub mod storage;
pub mod store;
pub mod strategy;
pub mod systems;
pub mod tags;
pub mod tracker;

pub use plugin::HostilePlugin;
