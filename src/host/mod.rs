//! Host module models the live world hostile actors are spawned into.
pub mod api;
pub mod catalog;
pub mod components;
pub mod ecs;
pub mod events;
pub mod metadata;
pub mod plugin;
pub mod regions;
pub mod systems;

pub use api::{ActorFlag, ActorHost, ActorId, Attribute, Facing};
pub use ecs::EcsHost;
pub use plugin::{HostObserveSet, HostPlugin};
