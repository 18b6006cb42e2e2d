use bevy::prelude::Message;

use super::definition::DefinitionId;

/// Admin requests against the population controller, applied on the next hostile tick.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationCommand {
    Spawn(DefinitionId),
    Despawn(DefinitionId),
    /// Re-applies stored stats to live instances after an edit.
    RefreshStats(DefinitionId),
    /// Despawns every instance, then deletes the definition.
    Remove(DefinitionId),
}
