//! Adapter seams between the synchronization core and the surrounding
//! application.
//!
//! The core never touches the application's object model directly; it goes
//! through [`WorldAdapter`] handles provided at startup. Adapter failures
//! are per-operation: the core logs them, skips the operation, and keeps the
//! session alive.

use std::fmt;

use tether_shared::{ObjectChangeEvent, ObjectId, TilePos};

/// Opaque reference to one entity inside the application's world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u64);

/// A world adapter call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterError {
    pub reason: String,
}

impl AdapterError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for AdapterError {}

/// The application's view of its own world, as consumed by the
/// synchronization core.
pub trait WorldAdapter {
    /// Serializes the complete current world state, or `None` when no world
    /// is loaded yet.
    fn current_state_blob(&mut self) -> Option<Vec<u8>>;

    /// Replaces the local world with a received snapshot blob.
    fn load_state_blob(&mut self, blob: &[u8]) -> Result<(), AdapterError>;

    fn find_entity(&mut self, id: ObjectId) -> Option<EntityHandle>;

    fn set_entity_visible(&mut self, entity: EntityHandle, visible: bool)
        -> Result<(), AdapterError>;

    fn set_entity_position(
        &mut self,
        entity: EntityHandle,
        tile: TilePos,
        rotation: i32,
    ) -> Result<(), AdapterError>;

    /// Generic update for Moved/StateChanged events; granularity is up to
    /// the application.
    fn update_entity(
        &mut self,
        entity: EntityHandle,
        event: &ObjectChangeEvent,
    ) -> Result<(), AdapterError>;
}

/// Where the session learns who the local player is.
pub trait IdentityAdapter {
    /// Display name announced to the other participants. Implementations
    /// fall back to any stable local string when no profile is available.
    fn local_display_name(&self) -> String;
}
