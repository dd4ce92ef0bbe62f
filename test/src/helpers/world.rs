use std::collections::HashMap;

use tether_session::{AdapterError, EntityHandle, IdentityAdapter, WorldAdapter};
use tether_shared::{ObjectChangeEvent, ObjectId, TilePos};

/// Visibility and placement of one scripted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    pub visible: bool,
    pub tile: TilePos,
    pub rotation: i32,
}

/// Scripted world adapter: a fixed entity roster plus a recording of every
/// call the synchronization core makes against it.
#[derive(Default)]
pub struct TestWorld {
    /// What `current_state_blob` hands out; `None` simulates a world that is
    /// not loaded yet.
    pub state_blob: Option<Vec<u8>>,
    pub loaded_blobs: Vec<Vec<u8>>,
    pub entities: HashMap<ObjectId, EntityState>,
    /// Every event passed through `update_entity`, in arrival order.
    pub updates: Vec<ObjectChangeEvent>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible entity at the origin.
    pub fn spawn(&mut self, id: ObjectId) {
        self.entities.insert(
            id,
            EntityState {
                visible: true,
                tile: TilePos::default(),
                rotation: 0,
            },
        );
    }

    /// Panics when the entity was never spawned; tests only look at entities
    /// they created.
    pub fn entity(&self, id: ObjectId) -> &EntityState {
        &self.entities[&id]
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> Result<&mut EntityState, AdapterError> {
        self.entities
            .get_mut(&(handle.0 as ObjectId))
            .ok_or_else(|| AdapterError::new("stale entity handle"))
    }
}

impl WorldAdapter for TestWorld {
    fn current_state_blob(&mut self) -> Option<Vec<u8>> {
        self.state_blob.clone()
    }

    fn load_state_blob(&mut self, blob: &[u8]) -> Result<(), AdapterError> {
        self.loaded_blobs.push(blob.to_vec());
        Ok(())
    }

    fn find_entity(&mut self, id: ObjectId) -> Option<EntityHandle> {
        self.entities
            .contains_key(&id)
            .then_some(EntityHandle(id as u64))
    }

    fn set_entity_visible(
        &mut self,
        entity: EntityHandle,
        visible: bool,
    ) -> Result<(), AdapterError> {
        self.entity_mut(entity)?.visible = visible;
        Ok(())
    }

    fn set_entity_position(
        &mut self,
        entity: EntityHandle,
        tile: TilePos,
        rotation: i32,
    ) -> Result<(), AdapterError> {
        let state = self.entity_mut(entity)?;
        state.tile = tile;
        state.rotation = rotation;
        Ok(())
    }

    fn update_entity(
        &mut self,
        entity: EntityHandle,
        event: &ObjectChangeEvent,
    ) -> Result<(), AdapterError> {
        self.entity_mut(entity)?;
        self.updates.push(event.clone());
        Ok(())
    }
}

/// Identity adapter with a fixed display name.
pub struct FixedIdentity(pub String);

impl FixedIdentity {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl IdentityAdapter for FixedIdentity {
    fn local_display_name(&self) -> String {
        self.0.clone()
    }
}
