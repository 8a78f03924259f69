//! Body id registry resource.
//!
//! Maps [`BodyId`]s to their ECS entities and hands out new ids. Ids are
//! monotonically increasing and never reused, even after removal.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::body::BodyId;

#[derive(Resource, Debug, Default)]
pub struct BodyRegistry {
    next_id: u64,
    entities: FxHashMap<BodyId, Entity>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id. Called exactly once per created body.
    pub fn allocate(&mut self) -> BodyId {
        self.next_id += 1;
        BodyId(self.next_id)
    }

    pub fn insert(&mut self, id: BodyId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    /// Detach an id. Returns the entity it pointed to, if any.
    pub fn remove(&mut self, id: BodyId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: BodyId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
