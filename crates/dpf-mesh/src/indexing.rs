//! Id ↔ index lookup.
//!
//! Result files address entities by id while field data and connectivity
//! are stored by contiguous 0-based index. `IdIndex` provides O(1) lookup
//! both ways.

use std::collections::HashMap;

use dpf_core::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdIndex {
    /// index -> id
    ids: Vec<EntityId>,
    /// id -> index
    by_id: HashMap<EntityId, usize>,
}

impl IdIndex {
    /// Build from ids in record order. Returns the first duplicate id on failure.
    pub fn from_ids(ids: impl IntoIterator<Item = EntityId>) -> Result<Self, EntityId> {
        let ids: Vec<EntityId> = ids.into_iter().collect();
        let mut by_id = HashMap::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            if by_id.insert(id, i).is_some() {
                return Err(id);
            }
        }
        Ok(Self { ids, by_id })
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.ids.get(index).copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
