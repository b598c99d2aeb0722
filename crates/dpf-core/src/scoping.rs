//! Ordered sets of entity ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Location;

/// Node or element identifier as written in a result file.
pub type EntityId = u32;

/// Ordered list of entity ids on a given location.
///
/// Order is meaningful: evaluated fields follow the order of the scoping
/// they were requested on. Duplicate ids are dropped on construction,
/// keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScopingRepr")]
pub struct Scoping {
    location: Location,
    ids: Vec<EntityId>,
}

/// Wire form of a [`Scoping`]; deserialization goes through [`Scoping::new`].
#[derive(Deserialize)]
struct ScopingRepr {
    location: Location,
    ids: Vec<EntityId>,
}

impl From<ScopingRepr> for Scoping {
    fn from(repr: ScopingRepr) -> Self {
        Scoping::new(repr.location, repr.ids)
    }
}

impl Scoping {
    pub fn new(location: Location, ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { location, ids }
    }

    pub fn nodal(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::new(Location::Nodal, ids)
    }

    pub fn elemental(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::new(Location::Elemental, ids)
    }

    pub fn location(&self) -> Location {
        self.location
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

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    /// Map from id to its position in this scoping.
    pub fn index_map(&self) -> HashMap<EntityId, usize> {
        self.ids.iter().enumerate().map(|(i, &id)| (id, i)).collect()
    }
}
