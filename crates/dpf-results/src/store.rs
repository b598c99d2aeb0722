//! Result data as read from a result file, before any evaluation.

use std::collections::{BTreeMap, HashMap};

use dpf_core::{EntityId, Location, Real};
use dpf_mesh::MeshedRegion;
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// Raw values of one result at one set.
///
/// `data` holds one block per id. Nodal and elemental blocks are
/// `components` long; elemental-nodal blocks are `components` times the
/// element's node count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSet {
    pub ids: Vec<EntityId>,
    pub data: Vec<Real>,
}

impl StoredSet {
    pub fn new(ids: Vec<EntityId>, data: Vec<Real>) -> Self {
        Self { ids, data }
    }

    /// Expected number of values for `id`.
    pub fn block_len(
        mesh: &MeshedRegion,
        location: Location,
        components: usize,
        id: EntityId,
    ) -> ResultsResult<usize> {
        match location {
            Location::Nodal | Location::Elemental => Ok(components),
            Location::ElementalNodal => Ok(mesh.element_by_id(id)?.n_nodes() * components),
            Location::TimeFreq => Err(ResultsError::InvalidData {
                what: "result data cannot be stored on time/frequency sets".to_string(),
            }),
        }
    }

    /// Split the flat data into per-entity blocks.
    pub fn blocks<'a>(
        &'a self,
        mesh: &MeshedRegion,
        location: Location,
        components: usize,
    ) -> ResultsResult<HashMap<EntityId, &'a [Real]>> {
        let mut blocks = HashMap::with_capacity(self.ids.len());
        let mut offset = 0;
        for &id in &self.ids {
            let len = Self::block_len(mesh, location, components, id)?;
            let end = offset + len;
            let block = self
                .data
                .get(offset..end)
                .ok_or_else(|| ResultsError::InvalidData {
                    what: format!(
                        "{} values stored for {} ids, entity {id} needs values {offset}..{end}",
                        self.data.len(),
                        self.ids.len()
                    ),
                })?;
            blocks.insert(id, block);
            offset = end;
        }
        if offset != self.data.len() {
            return Err(ResultsError::InvalidData {
                what: format!(
                    "{} values stored but {} expected for {} ids",
                    self.data.len(),
                    offset,
                    self.ids.len()
                ),
            });
        }
        Ok(blocks)
    }
}

/// All stored result data of a file, per result code and cumulative set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStore {
    sets: HashMap<String, BTreeMap<usize, StoredSet>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, set: usize, data: StoredSet) {
        self.sets.entry(code.into()).or_default().insert(set, data);
    }

    pub fn get(&self, code: &str, set: usize) -> Option<&StoredSet> {
        self.sets.get(code).and_then(|sets| sets.get(&set))
    }

    /// Cumulative indices holding data for `code`, ascending.
    pub fn sets_for(&self, code: &str) -> Vec<usize> {
        self.sets
            .get(code)
            .map(|sets| sets.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.sets.keys().map(String::as_str)
    }
}
