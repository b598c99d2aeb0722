//! Shortcuts for building scopings.

use dpf_core::{EntityId, Scoping};

use crate::error::ModelResult;
use crate::model::Model;

pub fn nodal_scoping(ids: impl IntoIterator<Item = EntityId>) -> Scoping {
    Scoping::nodal(ids)
}

pub fn elemental_scoping(ids: impl IntoIterator<Item = EntityId>) -> Scoping {
    Scoping::elemental(ids)
}

/// Scoping of a named selection of the model's mesh.
pub fn named_selection_scoping(name: &str, model: &Model) -> ModelResult<Scoping> {
    model.metadata().named_selection(name)
}
