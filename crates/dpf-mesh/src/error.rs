//! Mesh-specific error types.

use dpf_core::{EntityId, Location};

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// Two nodes share the same id.
    #[error("Duplicate node id {id}")]
    DuplicateNode { id: EntityId },

    /// Two elements share the same id.
    #[error("Duplicate element id {id}")]
    DuplicateElement { id: EntityId },

    /// An element references a node id that is not in the mesh.
    #[error("Element {element} refers to non-existent node {node}")]
    MissingNode { element: EntityId, node: EntityId },

    /// An element's connectivity does not match its type's node count.
    #[error("Element {element} has {actual} nodes (expected {expected})")]
    NodeCountMismatch {
        element: EntityId,
        expected: usize,
        actual: usize,
    },

    /// No entity with this id on the given location.
    #[error("{location} entity with id {id} not found in mesh")]
    EntityNotFound { location: Location, id: EntityId },

    /// No entity at this 0-based index.
    #[error("{location} index {index} out of range (mesh has {len})")]
    IndexOutOfRange {
        location: Location,
        index: usize,
        len: usize,
    },

    /// No named selection with this name.
    #[error("Named selection '{name}' not found")]
    NamedSelectionNotFound { name: String },

    /// A named selection refers to an entity that is not in the mesh.
    #[error("Named selection '{name}' refers to non-existent entity {id}")]
    InvalidNamedSelection { name: String, id: EntityId },

    /// Two named selections share the same name.
    #[error("Duplicate named selection '{name}'")]
    DuplicateNamedSelection { name: String },

    /// A scoping location the mesh cannot map.
    #[error("Location {location} cannot be mapped onto a mesh")]
    UnsupportedLocation { location: Location },

    /// Unrecognised element type name.
    #[error("Unknown element type '{name}'")]
    UnknownElementType { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = MeshError::EntityNotFound {
            location: Location::Elemental,
            id: 5000,
        };
        assert_eq!(err.to_string(), "Elemental entity with id 5000 not found in mesh");
        let boxed: Box<dyn std::error::Error> = Box::new(MeshError::MissingNode {
            element: 3,
            node: 9,
        });
        assert_eq!(boxed.to_string(), "Element 3 refers to non-existent node 9");
    }
}
