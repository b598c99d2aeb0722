//! Incremental mesh builder.

use dpf_core::{EntityId, Scoping};

use crate::element_type::ElementType;
use crate::error::MeshResult;
use crate::region::{Element, MeshedRegion, NamedSelection, Node, Point3};
use crate::validate;

/// Element as added to the builder: connectivity still by node id.
#[derive(Debug, Clone)]
pub(crate) struct PendingElement {
    pub id: EntityId,
    pub element_type: ElementType,
    pub node_ids: Vec<EntityId>,
    pub material: Option<u32>,
}

/// Builder for constructing a mesh incrementally.
///
/// Use `add_node`, `add_element` and `add_named_selection`, then call
/// `build()` to validate and freeze it into an immutable `MeshedRegion`.
/// Record order is preserved: the n-th node added gets index n.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    unit: String,
    nodes: Vec<Node>,
    elements: Vec<PendingElement>,
    named_selections: Vec<NamedSelection>,
}

impl MeshBuilder {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }

    /// Pre-allocate for a known mesh size.
    pub fn with_capacity(unit: impl Into<String>, n_nodes: usize, n_elements: usize) -> Self {
        Self {
            unit: unit.into(),
            nodes: Vec::with_capacity(n_nodes),
            elements: Vec::with_capacity(n_elements),
            named_selections: Vec::new(),
        }
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, id: EntityId, coordinates: [f64; 3]) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            id,
            index,
            coordinates: Point3::from(coordinates),
        });
        index
    }

    /// Add an element whose connectivity is given by node ids.
    ///
    /// Returns the element's index. Node references are checked in `build()`.
    pub fn add_element(
        &mut self,
        id: EntityId,
        element_type: ElementType,
        node_ids: Vec<EntityId>,
        material: Option<u32>,
    ) -> usize {
        let index = self.elements.len();
        self.elements.push(PendingElement {
            id,
            element_type,
            node_ids,
            material,
        });
        index
    }

    pub fn add_named_selection(&mut self, name: impl Into<String>, scoping: Scoping) {
        self.named_selections.push(NamedSelection {
            name: name.into(),
            scoping,
        });
    }

    /// Validate and freeze the mesh.
    pub fn build(self) -> MeshResult<MeshedRegion> {
        let node_index = validate::node_index(&self.nodes)?;
        let element_index = validate::element_index(&self.elements)?;

        let mut elements = Vec::with_capacity(self.elements.len());
        for (index, pending) in self.elements.into_iter().enumerate() {
            let connectivity = validate::resolve_connectivity(&pending, &node_index)?;
            elements.push(Element {
                id: pending.id,
                index,
                element_type: pending.element_type,
                connectivity,
                material: pending.material,
            });
        }

        let region = MeshedRegion {
            unit: self.unit,
            nodes: self.nodes,
            elements,
            named_selections: self.named_selections,
            node_index,
            element_index,
        };
        validate::named_selections(&region)?;
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshError;
    use dpf_core::Location;

    fn two_hex_builder() -> MeshBuilder {
        let mut b = MeshBuilder::new("m");
        for (i, x) in [0.0, 1.0, 2.0].iter().enumerate() {
            let base = (i as u32) * 4;
            b.add_node(base + 1, [*x, 0.0, 0.0]);
            b.add_node(base + 2, [*x, 1.0, 0.0]);
            b.add_node(base + 3, [*x, 1.0, 1.0]);
            b.add_node(base + 4, [*x, 0.0, 1.0]);
        }
        b.add_element(1, ElementType::Hex8, vec![1, 2, 3, 4, 5, 6, 7, 8], Some(1));
        b.add_element(2, ElementType::Hex8, vec![5, 6, 7, 8, 9, 10, 11, 12], Some(3));
        b
    }

    #[test]
    fn build_resolves_connectivity_to_indices() {
        let mesh = two_hex_builder().build().unwrap();
        assert_eq!(mesh.n_nodes(), 12);
        assert_eq!(mesh.n_elements(), 2);
        let e2 = mesh.element_by_id(2).unwrap();
        assert_eq!(e2.index, 1);
        assert_eq!(e2.connectivity, vec![4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(mesh.element_node_ids(e2), vec![5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(mesh.materials(), vec![1, 3]);
    }

    #[test]
    fn missing_node_is_rejected() {
        let mut b = MeshBuilder::new("m");
        b.add_node(1, [0.0; 3]);
        b.add_element(9, ElementType::Line2, vec![1, 2], None);
        assert_eq!(
            b.build().unwrap_err(),
            MeshError::MissingNode {
                element: 9,
                node: 2
            }
        );
    }

    #[test]
    fn wrong_node_count_is_rejected() {
        let mut b = MeshBuilder::new("m");
        b.add_node(1, [0.0; 3]);
        b.add_node(2, [1.0, 0.0, 0.0]);
        b.add_element(1, ElementType::Tri3, vec![1, 2], None);
        assert!(matches!(
            b.build().unwrap_err(),
            MeshError::NodeCountMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn variable_count_types_accept_any_connectivity() {
        let mut b = MeshBuilder::new("m");
        for id in 1..=5 {
            b.add_node(id, [id as f64, 0.0, 0.0]);
        }
        b.add_element(1, ElementType::Polygon, vec![1, 2, 3, 4, 5], None);
        let mesh = b.build().unwrap();
        assert!(mesh.has_shell_elements());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut b = MeshBuilder::new("m");
        b.add_node(1, [0.0; 3]);
        b.add_node(1, [1.0, 0.0, 0.0]);
        assert_eq!(b.build().unwrap_err(), MeshError::DuplicateNode { id: 1 });

        let mut b = two_hex_builder();
        b.add_element(1, ElementType::Point1, vec![1], None);
        assert_eq!(b.build().unwrap_err(), MeshError::DuplicateElement { id: 1 });
    }

    #[test]
    fn named_selection_must_reference_mesh() {
        let mut b = two_hex_builder();
        b.add_named_selection("LEFT", Scoping::nodal([1, 2, 3, 4]));
        b.add_named_selection("BAD", Scoping::elemental([5]));
        assert_eq!(
            b.build().unwrap_err(),
            MeshError::InvalidNamedSelection {
                name: "BAD".to_string(),
                id: 5
            }
        );
    }

    #[test]
    fn named_selection_lookup() {
        let mut b = two_hex_builder();
        b.add_named_selection("LEFT", Scoping::nodal([1, 2, 3, 4]));
        let mesh = b.build().unwrap();
        assert_eq!(mesh.available_named_selections(), vec!["LEFT"]);
        let ns = mesh.named_selection("LEFT").unwrap();
        assert_eq!(ns.location(), Location::Nodal);
        assert_eq!(ns.len(), 4);
        assert!(matches!(
            mesh.named_selection("RIGHT"),
            Err(MeshError::NamedSelectionNotFound { .. })
        ));
    }
}
