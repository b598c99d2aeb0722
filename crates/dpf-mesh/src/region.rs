//! Meshed region: the frozen, validated spatial support of a model.

use core::fmt;
use std::collections::HashMap;

use dpf_core::{EntityId, Location, Scoping};

use crate::element_type::{ElementShape, ElementType};
use crate::error::{MeshError, MeshResult};
use crate::indexing::IdIndex;

pub type Point3 = nalgebra::Point3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: EntityId,
    /// 0-based position in the mesh.
    pub index: usize,
    pub coordinates: Point3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: EntityId,
    /// 0-based position in the mesh.
    pub index: usize,
    pub element_type: ElementType,
    /// Node indices, in the element's local node order.
    pub connectivity: Vec<usize>,
    pub material: Option<u32>,
}

impl Element {
    pub fn n_nodes(&self) -> usize {
        self.connectivity.len()
    }

    pub fn shape(&self) -> ElementShape {
        self.element_type.shape()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF Element {}", self.id)?;
        writeln!(f, "\tIndex:      {:>7}", self.index)?;
        writeln!(f, "\tNodes:      {:>7}", self.n_nodes())?;
        writeln!(f, "\tType:       {}", self.element_type)?;
        writeln!(f, "\tShape:      {:>7}", self.shape())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSelection {
    pub name: String,
    pub scoping: Scoping,
}

/// Nodes, elements and named selections of one result file.
///
/// Built through [`crate::MeshBuilder`]; every element's connectivity is
/// guaranteed to point at existing nodes.
#[derive(Debug, Clone)]
pub struct MeshedRegion {
    pub(crate) unit: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
    pub(crate) named_selections: Vec<NamedSelection>,
    pub(crate) node_index: IdIndex,
    pub(crate) element_index: IdIndex,
}

impl MeshedRegion {
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node_by_id(&self, id: EntityId) -> MeshResult<&Node> {
        self.node_index
            .index_of(id)
            .map(|i| &self.nodes[i])
            .ok_or(MeshError::EntityNotFound {
                location: Location::Nodal,
                id,
            })
    }

    pub fn node_by_index(&self, index: usize) -> MeshResult<&Node> {
        self.nodes.get(index).ok_or(MeshError::IndexOutOfRange {
            location: Location::Nodal,
            index,
            len: self.nodes.len(),
        })
    }

    pub fn element_by_id(&self, id: EntityId) -> MeshResult<&Element> {
        self.element_index
            .index_of(id)
            .map(|i| &self.elements[i])
            .ok_or(MeshError::EntityNotFound {
                location: Location::Elemental,
                id,
            })
    }

    pub fn element_by_index(&self, index: usize) -> MeshResult<&Element> {
        self.elements.get(index).ok_or(MeshError::IndexOutOfRange {
            location: Location::Elemental,
            index,
            len: self.elements.len(),
        })
    }

    /// Node ids of an element, in local node order.
    pub fn element_node_ids(&self, element: &Element) -> Vec<EntityId> {
        element
            .connectivity
            .iter()
            .map(|&i| self.nodes[i].id)
            .collect()
    }

    pub fn node_index(&self) -> &IdIndex {
        &self.node_index
    }

    pub fn element_index(&self) -> &IdIndex {
        &self.element_index
    }

    /// True when `id` exists on the given location (nodes for `Nodal`,
    /// elements for `Elemental`/`ElementalNodal`).
    pub fn contains(&self, location: Location, id: EntityId) -> bool {
        match location {
            Location::Nodal => self.node_index.contains(id),
            Location::Elemental | Location::ElementalNodal => self.element_index.contains(id),
            Location::TimeFreq => false,
        }
    }

    pub fn nodal_scoping(&self) -> Scoping {
        Scoping::nodal(self.node_index.ids().iter().copied())
    }

    pub fn elemental_scoping(&self) -> Scoping {
        Scoping::elemental(self.element_index.ids().iter().copied())
    }

    pub fn has_shape(&self, shape: ElementShape) -> bool {
        self.elements.iter().any(|e| e.shape() == shape)
    }

    pub fn has_solid_elements(&self) -> bool {
        self.has_shape(ElementShape::Solid)
    }

    pub fn has_shell_elements(&self) -> bool {
        self.has_shape(ElementShape::Shell)
    }

    pub fn has_beam_elements(&self) -> bool {
        self.has_shape(ElementShape::Beam)
    }

    pub fn has_point_elements(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.element_type.descriptor().is_point)
    }

    /// Labels of the element families present, highest dimension first.
    pub fn dimensionality_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.has_solid_elements() {
            labels.push("solid (3D)");
        }
        if self.has_shell_elements() {
            labels.push("shell (2D)");
        }
        if self.has_beam_elements() {
            labels.push("beam (1D)");
        }
        if self.has_point_elements() {
            labels.push("point (0D)");
        }
        labels
    }

    /// Distinct material ids in first-appearance order.
    pub fn materials(&self) -> Vec<u32> {
        let mut seen = Vec::new();
        for material in self.elements.iter().filter_map(|e| e.material) {
            if !seen.contains(&material) {
                seen.push(material);
            }
        }
        seen
    }

    /// Number of elements of each type.
    pub fn element_type_counts(&self) -> HashMap<ElementType, usize> {
        let mut counts = HashMap::new();
        for element in &self.elements {
            *counts.entry(element.element_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn available_named_selections(&self) -> Vec<&str> {
        self.named_selections
            .iter()
            .map(|ns| ns.name.as_str())
            .collect()
    }

    pub fn named_selection(&self, name: &str) -> MeshResult<&Scoping> {
        self.named_selections
            .iter()
            .find(|ns| ns.name == name)
            .map(|ns| &ns.scoping)
            .ok_or_else(|| MeshError::NamedSelectionNotFound {
                name: name.to_string(),
            })
    }

    /// Elements touching each node, indexed by node index.
    pub fn node_to_elements(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for element in &self.elements {
            for &node in &element.connectivity {
                adjacency[node].push(element.index);
            }
        }
        adjacency
    }

    /// Mesh indices of the ids of an external scoping.
    ///
    /// Returns the indices of the ids found in the mesh and a mask with one
    /// entry per scoping id telling whether it was found.
    pub fn map_scoping(&self, scoping: &Scoping) -> MeshResult<(Vec<usize>, Vec<bool>)> {
        let index = match scoping.location() {
            Location::Nodal => &self.node_index,
            Location::Elemental | Location::ElementalNodal => &self.element_index,
            location => return Err(MeshError::UnsupportedLocation { location }),
        };
        let mut indices = Vec::with_capacity(scoping.len());
        let mut mask = Vec::with_capacity(scoping.len());
        for &id in scoping.ids() {
            match index.index_of(id) {
                Some(i) => {
                    indices.push(i);
                    mask.push(true);
                }
                None => mask.push(false),
            }
        }
        Ok((indices, mask))
    }

    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let first = self.nodes.first()?.coordinates;
        let (mut min, mut max) = (first, first);
        for node in &self.nodes[1..] {
            for i in 0..3 {
                min[i] = min[i].min(node.coordinates[i]);
                max[i] = max[i].max(node.coordinates[i]);
            }
        }
        Some((min, max))
    }
}

impl fmt::Display for MeshedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DPF  Meshed Region: ")?;
        writeln!(f, "  {} nodes ", self.n_nodes())?;
        writeln!(f, "  {} elements ", self.n_elements())?;
        writeln!(f, "  Unit: {} ", self.unit)?;
        let labels = self.dimensionality_labels();
        if labels.is_empty() {
            write!(f, "  Without elements")
        } else {
            write!(f, "  With {} elements", labels.join(", "))
        }
    }
}
