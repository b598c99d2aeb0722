//! Mesh validation run by `MeshBuilder::build`.

use std::collections::HashSet;

use dpf_core::Location;

use crate::builder::PendingElement;
use crate::error::{MeshError, MeshResult};
use crate::indexing::IdIndex;
use crate::region::{MeshedRegion, Node};

pub(crate) fn node_index(nodes: &[Node]) -> MeshResult<IdIndex> {
    IdIndex::from_ids(nodes.iter().map(|n| n.id)).map_err(|id| MeshError::DuplicateNode { id })
}

pub(crate) fn element_index(elements: &[PendingElement]) -> MeshResult<IdIndex> {
    IdIndex::from_ids(elements.iter().map(|e| e.id))
        .map_err(|id| MeshError::DuplicateElement { id })
}

/// Check the node count against the element type and map node ids to indices.
pub(crate) fn resolve_connectivity(
    element: &PendingElement,
    nodes: &IdIndex,
) -> MeshResult<Vec<usize>> {
    if let Some(expected) = element.element_type.n_nodes()
        && expected != element.node_ids.len()
    {
        return Err(MeshError::NodeCountMismatch {
            element: element.id,
            expected,
            actual: element.node_ids.len(),
        });
    }

    element
        .node_ids
        .iter()
        .map(|&node| {
            nodes.index_of(node).ok_or(MeshError::MissingNode {
                element: element.id,
                node,
            })
        })
        .collect()
}

pub(crate) fn named_selections(region: &MeshedRegion) -> MeshResult<()> {
    let mut names = HashSet::new();
    for ns in &region.named_selections {
        if !names.insert(ns.name.as_str()) {
            return Err(MeshError::DuplicateNamedSelection {
                name: ns.name.clone(),
            });
        }
        let location = ns.scoping.location();
        if location == Location::TimeFreq {
            return Err(MeshError::UnsupportedLocation { location });
        }
        if let Some(&id) = ns
            .scoping
            .ids()
            .iter()
            .find(|&&id| !region.contains(location, id))
        {
            return Err(MeshError::InvalidNamedSelection {
                name: ns.name.clone(),
                id,
            });
        }
    }
    Ok(())
}
