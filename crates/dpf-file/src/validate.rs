//! Result file validation logic.

use std::collections::{HashMap, HashSet};

use dpf_core::{EntityId, Location};
use dpf_mesh::ElementType;

use crate::schema::{MeshDef, ResultDef, ResultFile};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_result_file(file: &ResultFile) -> Result<(), ValidationError> {
    if file.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mesh_ids = validate_mesh(&file.mesh)?;

    let support = &file.time_freq_support;
    if support.times.is_some() {
        return Err(ValidationError::InvalidValue {
            field: "time_freq_support.times".to_string(),
            value: "present".to_string(),
            reason: "bare time lists are only allowed in version 1 files".to_string(),
        });
    }
    for (i, step) in support.steps.iter().enumerate() {
        if !step.time.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("time_freq_support.steps[{i}].time"),
                value: step.time.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    let mut codes = HashSet::new();
    let mut names = HashSet::new();
    for result in &file.results {
        if !codes.insert(result.code.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: result.code.clone(),
                context: "result codes".to_string(),
            });
        }
        if !names.insert(result.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: result.name.clone(),
                context: "result names".to_string(),
            });
        }
        validate_result(result, support.steps.len(), &mesh_ids)?;
    }

    Ok(())
}

/// Ids of a validated mesh.
struct MeshIds {
    nodes: HashSet<EntityId>,
    /// Node count of every element.
    element_nodes: HashMap<EntityId, usize>,
}

fn validate_mesh(mesh: &MeshDef) -> Result<MeshIds, ValidationError> {
    let mut node_ids = HashSet::new();
    for node in &mesh.nodes {
        if !node_ids.insert(node.id) {
            return Err(ValidationError::DuplicateId {
                id: node.id.to_string(),
                context: "mesh nodes".to_string(),
            });
        }
        if node.coordinates.iter().any(|c| !c.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: format!("node {} coordinates", node.id),
                value: format!("{:?}", node.coordinates),
                reason: "must be finite".to_string(),
            });
        }
    }

    let mut element_nodes = HashMap::new();
    for element in &mesh.elements {
        let element_type: ElementType =
            element
                .element_type
                .parse()
                .map_err(|_| ValidationError::InvalidValue {
                    field: format!("element {} type", element.id),
                    value: element.element_type.clone(),
                    reason: "unknown element type".to_string(),
                })?;
        if let Some(expected) = element_type.n_nodes()
            && expected != element.connectivity.len()
        {
            return Err(ValidationError::InvalidValue {
                field: format!("element {} connectivity", element.id),
                value: element.connectivity.len().to_string(),
                reason: format!("{element_type} expects {expected} nodes"),
            });
        }
        for node in &element.connectivity {
            if !node_ids.contains(node) {
                return Err(ValidationError::MissingReference {
                    id: node.to_string(),
                    context: format!("element {} connectivity", element.id),
                });
            }
        }
        if element_nodes
            .insert(element.id, element.connectivity.len())
            .is_some()
        {
            return Err(ValidationError::DuplicateId {
                id: element.id.to_string(),
                context: "mesh elements".to_string(),
            });
        }
    }

    let mut selection_names = HashSet::new();
    for selection in &mesh.named_selections {
        if !selection_names.insert(selection.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: selection.name.clone(),
                context: "named selections".to_string(),
            });
        }
        let exists = |id: &EntityId| match selection.location {
            Location::Nodal => node_ids.contains(id),
            Location::Elemental | Location::ElementalNodal => element_nodes.contains_key(id),
            Location::TimeFreq => false,
        };
        if let Some(id) = selection.ids.iter().find(|id| !exists(*id)) {
            return Err(ValidationError::MissingReference {
                id: id.to_string(),
                context: format!("named selection {}", selection.name),
            });
        }
    }

    Ok(MeshIds {
        nodes: node_ids,
        element_nodes,
    })
}

fn validate_result(
    result: &ResultDef,
    n_sets: usize,
    mesh_ids: &MeshIds,
) -> Result<(), ValidationError> {
    if result.location == Location::TimeFreq {
        return Err(ValidationError::InvalidValue {
            field: format!("result {} location", result.code),
            value: result.location.to_string(),
            reason: "results are stored on nodes or elements".to_string(),
        });
    }

    let mut seen_sets = HashSet::new();
    for set in &result.sets {
        if set.set == 0 || set.set > n_sets {
            return Err(ValidationError::MissingReference {
                id: set.set.to_string(),
                context: format!("result {} sets (the file has {n_sets})", result.code),
            });
        }
        if !seen_sets.insert(set.set) {
            return Err(ValidationError::DuplicateId {
                id: set.set.to_string(),
                context: format!("result {} sets", result.code),
            });
        }

        let mut expected = 0;
        let mut seen_ids = HashSet::new();
        for id in &set.ids {
            let n_nodes = match result.location {
                Location::Nodal => mesh_ids.nodes.contains(id).then_some(1),
                _ => mesh_ids.element_nodes.get(id).copied(),
            };
            let n_nodes = n_nodes.ok_or_else(|| ValidationError::MissingReference {
                id: id.to_string(),
                context: format!("result {} set {}", result.code, set.set),
            })?;
            if !seen_ids.insert(*id) {
                return Err(ValidationError::DuplicateId {
                    id: id.to_string(),
                    context: format!("result {} set {}", result.code, set.set),
                });
            }
            expected += match result.location {
                Location::ElementalNodal => n_nodes * result.components,
                _ => result.components,
            };
        }
        if expected != set.data.len() {
            return Err(ValidationError::InvalidValue {
                field: format!("result {} set {} data", result.code, set.set),
                value: set.data.len().to_string(),
                reason: format!("{} ids need {expected} values", set.ids.len()),
            });
        }
        if let Some(v) = set.data.iter().find(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: format!("result {} set {} data", result.code, set.set),
                value: v.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn file() -> ResultFile {
        ResultFile {
            version: 2,
            analysis: AnalysisDef {
                analysis_type: "static".to_string(),
                physics_type: "mecanic".to_string(),
                unit_system: "MKS".to_string(),
                solver: None,
                job_name: None,
            },
            mesh: MeshDef {
                unit: "m".to_string(),
                nodes: vec![
                    NodeDef {
                        id: 1,
                        coordinates: [0.0, 0.0, 0.0],
                    },
                    NodeDef {
                        id: 2,
                        coordinates: [1.0, 0.0, 0.0],
                    },
                ],
                elements: vec![ElementDef {
                    id: 7,
                    element_type: "Line2".to_string(),
                    connectivity: vec![1, 2],
                    material: None,
                }],
                named_selections: vec![],
            },
            time_freq_support: TimeFreqSupportDef {
                steps: vec![StepDef {
                    time: 1.0,
                    load_step: 1,
                    substep: 1,
                }],
                times: None,
            },
            results: vec![ResultDef {
                code: "BFE".to_string(),
                name: "structural_temperature".to_string(),
                display_name: "Temperature".to_string(),
                description: String::new(),
                location: Location::ElementalNodal,
                components: 1,
                unit: "degC".to_string(),
                sets: vec![SetDef {
                    set: 1,
                    ids: vec![7],
                    data: vec![20.0, 21.0],
                }],
            }],
        }
    }

    #[test]
    fn valid_file_passes() {
        validate_result_file(&file()).unwrap();
    }

    #[test]
    fn duplicate_node() {
        let mut f = file();
        f.mesh.nodes[1].id = 1;
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn connectivity_must_match_type() {
        let mut f = file();
        f.mesh.elements[0].element_type = "Hex8".to_string();
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::InvalidValue { .. })
        ));
        f.mesh.elements[0].element_type = "Brick".to_string();
        assert!(validate_result_file(&f).is_err());
    }

    #[test]
    fn connectivity_must_reference_nodes() {
        let mut f = file();
        f.mesh.elements[0].connectivity = vec![1, 3];
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn set_must_exist() {
        let mut f = file();
        f.results[0].sets[0].set = 2;
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn elemental_nodal_data_length() {
        let mut f = file();
        f.results[0].sets[0].data.push(22.0);
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn non_finite_data() {
        let mut f = file();
        f.results[0].sets[0].data[0] = f64::NAN;
        assert!(validate_result_file(&f).is_err());
    }

    #[test]
    fn named_selection_ids_exist() {
        let mut f = file();
        f.mesh.named_selections.push(NamedSelectionDef {
            name: "_ENDS".to_string(),
            location: Location::Nodal,
            ids: vec![1, 5],
        });
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn result_ids_exist() {
        let mut f = file();
        f.results[0].sets[0].ids = vec![8];
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { ref id, .. }) if id == "8"
        ));

        let mut f = file();
        f.results[0].location = Location::Nodal;
        f.results[0].sets[0].ids = vec![1, 3];
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { ref id, .. }) if id == "3"
        ));

        let mut f = file();
        f.results[0].location = Location::Elemental;
        f.results[0].sets[0].ids = vec![1];
        f.results[0].sets[0].data = vec![20.0];
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::MissingReference { ref id, .. }) if id == "1"
        ));
    }

    #[test]
    fn duplicate_result_id() {
        let mut f = file();
        f.results[0].location = Location::Nodal;
        f.results[0].sets[0].ids = vec![2, 1, 2];
        f.results[0].sets[0].data = vec![20.0, 21.0, 22.0];
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::DuplicateId { ref id, .. }) if id == "2"
        ));

        f.results[0].sets[0].ids = vec![2, 1];
        f.results[0].sets[0].data = vec![20.0, 21.0];
        validate_result_file(&f).unwrap();
    }

    #[test]
    fn duplicate_result_code() {
        let mut f = file();
        let mut copy = f.results[0].clone();
        copy.name = "other".to_string();
        f.results.push(copy);
        assert!(matches!(
            validate_result_file(&f),
            Err(ValidationError::DuplicateId { .. })
        ));
    }
}
