//! Conversion between the file schema and the in-memory model types.

use dpf_core::Scoping;
use dpf_mesh::{ElementType, MeshBuilder, MeshedRegion};
use dpf_results::{
    AnalysisType, ResultDescriptor, ResultInfo, ResultStore, StoredSet, TimeFreqSupport,
};

use crate::FileResult;
use crate::schema::{
    AnalysisDef, ElementDef, MeshDef, NamedSelectionDef, NodeDef, ResultDef, ResultFile,
};

/// Everything a loaded result file provides.
#[derive(Debug, Clone)]
pub struct ResultParts {
    pub info: ResultInfo,
    pub mesh: MeshedRegion,
    pub time_freq_support: TimeFreqSupport,
    pub store: ResultStore,
}

impl ResultFile {
    pub fn result_info(&self) -> ResultInfo {
        result_info(&self.analysis, &self.results)
    }

    pub fn time_freq_support(&self) -> TimeFreqSupport {
        let domain = AnalysisType::from(self.analysis.analysis_type.clone()).time_domain();
        TimeFreqSupport::new(
            domain,
            self.time_freq_support
                .steps
                .iter()
                .map(|s| (s.time, s.load_step, s.substep)),
        )
    }

    pub fn into_parts(self) -> FileResult<ResultParts> {
        let info = self.result_info();
        let time_freq_support = self.time_freq_support();
        let mesh = self.mesh.to_region()?;

        let mut store = ResultStore::new();
        for result in self.results {
            for set in result.sets {
                store.insert(result.code.clone(), set.set, StoredSet::new(set.ids, set.data));
            }
        }

        Ok(ResultParts {
            info,
            mesh,
            time_freq_support,
            store,
        })
    }
}

fn result_info(analysis: &AnalysisDef, results: &[ResultDef]) -> ResultInfo {
    ResultInfo {
        analysis_type: AnalysisType::from(analysis.analysis_type.clone()),
        physics_type: analysis.physics_type.clone(),
        unit_system: analysis.unit_system.clone(),
        solver: analysis.solver.clone(),
        job_name: analysis.job_name.clone(),
        results: results
            .iter()
            .map(|r| ResultDescriptor {
                code: r.code.clone(),
                name: r.name.clone(),
                display_name: r.display_name.clone(),
                description: r.description.clone(),
                location: r.location,
                components: r.components,
                unit: r.unit.clone(),
            })
            .collect(),
    }
}

impl MeshDef {
    /// Build and validate the in-memory region.
    pub fn to_region(&self) -> FileResult<MeshedRegion> {
        let mut builder =
            MeshBuilder::with_capacity(self.unit.clone(), self.nodes.len(), self.elements.len());
        for node in &self.nodes {
            builder.add_node(node.id, node.coordinates);
        }
        for element in &self.elements {
            let element_type: ElementType = element.element_type.parse()?;
            builder.add_element(
                element.id,
                element_type,
                element.connectivity.clone(),
                element.material,
            );
        }
        for selection in &self.named_selections {
            builder.add_named_selection(
                selection.name.clone(),
                Scoping::new(selection.location, selection.ids.iter().copied()),
            );
        }
        Ok(builder.build()?)
    }

    pub fn from_region(region: &MeshedRegion) -> Self {
        let nodes = region
            .nodes()
            .iter()
            .map(|n| NodeDef {
                id: n.id,
                coordinates: [n.coordinates.x, n.coordinates.y, n.coordinates.z],
            })
            .collect();
        let elements = region
            .elements()
            .iter()
            .map(|e| ElementDef {
                id: e.id,
                element_type: e.element_type.to_string(),
                connectivity: region.element_node_ids(e),
                material: e.material,
            })
            .collect();
        let named_selections = region
            .available_named_selections()
            .into_iter()
            .filter_map(|name| {
                let scoping = region.named_selection(name).ok()?;
                Some(NamedSelectionDef {
                    name: name.to_string(),
                    location: scoping.location(),
                    ids: scoping.ids().to_vec(),
                })
            })
            .collect();
        Self {
            unit: region.unit().to_string(),
            nodes,
            elements,
            named_selections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpf_core::Location;

    fn mesh_def() -> MeshDef {
        MeshDef {
            unit: "mm".to_string(),
            nodes: (1..=4)
                .map(|id| NodeDef {
                    id,
                    coordinates: [id as f64, 0.0, 0.0],
                })
                .collect(),
            elements: vec![
                ElementDef {
                    id: 5,
                    element_type: "Line2".to_string(),
                    connectivity: vec![1, 2],
                    material: Some(3),
                },
                ElementDef {
                    id: 6,
                    element_type: "tri3".to_string(),
                    connectivity: vec![2, 3, 4],
                    material: None,
                },
            ],
            named_selections: vec![NamedSelectionDef {
                name: "_TIP".to_string(),
                location: Location::Nodal,
                ids: vec![4],
            }],
        }
    }

    #[test]
    fn region_round_trip() {
        let def = mesh_def();
        let region = def.to_region().unwrap();
        assert_eq!(region.n_nodes(), 4);
        assert_eq!(region.element_by_id(6).unwrap().element_type, ElementType::Tri3);

        let back = MeshDef::from_region(&region);
        assert_eq!(back.elements[1].element_type, "Tri3");
        assert_eq!(back.elements[0].connectivity, vec![1, 2]);
        assert_eq!(back.named_selections, def.named_selections);
        assert_eq!(back.to_region().unwrap().n_elements(), 2);
    }

    #[test]
    fn unknown_type_is_a_mesh_error() {
        let mut def = mesh_def();
        def.elements[0].element_type = "Brick".to_string();
        assert!(matches!(def.to_region(), Err(crate::FileError::Mesh(_))));
    }
}
