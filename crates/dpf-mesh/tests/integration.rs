//! Integration tests for dpf-mesh.

use dpf_core::{Location, Scoping};
use dpf_mesh::{ElementShape, ElementType, MeshBuilder, MeshError, MeshedRegion};

/// Hex at x in [0, 1], quad shell at x in [1, 2], beam from x=2 to x=3.
fn mixed_mesh() -> MeshedRegion {
    let mut b = MeshBuilder::new("mm");
    let coords = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [2.0, 0.0, 0.0],
        [2.0, 1.0, 0.0],
        [3.0, 0.0, 0.0],
    ];
    for (i, c) in coords.iter().enumerate() {
        b.add_node(i as u32 + 1, *c);
    }
    b.add_element(10, ElementType::Hex8, (1..=8).collect(), Some(1));
    b.add_element(20, ElementType::QuadShell4, vec![2, 9, 10, 3], Some(2));
    b.add_element(30, ElementType::Line2, vec![9, 11], Some(2));
    b.build().unwrap()
}

#[test]
fn shapes_and_report() {
    let mesh = mixed_mesh();
    assert!(mesh.has_solid_elements());
    assert!(mesh.has_shell_elements());
    assert!(mesh.has_beam_elements());
    assert!(!mesh.has_point_elements());

    let report = mesh.to_string();
    assert_eq!(
        report,
        "DPF  Meshed Region: \n  11 nodes \n  3 elements \n  Unit: mm \n  With solid (3D), shell (2D), beam (1D) elements"
    );
}

#[test]
fn element_report_layout() {
    let mesh = mixed_mesh();
    let shell = mesh.element_by_id(20).unwrap();
    assert_eq!(shell.shape(), ElementShape::Shell);
    assert_eq!(
        shell.to_string(),
        "DPF Element 20\n\tIndex:            1\n\tNodes:            4\n\tType:       QuadShell4\n\tShape:        Shell\n"
    );
}

#[test]
fn lookups_fail_cleanly() {
    let mesh = mixed_mesh();
    assert_eq!(
        mesh.element_by_id(99).unwrap_err(),
        MeshError::EntityNotFound {
            location: Location::Elemental,
            id: 99
        }
    );
    assert!(matches!(
        mesh.node_by_index(11),
        Err(MeshError::IndexOutOfRange { len: 11, .. })
    ));
    assert_eq!(mesh.node_by_id(11).unwrap().index, 10);
}

#[test]
fn map_scoping_reports_mask() {
    let mesh = mixed_mesh();
    let (indices, mask) = mesh.map_scoping(&Scoping::elemental([30, 5, 10])).unwrap();
    assert_eq!(indices, vec![2, 0]);
    assert_eq!(mask, vec![true, false, true]);

    let (indices, _) = mesh.map_scoping(&Scoping::nodal([11, 1])).unwrap();
    assert_eq!(indices, vec![10, 0]);

    assert!(mesh
        .map_scoping(&Scoping::new(Location::TimeFreq, [1]))
        .is_err());
}

#[test]
fn node_adjacency_and_bounds() {
    let mesh = mixed_mesh();
    let adjacency = mesh.node_to_elements();
    // node 2 (index 1) is shared by the hex and the shell
    assert_eq!(adjacency[1], vec![0, 1]);
    // node 9 (index 8) is shared by the shell and the beam
    assert_eq!(adjacency[8], vec![1, 2]);
    assert_eq!(adjacency[10], vec![2]);

    let (min, max) = mesh.bounding_box().unwrap();
    assert_eq!([min.x, min.y, min.z], [0.0, 0.0, 0.0]);
    assert_eq!([max.x, max.y, max.z], [3.0, 1.0, 1.0]);
}

#[test]
fn type_counts() {
    let counts = mixed_mesh().element_type_counts();
    assert_eq!(counts[&ElementType::Hex8], 1);
    assert_eq!(counts.get(&ElementType::Tet4), None);
}
