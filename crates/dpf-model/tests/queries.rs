use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dpf_core::Location;
use dpf_mesh::MeshedRegion;
use dpf_model::{LocalSource, Model, ModelResult, ResultSource, scoping_factory};
use dpf_results::{EvalRequest, FieldsContainer, MeshSelector, ResultInfo, TimeFreqSupport};

fn mixed() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/results/mixed_transient.yaml")
}

#[test]
fn results_listing() {
    let model = Model::open(mixed()).unwrap();
    let results = model.results();
    assert_eq!(results.len(), 3);
    assert_eq!(
        results.names(),
        vec!["displacement", "structural_temperature", "elemental_volume"]
    );
    let codes: Vec<String> = results.iter().map(|q| q.descriptor().code.clone()).collect();
    assert_eq!(codes, vec!["U", "BFE", "ENG_VOL"]);
    assert_eq!(results.temperature().unwrap().descriptor().code, "BFE");
    assert_eq!(results.stress().unwrap_err().kind(), "ResultNotFound");
    assert_eq!(results.get("bogus").unwrap_err().kind(), "ResultNotFound");
}

#[test]
fn query_building_is_side_effect_free() {
    let model = Model::open(mixed()).unwrap();
    let query = model
        .results()
        .get("displacement")
        .unwrap()
        .on_time_scoping(vec![1usize, 3])
        .on_mesh_scoping(vec![2, 9])
        .on_location(Location::Elemental);
    assert_eq!(model.cached_evaluations(), 0);
    let request = query.request();
    assert_eq!(request.result, "U");
    match &request.mesh {
        MeshSelector::Scoping(s) => {
            assert_eq!(s.location(), Location::Nodal);
            assert_eq!(s.ids(), &[2, 9]);
        }
        other => panic!("unexpected selector {other:?}"),
    }
}

#[test]
fn all_time_freqs() {
    let model = Model::open(mixed()).unwrap();
    let fc = model
        .results()
        .displacement()
        .unwrap()
        .on_all_time_freqs()
        .eval()
        .unwrap();
    assert_eq!(fc.len(), 3);
    assert_eq!(fc.get_label_scoping("time"), Some(vec![1, 2, 3]));
    let last = fc.field_by_time(3).unwrap();
    assert_eq!(last.entity_data_by_id(11).unwrap(), &[12.0, 16.0, 0.0]);
}

#[test]
fn bare_ids_adopt_native_location() {
    let model = Model::open(mixed()).unwrap();
    let fc = model
        .results()
        .get("ENG_VOL")
        .unwrap()
        .on_first_time_freq()
        .on_mesh_scoping(vec![30, 10])
        .eval()
        .unwrap();
    let field = fc.get(0).unwrap();
    assert_eq!(field.location, Location::Elemental);
    assert_eq!(field.ids(), &[30, 10]);
    assert_eq!(field.data(), &[0.25, 1.0]);
}

#[test]
fn averaged_temperature() {
    let model = Model::open(mixed()).unwrap();
    let fc = model
        .results()
        .temperature()
        .unwrap()
        .on_first_time_freq()
        .on_location(Location::Nodal)
        .on_mesh_scoping(scoping_factory::nodal_scoping([2, 9]))
        .eval()
        .unwrap();
    let field = fc.get(0).unwrap();
    assert_eq!(field.data(), &[20.0, 35.0]);

    let fc = model
        .results()
        .temperature()
        .unwrap()
        .on_first_time_freq()
        .on_location(Location::Elemental)
        .on_mesh_scoping(scoping_factory::elemental_scoping([10]))
        .eval()
        .unwrap();
    assert_eq!(fc.get(0).unwrap().data(), &[15.0]);
}

#[test]
fn interpolated_time() {
    let model = Model::open(mixed()).unwrap();
    let fc = model
        .results()
        .displacement()
        .unwrap()
        .on_time_scoping(0.25f64)
        .eval()
        .unwrap();
    let field = fc.field_by_time(1).unwrap();
    assert_eq!(field.time_value, Some(0.25));
    let x = field.entity_data_by_id(9).unwrap()[0];
    assert!((x - 6.0).abs() < 1e-9, "got {x}");
}

#[test]
fn splits() {
    let model = Model::open(mixed()).unwrap();
    let fc = model
        .results()
        .displacement()
        .unwrap()
        .split_by_shape()
        .eval()
        .unwrap();
    assert_eq!(fc.len(), 4);
    assert_eq!(fc.beam_field().unwrap().ids(), &[9, 11]);
    assert_eq!(fc.shell_field().unwrap().ids(), &[2, 3, 9, 10]);

    let fc = model
        .results()
        .get("ENG_VOL")
        .unwrap()
        .on_first_time_freq()
        .split_by_body()
        .eval()
        .unwrap();
    assert_eq!(fc.get_mat_scoping(), Some(vec![1, 2]));
    assert_eq!(fc.field_by_mat_id(2).unwrap().ids(), &[20, 30]);
}

#[test]
fn named_selection_scoping() {
    let model = Model::open(mixed()).unwrap();
    assert_eq!(
        model.metadata().available_named_selections().unwrap(),
        vec!["_SHELL_NODES".to_string(), "_HEX".to_string()]
    );
    let scoping = scoping_factory::named_selection_scoping("_SHELL_NODES", &model).unwrap();
    assert_eq!(scoping.ids(), &[2, 9, 10, 3]);
    let err = scoping_factory::named_selection_scoping("_NONE", &model).unwrap_err();
    assert_eq!(err.kind(), "NamedSelectionNotFound");
}

#[test]
fn invalid_scopings_surface_errors() {
    let model = Model::open(mixed()).unwrap();
    let displacement = model.results().displacement().unwrap();
    let err = displacement
        .clone()
        .on_mesh_scoping(vec![404])
        .eval()
        .unwrap_err();
    assert_eq!(err.kind(), "ScopingNotInMesh");
    let err = displacement.on_time_scoping(7usize).eval().unwrap_err();
    assert_eq!(err.kind(), "InvalidTimeScoping");
}

/// Wraps a local source and counts the calls reaching it.
struct CountingSource {
    inner: LocalSource,
    mesh_calls: AtomicUsize,
    eval_calls: AtomicUsize,
}

impl ResultSource for CountingSource {
    fn source_label(&self) -> String {
        self.inner.source_label()
    }

    fn result_info(&self) -> ModelResult<ResultInfo> {
        self.inner.result_info()
    }

    fn meshed_region(&self) -> ModelResult<MeshedRegion> {
        self.mesh_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.meshed_region()
    }

    fn time_freq_support(&self) -> ModelResult<TimeFreqSupport> {
        self.inner.time_freq_support()
    }

    fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer> {
        self.eval_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(request)
    }
}

#[test]
fn metadata_and_evaluations_are_cached() {
    let source = Arc::new(CountingSource {
        inner: LocalSource::open(mixed()).unwrap(),
        mesh_calls: AtomicUsize::new(0),
        eval_calls: AtomicUsize::new(0),
    });
    let model = Model::with_source(source.clone()).unwrap();
    assert_eq!(source.mesh_calls.load(Ordering::SeqCst), 0);

    model.metadata().meshed_region().unwrap();
    model.metadata().meshed_region().unwrap();
    assert_eq!(source.mesh_calls.load(Ordering::SeqCst), 1);

    let query = model.results().displacement().unwrap().on_all_time_freqs();
    let first = query.eval().unwrap();
    let second = query.eval().unwrap();
    assert_eq!(first, second);
    assert_eq!(source.eval_calls.load(Ordering::SeqCst), 1);
    assert_eq!(model.cached_evaluations(), 1);

    model.results().displacement().unwrap().eval().unwrap();
    assert_eq!(source.eval_calls.load(Ordering::SeqCst), 2);

    model.clear_cache();
    query.eval().unwrap();
    assert_eq!(source.eval_calls.load(Ordering::SeqCst), 3);
}

/// Serves result info but fails to provide the mesh.
struct MeshlessSource {
    inner: LocalSource,
}

impl ResultSource for MeshlessSource {
    fn source_label(&self) -> String {
        "meshless".to_string()
    }

    fn result_info(&self) -> ModelResult<ResultInfo> {
        self.inner.result_info()
    }

    fn meshed_region(&self) -> ModelResult<MeshedRegion> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection dropped").into())
    }

    fn time_freq_support(&self) -> ModelResult<TimeFreqSupport> {
        self.inner.time_freq_support()
    }

    fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer> {
        self.inner.evaluate(request)
    }
}

#[test]
fn display_reports_metadata_failures() {
    let model = Model::with_source(Arc::new(MeshlessSource {
        inner: LocalSource::open(mixed()).unwrap(),
    }))
    .unwrap();
    assert_eq!(model.describe().unwrap_err().kind(), "Io");
    let txt = model.to_string();
    assert!(txt.starts_with("DPF Model (meshless): "), "{txt}");
    assert!(txt.contains("connection dropped"), "{txt}");
}
