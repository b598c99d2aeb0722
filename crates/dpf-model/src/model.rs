//! The model handle and its metadata.

use core::fmt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use dpf_core::Scoping;
use dpf_mesh::MeshedRegion;
use dpf_results::{AnalysisType, EvalRequest, FieldsContainer, ResultInfo, TimeFreqSupport, fingerprint};
use tracing::debug;

use crate::error::ModelResult;
use crate::results::Results;
use crate::source::{LocalSource, ResultSource};

const SEPARATOR_WIDTH: usize = 30;

/// Read-only descriptive information about a model.
///
/// The result info is fetched when the model is opened; the mesh and the
/// time/frequency support are fetched on first use and kept.
pub struct Metadata {
    source: Arc<dyn ResultSource>,
    result_info: ResultInfo,
    meshed_region: OnceLock<MeshedRegion>,
    time_freq_support: OnceLock<TimeFreqSupport>,
}

impl Metadata {
    fn new(source: Arc<dyn ResultSource>) -> ModelResult<Self> {
        let result_info = source.result_info()?;
        Ok(Self {
            source,
            result_info,
            meshed_region: OnceLock::new(),
            time_freq_support: OnceLock::new(),
        })
    }

    pub fn result_info(&self) -> &ResultInfo {
        &self.result_info
    }

    pub fn analysis_type(&self) -> &AnalysisType {
        &self.result_info.analysis_type
    }

    pub fn meshed_region(&self) -> ModelResult<&MeshedRegion> {
        if let Some(mesh) = self.meshed_region.get() {
            return Ok(mesh);
        }
        let mesh = self.source.meshed_region()?;
        debug!(nodes = mesh.n_nodes(), elements = mesh.n_elements(), "mesh fetched");
        Ok(self.meshed_region.get_or_init(|| mesh))
    }

    pub fn time_freq_support(&self) -> ModelResult<&TimeFreqSupport> {
        if let Some(support) = self.time_freq_support.get() {
            return Ok(support);
        }
        let support = self.source.time_freq_support()?;
        Ok(self.time_freq_support.get_or_init(|| support))
    }

    pub fn available_named_selections(&self) -> ModelResult<Vec<String>> {
        Ok(self
            .meshed_region()?
            .available_named_selections()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub fn named_selection(&self, name: &str) -> ModelResult<Scoping> {
        Ok(self.meshed_region()?.named_selection(name)?.clone())
    }
}

/// Handle to one opened result file.
pub struct Model {
    source: Arc<dyn ResultSource>,
    metadata: Metadata,
    cache: Mutex<HashMap<String, FieldsContainer>>,
}

impl Model {
    /// Open a result file in this process.
    pub fn open(path: impl AsRef<Path>) -> ModelResult<Self> {
        Self::with_source(Arc::new(LocalSource::open(path)?))
    }

    pub fn with_source(source: Arc<dyn ResultSource>) -> ModelResult<Self> {
        let metadata = Metadata::new(source.clone())?;
        Ok(Self {
            source,
            metadata,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn results(&self) -> Results<'_> {
        Results::new(self)
    }

    pub fn source_label(&self) -> String {
        self.source.source_label()
    }

    /// Evaluate a request, reusing the result of an identical earlier request.
    pub fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer> {
        let key = fingerprint(&self.source.source_label(), request);
        if let Some(hit) = self.lock_cache().get(&key) {
            debug!(result = %request.result, "evaluation cache hit");
            return Ok(hit.clone());
        }
        let container = self.source.evaluate(request)?;
        self.lock_cache().insert(key, container.clone());
        Ok(container)
    }

    pub fn cached_evaluations(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, FieldsContainer>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Human-readable summary of the model: result info, mesh and time axis.
    pub fn describe(&self) -> ModelResult<String> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let mut txt = String::from("DPF Model\n");
        txt.push_str(&separator);
        txt.push('\n');
        txt.push_str(&self.metadata.result_info().to_string());
        txt.push_str(&separator);
        txt.push('\n');
        txt.push_str(&self.metadata.meshed_region()?.to_string());
        txt.push('\n');
        txt.push_str(&separator);
        txt.push('\n');
        txt.push_str(&self.metadata.time_freq_support()?.to_string());
        Ok(txt)
    }
}

/// The [`Model::describe`] report, or a one-line error when the source
/// cannot provide the metadata.
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Ok(txt) => f.write_str(&txt),
            Err(err) => write!(f, "DPF Model ({}): {err}", self.source_label()),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("source", &self.source.source_label())
            .field("analysis_type", self.metadata.analysis_type())
            .finish()
    }
}
