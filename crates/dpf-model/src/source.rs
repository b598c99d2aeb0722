//! Where a model's data comes from.

use std::path::{Path, PathBuf};

use dpf_file::ResultParts;
use dpf_mesh::MeshedRegion;
use dpf_results::{EvalRequest, FieldsContainer, ResultInfo, TimeFreqSupport};
use tracing::info;

use crate::error::{ModelError, ModelResult};

/// Provider of metadata and evaluated results for one opened result file.
///
/// Implemented locally by [`LocalSource`] and by remote connections.
pub trait ResultSource: Send + Sync {
    /// Identity of the opened file, used to key evaluation caches.
    fn source_label(&self) -> String;

    fn result_info(&self) -> ModelResult<ResultInfo>;

    fn meshed_region(&self) -> ModelResult<MeshedRegion>;

    fn time_freq_support(&self) -> ModelResult<TimeFreqSupport>;

    fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer>;
}

/// A result file loaded into this process.
#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
    parts: ResultParts,
}

impl LocalSource {
    /// Load a result file; relative paths resolve against the current directory.
    pub fn open(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        if !path.exists() {
            return Err(ModelError::FileNotFound { path });
        }
        let parts = dpf_file::open(&path)?;
        info!(path = %path.display(), "loaded result file");
        Ok(Self { path, parts })
    }

    /// Wrap already loaded data under a given path.
    pub fn from_parts(path: impl Into<PathBuf>, parts: ResultParts) -> Self {
        Self {
            path: path.into(),
            parts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parts(&self) -> &ResultParts {
        &self.parts
    }
}

impl ResultSource for LocalSource {
    fn source_label(&self) -> String {
        self.path.display().to_string()
    }

    fn result_info(&self) -> ModelResult<ResultInfo> {
        Ok(self.parts.info.clone())
    }

    fn meshed_region(&self) -> ModelResult<MeshedRegion> {
        Ok(self.parts.mesh.clone())
    }

    fn time_freq_support(&self) -> ModelResult<TimeFreqSupport> {
        Ok(self.parts.time_freq_support.clone())
    }

    fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer> {
        let parts = &self.parts;
        Ok(dpf_results::evaluate(
            &parts.store,
            &parts.mesh,
            &parts.info,
            &parts.time_freq_support,
            request,
        )?)
    }
}
