//! dpf-file: on-disk result file format, migration and validation.

pub mod convert;
pub mod migrate;
pub mod schema;
pub mod validate;

pub use convert::ResultParts;
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_result_file};

use std::path::{Path, PathBuf};

use dpf_mesh::MeshError;
use dpf_results::ResultsError;
use tracing::debug;

pub type FileResult<T> = Result<T, FileError>;

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("Result file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unsupported result file format: {} (expected .json, .yaml or .yml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Unsupported result file version: {version} (latest is {latest})", latest = LATEST_VERSION)]
    UnsupportedVersion { version: u32 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> FileResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            _ => Err(FileError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parse, migrate and validate a result file, picking the format from the extension.
pub fn load(path: &Path) -> FileResult<ResultFile> {
    let format = Format::from_path(path)?;
    if !path.exists() {
        return Err(FileError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match format {
        Format::Json => load_json(path),
        Format::Yaml => load_yaml(path),
    }
}

/// Load a result file and convert it into in-memory parts.
pub fn open(path: &Path) -> FileResult<ResultParts> {
    let file = load(path)?;
    let parts = file.into_parts()?;
    debug!(
        path = %path.display(),
        nodes = parts.mesh.n_nodes(),
        elements = parts.mesh.n_elements(),
        sets = parts.time_freq_support.n_sets(),
        "opened result file"
    );
    Ok(parts)
}

pub fn save(path: &Path, file: &ResultFile) -> FileResult<()> {
    match Format::from_path(path)? {
        Format::Json => save_json(path, file),
        Format::Yaml => save_yaml(path, file),
    }
}

pub fn load_yaml(path: &Path) -> FileResult<ResultFile> {
    let content = std::fs::read_to_string(path)?;
    let mut file: ResultFile = serde_yaml::from_str(&content)?;
    file = migrate_to_latest(file)?;
    validate_result_file(&file)?;
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &ResultFile) -> FileResult<()> {
    validate_result_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> FileResult<ResultFile> {
    let content = std::fs::read_to_string(path)?;
    let mut file: ResultFile = serde_json::from_str(&content)?;
    file = migrate_to_latest(file)?;
    validate_result_file(&file)?;
    Ok(file)
}

pub fn save_json(path: &Path, file: &ResultFile) -> FileResult<()> {
    validate_result_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}
