//! Error types for the model façade.

use std::path::PathBuf;

use dpf_file::FileError;
use dpf_mesh::MeshError;
use dpf_results::ResultsError;

/// Model error type that wraps errors from the backend crates and from a
/// remote server behind one interface.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Result file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Result file error: {0}")]
    File(FileError),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    /// An error reported by a remote server, identified by its kind.
    #[error("Server error [{kind}]: {message}")]
    Remote { kind: String, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dpf-model operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    /// Stable name of the error condition, shared by local and remote models.
    pub fn kind(&self) -> &str {
        match self {
            ModelError::FileNotFound { .. } => "FileNotFound",
            ModelError::File(FileError::UnsupportedFormat { .. }) => "UnsupportedFormat",
            ModelError::File(FileError::UnsupportedVersion { .. }) => "UnsupportedVersion",
            ModelError::File(_) => "InvalidFile",
            ModelError::Mesh(MeshError::EntityNotFound { .. }) => "EntityNotFound",
            ModelError::Mesh(MeshError::NamedSelectionNotFound { .. }) => "NamedSelectionNotFound",
            ModelError::Mesh(_) => "Mesh",
            ModelError::Results(err) => match err {
                ResultsError::ResultNotFound { .. } => "ResultNotFound",
                ResultsError::InvalidTimeScoping { .. } => "InvalidTimeScoping",
                ResultsError::ScopingNotInMesh { .. } => "ScopingNotInMesh",
                ResultsError::UnsupportedLocation { .. } => "UnsupportedLocation",
                ResultsError::Mesh(MeshError::NamedSelectionNotFound { .. }) => {
                    "NamedSelectionNotFound"
                }
                _ => "Results",
            },
            ModelError::Remote { kind, .. } => kind,
            ModelError::Connection(_) => "Connection",
            ModelError::Io(_) => "Io",
        }
    }
}

impl From<FileError> for ModelError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::FileNotFound { path } => ModelError::FileNotFound { path },
            other => ModelError::File(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_keeps_its_kind() {
        let err = ModelError::from(FileError::FileNotFound {
            path: PathBuf::from("/nope.json"),
        });
        assert_eq!(err.kind(), "FileNotFound");
        assert!(err.to_string().contains("/nope.json"));
    }

    #[test]
    fn remote_kind_passes_through() {
        let err = ModelError::Remote {
            kind: "ResultNotFound".to_string(),
            message: "Result not found: S".to_string(),
        };
        assert_eq!(err.kind(), "ResultNotFound");
    }

    #[test]
    fn results_kinds() {
        let err = ModelError::from(ResultsError::ResultNotFound {
            name: "S".to_string(),
        });
        assert_eq!(err.kind(), "ResultNotFound");
    }
}
