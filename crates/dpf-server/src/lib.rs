//! Serve result files over TCP and open them as models from another process.
//!
//! [`DpfServer`] owns the files; [`ServerConnection`] talks to it and hands out
//! [`dpf_model::Model`]s backed by a [`RemoteSource`], so remote and local
//! models answer the same queries the same way.

pub mod address;
pub mod client;
pub mod protocol;
pub mod server;
pub mod version;

pub use address::ServerAddress;
pub use client::{RemoteSource, ServerConnection};
pub use protocol::{Request, Response};
pub use server::{DpfServer, ServerHandle};
pub use version::{MIN_SERVER_VERSION, SERVER_VERSION, meets_version, version_tuple};

use dpf_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Server version {server} is older than the required {required}")]
    IncompatibleVersion { server: String, required: String },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Message longer than {limit} bytes")]
    MessageTooLarge { limit: u64 },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("[{kind}] {message}")]
    Remote { kind: String, message: String },

    #[error("Server thread panicked")]
    ThreadPanicked,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<ServerError> for ModelError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Remote { kind, message } => ModelError::Remote { kind, message },
            ServerError::Model(err) => err,
            other => ModelError::Connection(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_keep_their_kind() {
        let err: ModelError = ServerError::Remote {
            kind: "ScopingNotInMesh".to_string(),
            message: "node 404".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "ScopingNotInMesh");

        let err: ModelError = ServerError::ConnectionClosed.into();
        assert_eq!(err.kind(), "Connection");
    }
}
