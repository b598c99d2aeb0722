//! dpf-results: result metadata, time/frequency axis, fields and evaluation.

pub mod evaluate;
pub mod field;
pub mod hash;
pub mod request;
pub mod result_info;
pub mod store;
pub mod time_freq;

pub use evaluate::evaluate;
pub use field::{Field, FieldsContainer, LabelSpace};
pub use hash::fingerprint;
pub use request::{EvalRequest, MeshSelector, Split, TimeSelector};
pub use result_info::{AnalysisType, ResultDescriptor, ResultInfo};
pub use store::{ResultStore, StoredSet};
pub use time_freq::{TimeDomain, TimeFreqSupport, TimeStep};

use dpf_core::{CoreError, EntityId, Location};
use dpf_mesh::MeshError;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("Result not found: {name}")]
    ResultNotFound { name: String },

    #[error("Invalid time scoping: {what}")]
    InvalidTimeScoping { what: String },

    #[error("{location} entity {id} of the scoping is not in the mesh")]
    ScopingNotInMesh { location: Location, id: EntityId },

    #[error("Cannot convert {from} data to {to}")]
    UnsupportedLocation { from: Location, to: Location },

    #[error("Invalid result data: {what}")]
    InvalidData { what: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
