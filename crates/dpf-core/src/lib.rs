//! dpf-core: shared foundation for the dpf workspace.
//!
//! Contains:
//! - error (shared error type)
//! - numeric (Real + tolerances + float helpers)
//! - location (where field data lives on a mesh)
//! - scoping (ordered entity id sets tagged with a location)

pub mod error;
pub mod location;
pub mod numeric;
pub mod scoping;

pub use error::{CoreError, CoreResult};
pub use location::Location;
pub use numeric::*;
pub use scoping::{EntityId, Scoping};
