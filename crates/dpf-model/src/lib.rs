//! Client façade over a finite-element result file.
//!
//! A [`Model`] is opened from a path (locally) or from any [`ResultSource`],
//! exposes its [`Metadata`] and its named [`Results`], and evaluates
//! [`ResultQuery`]s into fields containers.

pub mod error;
pub mod model;
pub mod results;
pub mod scoping_factory;
pub mod source;

pub use error::{ModelError, ModelResult};
pub use model::{Metadata, Model};
pub use results::{MeshScopingInput, ResultQuery, Results};
pub use source::{LocalSource, ResultSource};
