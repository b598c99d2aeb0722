//! dpf-mesh: spatial support of a result file.
//!
//! Provides:
//! - The element type taxonomy with per-type descriptors
//! - `MeshedRegion`: nodes, elements, named selections and id lookups
//! - `MeshBuilder`: incremental construction with validation on `build()`
//!
//! # Example
//!
//! ```
//! use dpf_mesh::{ElementType, MeshBuilder};
//!
//! let mut builder = MeshBuilder::new("m");
//! builder.add_node(1, [0.0, 0.0, 0.0]);
//! builder.add_node(2, [1.0, 0.0, 0.0]);
//! builder.add_element(7, ElementType::Line2, vec![1, 2], None);
//! let mesh = builder.build().unwrap();
//!
//! assert_eq!(mesh.n_nodes(), 2);
//! assert_eq!(mesh.element_by_id(7).unwrap().n_nodes(), 2);
//! ```

pub mod builder;
pub mod element_type;
pub mod error;
pub mod indexing;
pub mod region;
pub(crate) mod validate;

pub use builder::MeshBuilder;
pub use element_type::{ElementDescriptor, ElementShape, ElementType};
pub use error::{MeshError, MeshResult};
pub use indexing::IdIndex;
pub use region::{Element, MeshedRegion, NamedSelection, Node, Point3};
