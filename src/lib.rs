pub mod adapters;
pub mod container;
pub mod entities;
pub mod error;
pub mod ica;
pub mod metrics;
pub mod parser;
pub mod profiling;
pub mod registry;
pub mod store;
pub mod streaming;
pub mod types;
pub mod validation;

pub use error::{AdapterError, Result};
pub use registry::{AdapterMetadata, ADAPTER_REGISTRY};
pub use store::{EntityStore, InMemoryStore};
pub use streaming::{transform_axis, SliceSource};
pub use types::*;
