//! The adapter layer: validate inputs, load referenced entities, run the
//! numeric routine, persist the result. Each adapter is stateless and used
//! for exactly one launch; any failure is terminal for that invocation.

pub mod graph;
pub mod ica;
pub mod projection;
