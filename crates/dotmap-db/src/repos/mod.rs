//! Per-scan read and delete operations.
//!
//! Each module adds methods to `GraphStore` via `impl GraphStore` blocks.
//! Public methods take the store gate; the `pub(crate)` fetch functions take
//! a bare connection so they can be composed under one gate.

pub mod assembly;
pub mod edges;
pub mod events;
pub mod package;
pub mod project;
pub mod scan;
pub mod solution;
