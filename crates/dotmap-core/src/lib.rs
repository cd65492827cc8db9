//! # dotmap-core
//!
//! Core types, identity derivation, and error types for dotmap.
//!
//! This crate provides the foundational types shared across all dotmap crates:
//! - Entity structs for every node of the build graph (solutions, projects,
//!   packages, assemblies) and the scan that owns them
//! - Tag enums with their SQL storage strings
//! - The tagged `Edge` model and the in-memory `ScanGraph`
//! - Deterministic identifier derivation and path normalization
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod graph;
pub mod identity;

/// Placeholder stored wherever a value could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";
