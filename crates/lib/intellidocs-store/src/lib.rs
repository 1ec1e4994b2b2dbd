//! Record models and schema helpers for intellidocs.
//!
//! This crate defines the canonical data model shared by the extraction
//! engine, the corpus indexer, and the editor-facing lookup layer.

pub mod models;
pub mod schema;

pub use models::*;
