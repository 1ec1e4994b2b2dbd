//! Core types and services for intellidocs.
//!
//! This crate owns the extraction engine that turns devdocs HTML fragments
//! into normalized records, the corpus indexer that merges them into family
//! stores, and the lookup helpers an editor shell calls at cursor time.

pub mod control;
pub mod parsers;
pub mod resolver;
pub mod services;
pub mod store;
