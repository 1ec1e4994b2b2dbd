//! Family store and its JSON persistence.
//!
//! The store layer keeps one keyed map of records per documentation family
//! and reads or writes it as a single JSON file.

pub mod json;

pub use json::{DocStore, StoreError, StoreResult};
