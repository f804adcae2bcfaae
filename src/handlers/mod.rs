//! HTTP handlers for entity CRUD and search.

pub mod entity;
pub use entity::*;
