//! Request extractors that report rejections in the `{error}` body shape.

mod json;
pub use json::{ApiJson, ApiPath};
