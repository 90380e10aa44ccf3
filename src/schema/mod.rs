//! Detection record schema
//!
//! Defines the JSON detection record submitted by clients at the end of a
//! monitoring session, its validation rules, and the scored response shape.
//! Field names are PascalCase to match the service API.

mod adapter;
mod detection;

pub use adapter::*;
pub use detection::*;
