//! CLI command implementations.

pub mod info;
pub mod nodes;
pub mod render;
pub mod validate;
