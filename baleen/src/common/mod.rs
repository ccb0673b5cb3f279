//! Shared building blocks used across the engine.

mod hash_utils;
mod sort_order;
mod type_utils;

pub use hash_utils::*;
pub use sort_order::*;
pub use type_utils::*;
