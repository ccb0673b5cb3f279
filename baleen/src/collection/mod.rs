//! The ordered version container and its alias resolution cache.

mod collection;
mod resolution_cache;

pub use collection::*;
pub(crate) use resolution_cache::*;
