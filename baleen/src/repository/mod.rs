//! Discovery of the migrations known to an application.

mod memory;
mod repository;

pub use memory::*;
pub use repository::*;
