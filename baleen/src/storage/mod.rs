//! Persistence of applied versions between runs.

mod file;
mod memory;
mod storage;

pub use file::*;
pub use memory::*;
pub use storage::*;
