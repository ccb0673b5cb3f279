//! Shared helpers for the end-to-end tests of the migration engine.

pub mod test_util;
