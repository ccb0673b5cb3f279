//! Versions and the migration units they point to.
//!
//! A [Version] is the identity and applied-state record of one migration. The
//! executable part is a [Migration] implementation owned by the caller; the
//! engine only reaches it through the trait and its optional capabilities
//! ([OptionsAware], [TransactionAware]).

mod migration;
mod version;

pub use migration::*;
pub use version::*;
