//! Alias resolution.
//!
//! Human-friendly references ("HEAD", "latest", "HEAD-2", an id prefix, a
//! file name) are turned into versions by a [ResolverChain]: an ordered list
//! of [Resolver] strategies tried highest priority first. The first resolver
//! that returns a version wins; when all of them return `None` the alias is
//! unresolved, which is not an error.

mod chain;
mod filename;
mod first_last;
mod head;
mod lazy_id;
mod offset;

pub use chain::*;
pub use filename::*;
pub use first_last::*;
pub use head::*;
pub use lazy_id::*;
pub use offset::*;

/// Priority of [OffsetResolver] in the default chain.
pub const OFFSET_RESOLVER_PRIORITY: i32 = 50;
/// Priority of [HeadResolver] in the default chain.
pub const HEAD_RESOLVER_PRIORITY: i32 = 40;
/// Priority of [FirstLastResolver] in the default chain.
pub const FIRST_LAST_RESOLVER_PRIORITY: i32 = 30;
/// Priority of [FilenameResolver] in the default chain.
pub const FILENAME_RESOLVER_PRIORITY: i32 = 20;
/// Priority of [LazyIdResolver] in the default chain. Lowest, tried last.
pub const LAZY_ID_RESOLVER_PRIORITY: i32 = 0;
