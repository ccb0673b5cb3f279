//! Planning and execution of migration runs.
//!
//! - [RunOptions] and [Direction] describe how a run behaves.
//! - [Pipeline] wraps the invocation of a migration with ordered [Stage]s.
//! - [MigrationRunner] runs one version and decides whether it must run.
//! - [CollectionRunner] walks a selected sub-collection and reports progress.
//! - [Timeline] selects what to run to converge a collection toward a goal.

mod collection_runner;
mod migration_runner;
mod options;
mod pipeline;
mod progress;
mod timeline;

pub use collection_runner::*;
pub use migration_runner::*;
pub use options::*;
pub use pipeline::*;
pub use progress::*;
pub use timeline::*;
