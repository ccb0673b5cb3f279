use crate::errors::BaleenResult;
use crate::runner::RunOptions;

/// A reversible unit of work.
///
/// # Purpose
/// Implemented by application code for each migration. The engine never looks
/// inside a migration: it asks for its name (used for ordering and id
/// derivation) and invokes `up()` or `down()` through the execution pipeline.
///
/// # Optional capabilities
/// A migration may additionally accept run options or participate in a
/// transaction. It advertises this by overriding [Migration::as_options_aware]
/// or [Migration::as_transaction_aware] to return `Some(self)`. The defaults
/// return `None`, so a plain migration only implements `name`, `up` and `down`.
///
/// # Example
/// ```rust
/// use baleen::errors::BaleenResult;
/// use baleen::version::Migration;
///
/// struct CreateUsers;
///
/// impl Migration for CreateUsers {
///     fn name(&self) -> String {
///         "app::migrations::V001CreateUsers".to_string()
///     }
///
///     fn up(&self) -> BaleenResult<()> {
///         Ok(())
///     }
///
///     fn down(&self) -> BaleenResult<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Migration: Send + Sync {
    /// Fully-qualified identity of the migration. Sortable: the default
    /// comparator orders versions by this value.
    fn name(&self) -> String;

    /// Applies the migration.
    fn up(&self) -> BaleenResult<()>;

    /// Reverts the migration.
    fn down(&self) -> BaleenResult<()>;

    /// Path of the file that defines this migration, if known. Enables
    /// resolving versions by file name.
    fn source_file(&self) -> Option<String> {
        None
    }

    fn as_options_aware(&self) -> Option<&dyn OptionsAware> {
        None
    }

    fn as_transaction_aware(&self) -> Option<&dyn TransactionAware> {
        None
    }
}

/// Capability of a migration that wants to see the options it runs with.
pub trait OptionsAware {
    fn set_options(&self, options: &RunOptions);
}

/// Capability of a migration that wraps its body in a transaction.
///
/// The transaction stage calls `begin()` before the body, `finish()` after a
/// successful body, and `abort()` when either the body or `finish()` fails.
pub trait TransactionAware {
    fn begin(&self) -> BaleenResult<()>;

    fn finish(&self) -> BaleenResult<()>;

    fn abort(&self) -> BaleenResult<()>;
}
