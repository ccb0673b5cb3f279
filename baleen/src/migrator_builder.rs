use crate::comparator::Comparator;
use crate::errors::{BaleenError, BaleenResult};
use crate::event::MigrationEventListener;
use crate::migrator::Migrator;
use crate::migrator_config::MigratorConfig;
use crate::repository::Repository;
use crate::resolver::Resolver;
use crate::runner::{RunOptions, Stage};
use crate::storage::Storage;

/// Builder for creating and configuring a [Migrator].
///
/// `MigratorBuilder` provides a fluent API over a [MigratorConfig]. It
/// captures the first configuration error and returns it from `build()`, so
/// a chain of calls never has to be interrupted.
///
/// # Examples
///
/// ```rust,ignore
/// let migrator = Migrator::builder()
///     .repository(InMemoryRepository::with_migrations(migrations))
///     .storage(FileStorage::new("migrations.applied"))
///     .add_listener(MigrationEventListener::new(|event| {
///         log::info!("{} {}", event.kind(), event.target());
///         Ok(())
///     }))
///     .build()?;
///
/// migrator.up("latest", &RunOptions::up())?;
/// ```
#[derive(Default)]
pub struct MigratorBuilder {
    error: Option<BaleenError>,
    config: MigratorConfig,
}

impl MigratorBuilder {
    /// Creates a builder over a default configuration.
    pub fn new() -> Self {
        MigratorBuilder {
            error: None,
            config: MigratorConfig::new(),
        }
    }

    /// Sets the repository the migrator discovers versions from. Required.
    pub fn repository<T: Repository + 'static>(self, repository: T) -> Self {
        self.apply(|config| config.set_repository(repository))
    }

    /// Sets the storage recording applied versions. Required.
    pub fn storage<T: Storage + 'static>(self, storage: T) -> Self {
        self.apply(|config| config.set_storage(storage))
    }

    /// Sets the comparator ordering versions. Defaults to the name
    /// comparator.
    pub fn comparator(self, comparator: Comparator) -> Self {
        self.apply(|config| config.set_comparator(comparator))
    }

    /// Adds a resolver to the default chain, replacing any resolver of the
    /// same name.
    ///
    /// # Arguments
    ///
    /// * `resolver` - the resolver to register
    /// * `priority` - higher priorities are tried first; see the
    ///   `*_RESOLVER_PRIORITY` constants of the
    ///   [resolver](crate::resolver) module for the default ones
    pub fn add_resolver<T: Resolver + 'static>(self, resolver: T, priority: i32) -> Self {
        self.apply(|config| config.add_resolver(resolver, priority))
    }

    /// Appends a stage to the execution pipeline.
    pub fn add_stage<T: Stage + 'static>(self, stage: T) -> Self {
        self.apply(|config| config.add_stage(stage))
    }

    /// Registers an event listener.
    pub fn add_listener(self, listener: MigrationEventListener) -> Self {
        self.apply(|config| {
            config.add_listener(listener);
            Ok(())
        })
    }

    /// Sets the options returned by [Migrator::default_options].
    pub fn default_options(self, options: RunOptions) -> Self {
        self.apply(|config| config.set_default_options(options))
    }

    /// Builds the migrator.
    ///
    /// # Errors
    /// - the first error captured while configuring
    /// - `InvalidArgument` if no repository or no storage was set
    pub fn build(self) -> BaleenResult<Migrator> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.seal()?;
        Ok(Migrator::new(self.config))
    }

    fn apply(mut self, f: impl FnOnce(&MigratorConfig) -> BaleenResult<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&self.config) {
                self.error = Some(e);
            }
        }
        self
    }
}
