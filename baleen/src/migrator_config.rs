//! Configuration of a [Migrator](crate::migrator::Migrator).

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::comparator::Comparator;
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::event::{MigrationEventBus, MigrationEventListener, SubscriberRef};
use crate::repository::Repository;
use crate::resolver::{Resolver, ResolverChain};
use crate::runner::{Pipeline, RunOptions, Stage};
use crate::storage::Storage;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Settings shared by every run of a migrator.
///
/// # Purpose
/// `MigratorConfig` gathers the collaborators ([Repository], [Storage]) and
/// the run policy (comparator, resolvers, pipeline stages, event listeners,
/// default options) of a migrator. It is usually filled through
/// [MigratorBuilder](crate::migrator_builder::MigratorBuilder).
///
/// # Characteristics
/// - **Cheap to clone**: clones share the same settings
/// - **Sealed on build**: once the migrator is built, everything except the
///   event listeners is read-only; setters fail with `InvalidArgument`
/// - **Set once**: repository and storage can only be set once
#[derive(Clone)]
pub struct MigratorConfig {
    inner: Arc<MigratorConfigInner>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MigratorConfig {
    /// Creates a configuration with the default comparator, resolver chain,
    /// pipeline and run options, and without repository or storage.
    pub fn new() -> Self {
        MigratorConfig {
            inner: Arc::new(MigratorConfigInner::new()),
        }
    }

    pub fn repository(&self) -> BaleenResult<Arc<dyn Repository>> {
        self.inner.repository()
    }

    pub fn set_repository<T: Repository + 'static>(&self, repository: T) -> BaleenResult<()> {
        self.inner.set_repository(Arc::new(repository))
    }

    pub fn storage(&self) -> BaleenResult<Arc<dyn Storage>> {
        self.inner.storage()
    }

    pub fn set_storage<T: Storage + 'static>(&self, storage: T) -> BaleenResult<()> {
        self.inner.set_storage(Arc::new(storage))
    }

    pub fn comparator(&self) -> Comparator {
        self.inner.comparator.snapshot()
    }

    pub fn set_comparator(&self, comparator: Comparator) -> BaleenResult<()> {
        self.inner.ensure_open("comparator")?;
        self.inner.comparator.replace(comparator);
        Ok(())
    }

    pub fn resolver(&self) -> ResolverChain {
        self.inner.resolver.snapshot()
    }

    /// Registers a resolver, replacing any resolver of the same name.
    pub fn add_resolver<T: Resolver + 'static>(&self, resolver: T, priority: i32) -> BaleenResult<()> {
        self.inner.ensure_open("resolvers")?;
        if resolver.name().trim().is_empty() {
            log::error!("Resolver name cannot be empty");
            return Err(BaleenError::new(
                "Resolver name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        self.inner
            .resolver
            .write_with(|r| r.add_resolver(resolver, priority));
        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        self.inner.pipeline.snapshot()
    }

    /// Appends a pipeline stage, replacing any stage of the same name.
    pub fn add_stage<T: Stage + 'static>(&self, stage: T) -> BaleenResult<()> {
        self.inner.ensure_open("pipeline")?;
        if stage.name().trim().is_empty() {
            log::error!("Stage name cannot be empty");
            return Err(BaleenError::new(
                "Stage name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        self.inner.pipeline.write_with(|p| p.add_stage(stage));
        Ok(())
    }

    pub fn event_bus(&self) -> MigrationEventBus {
        self.inner.event_bus.clone()
    }

    /// Registers an event listener. Listeners can be added at any time.
    pub fn add_listener(&self, listener: MigrationEventListener) -> SubscriberRef {
        self.inner.event_bus.register(listener)
    }

    pub fn default_options(&self) -> RunOptions {
        self.inner.default_options.snapshot()
    }

    pub fn set_default_options(&self, options: RunOptions) -> BaleenResult<()> {
        self.inner.ensure_open("default options")?;
        self.inner.default_options.replace(options);
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.load(Ordering::Relaxed)
    }

    pub(crate) fn seal(&self) -> BaleenResult<()> {
        self.repository()?;
        self.storage()?;
        self.inner.sealed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

impl Debug for MigratorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigratorConfig")
            .field("comparator", &self.comparator())
            .field("resolver", &self.resolver())
            .field("pipeline", &self.pipeline())
            .field("default_options", &self.default_options())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

struct MigratorConfigInner {
    sealed: AtomicBool,
    repository: OnceLock<Arc<dyn Repository>>,
    storage: OnceLock<Arc<dyn Storage>>,
    comparator: Atomic<Comparator>,
    resolver: Atomic<ResolverChain>,
    pipeline: Atomic<Pipeline>,
    event_bus: MigrationEventBus,
    default_options: Atomic<RunOptions>,
}

impl MigratorConfigInner {
    fn new() -> Self {
        MigratorConfigInner {
            sealed: AtomicBool::new(false),
            repository: OnceLock::new(),
            storage: OnceLock::new(),
            comparator: atomic(Comparator::default()),
            resolver: atomic(ResolverChain::default()),
            pipeline: atomic(Pipeline::default()),
            event_bus: MigrationEventBus::new(),
            default_options: atomic(RunOptions::default()),
        }
    }

    fn ensure_open(&self, setting: &str) -> BaleenResult<()> {
        if self.sealed.load(Ordering::Relaxed) {
            log::error!("The {} cannot be changed after the migrator is built", setting);
            return Err(BaleenError::new(
                &format!("The {} cannot be changed after the migrator is built", setting),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }

    fn repository(&self) -> BaleenResult<Arc<dyn Repository>> {
        self.repository.get().cloned().ok_or_else(|| {
            log::error!("No repository is configured");
            BaleenError::new("No repository is configured", ErrorKind::InvalidArgument)
        })
    }

    fn set_repository(&self, repository: Arc<dyn Repository>) -> BaleenResult<()> {
        self.ensure_open("repository")?;
        self.repository.set(repository).map_err(|_| {
            log::error!("A repository is already configured");
            BaleenError::new("A repository is already configured", ErrorKind::AlreadyExists)
        })
    }

    fn storage(&self) -> BaleenResult<Arc<dyn Storage>> {
        self.storage.get().cloned().ok_or_else(|| {
            log::error!("No storage is configured");
            BaleenError::new("No storage is configured", ErrorKind::InvalidArgument)
        })
    }

    fn set_storage(&self, storage: Arc<dyn Storage>) -> BaleenResult<()> {
        self.ensure_open("storage")?;
        self.storage.set(storage).map_err(|_| {
            log::error!("A storage is already configured");
            BaleenError::new("A storage is already configured", ErrorKind::AlreadyExists)
        })
    }
}
