use crate::collection::Collection;
use crate::errors::BaleenResult;
use crate::runner::{Progress, RunOptions};
use crate::version::Version;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Lifecycle points at which a run notifies its listeners.
///
/// # Variants
/// - `BeforeCollection`: a batch is about to start; the payload carries the
///   selected versions
/// - `AfterCollection`: a batch completed; the payload carries the versions
///   it changed
/// - `BeforeMigration`: a single version is about to run
/// - `AfterMigration`: a single version ran and its applied flag was updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationEventKind {
    BeforeCollection,
    AfterCollection,
    BeforeMigration,
    AfterMigration,
}

impl MigrationEventKind {
    pub fn is_collection_event(&self) -> bool {
        matches!(
            self,
            MigrationEventKind::BeforeCollection | MigrationEventKind::AfterCollection
        )
    }
}

impl Display for MigrationEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationEventKind::BeforeCollection => write!(f, "before-collection"),
            MigrationEventKind::AfterCollection => write!(f, "after-collection"),
            MigrationEventKind::BeforeMigration => write!(f, "before-migration"),
            MigrationEventKind::AfterMigration => write!(f, "after-migration"),
        }
    }
}

/// Payload delivered to migration event listeners.
///
/// # Characteristics
/// - **Cloneable**: the payload is shared via `Arc`, clones are cheap
/// - **Immutable**: every field is captured when the event is created
/// - **Timestamped**: `occurred_at` records the creation time in UTC
///
/// The `target` of a collection event is the goal of the batch; for a
/// migration event it is the version being run. `collection` is only set on
/// collection events.
///
/// # Usage
/// ```ignore
/// bus.register(MigrationEventListener::new(|event: MigrationEvent| {
///     if event.kind() == MigrationEventKind::AfterMigration {
///         println!("{} done ({:?})", event.target(), event.progress());
///     }
///     Ok(())
/// }));
/// ```
#[derive(Clone)]
pub struct MigrationEvent {
    inner: Arc<MigrationEventInner>,
}

impl MigrationEvent {
    /// Creates an event about a single version.
    pub fn for_migration(
        kind: MigrationEventKind,
        target: Version,
        options: RunOptions,
        progress: Option<Progress>,
    ) -> Self {
        MigrationEvent {
            inner: Arc::new(MigrationEventInner::new(kind, target, options, progress, None)),
        }
    }

    /// Creates an event about a batch.
    ///
    /// # Arguments
    ///
    /// * `kind` - `BeforeCollection` or `AfterCollection`
    /// * `target` - the goal of the batch
    /// * `options` - the options the batch runs with
    /// * `collection` - the selected versions (before) or the changed ones
    ///   (after)
    /// * `progress` - the batch progress at the time of the event
    pub fn for_collection(
        kind: MigrationEventKind,
        target: Version,
        options: RunOptions,
        collection: Collection,
        progress: Option<Progress>,
    ) -> Self {
        MigrationEvent {
            inner: Arc::new(MigrationEventInner::new(
                kind,
                target,
                options,
                progress,
                Some(collection),
            )),
        }
    }

    pub fn kind(&self) -> MigrationEventKind {
        self.inner.kind
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.inner.occurred_at
    }

    pub fn target(&self) -> &Version {
        &self.inner.target
    }

    pub fn options(&self) -> &RunOptions {
        &self.inner.options
    }

    pub fn progress(&self) -> Option<Progress> {
        self.inner.progress
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.inner.collection.as_ref()
    }
}

impl Debug for MigrationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEvent")
            .field("kind", &self.kind())
            .field("occurred_at", &self.occurred_at())
            .field("target", &self.target().id().as_str())
            .field("direction", &self.options().direction())
            .field("progress", &self.progress())
            .field("collection", &self.inner.collection.as_ref().map(|c| c.len()))
            .finish()
    }
}

struct MigrationEventInner {
    kind: MigrationEventKind,
    occurred_at: DateTime<Utc>,
    target: Version,
    options: RunOptions,
    progress: Option<Progress>,
    collection: Option<Collection>,
}

impl MigrationEventInner {
    fn new(
        kind: MigrationEventKind,
        target: Version,
        options: RunOptions,
        progress: Option<Progress>,
        collection: Option<Collection>,
    ) -> Self {
        MigrationEventInner {
            kind,
            occurred_at: Utc::now(),
            target,
            options,
            progress,
            collection,
        }
    }
}

/// Signature of an event handler.
///
/// Any `Send + Sync` closure taking a [MigrationEvent] and returning
/// `BaleenResult<()>` implements this trait. Returned errors are logged by
/// the bus and never stop a run.
pub trait MigrationEventCallback: Send + Sync + Fn(MigrationEvent) -> BaleenResult<()> {}

impl<F> MigrationEventCallback for F where F: Send + Sync + Fn(MigrationEvent) -> BaleenResult<()> {}

/// Listener for migration events, registered on a
/// [MigrationEventBus](crate::event::MigrationEventBus).
///
/// # Characteristics
/// - **Cloneable**: the callback is shared via `Arc`
/// - **Closure-based**: accepts any [MigrationEventCallback]
/// - **Synchronous**: invoked on the thread that runs the migrations
#[derive(Clone)]
pub struct MigrationEventListener {
    on_event: Arc<dyn MigrationEventCallback>,
}

impl MigrationEventListener {
    /// Creates a listener wrapping the callback.
    pub fn new(on_event: impl MigrationEventCallback + 'static) -> Self {
        MigrationEventListener {
            on_event: Arc::new(on_event),
        }
    }

    pub(crate) fn notify(&self, event: MigrationEvent) -> BaleenResult<()> {
        (self.on_event)(event)
    }
}

impl Debug for MigrationEventListener {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEventListener").finish()
    }
}
