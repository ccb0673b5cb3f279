use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::event::{MigrationEvent, MigrationEventListener};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publishes migration events to registered listeners.
///
/// # Responsibilities
///
/// * **Event Publishing**: Delivers events to every registered listener
/// * **Listener Registration**: Registers listeners and hands out a
///   [SubscriberRef] for later removal
/// * **Listener Deregistration**: Removes previously registered listeners
/// * **Listener Queries**: Checks if any listeners are currently registered
/// * **Lifecycle Management**: Closes the bus and drops all listeners
///
/// # Characteristics
/// - **Synchronous**: listeners run on the publishing thread, one after the
///   other, in registration order
/// - **Non-interfering**: a listener error is logged and the remaining
///   listeners still run; publishing never fails
/// - **Fast path**: publishing without listeners does nothing
/// - **Cloneable**: clones share the same listener list
///
/// # Example
///
/// ```ignore
/// let bus = MigrationEventBus::new();
/// let subscriber = bus.register(MigrationEventListener::new(|event| {
///     log::info!("{} {}", event.kind(), event.target());
///     Ok(())
/// }));
///
/// bus.publish(event);
/// bus.deregister(subscriber)?;
/// ```
#[derive(Clone, Default)]
pub struct MigrationEventBus {
    inner: Arc<MigrationEventBusInner>,
}

impl MigrationEventBus {
    /// Creates a new event bus without listeners.
    pub fn new() -> Self {
        MigrationEventBus {
            inner: Arc::new(MigrationEventBusInner::new()),
        }
    }

    /// Registers a listener with the bus.
    pub fn register(&self, listener: MigrationEventListener) -> SubscriberRef {
        self.inner.register(listener)
    }

    /// Deregisters a previously registered listener.
    ///
    /// # Errors
    /// Returns `NotFound` if the listener is not registered (anymore).
    pub fn deregister(&self, subscriber: SubscriberRef) -> BaleenResult<()> {
        self.inner.deregister(subscriber)
    }

    /// Publishes an event to all registered listeners.
    pub fn publish(&self, event: MigrationEvent) {
        self.inner.publish(event)
    }

    /// Clears all registered listeners.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Returns true if there are any registered listeners.
    pub fn has_listeners(&self) -> bool {
        self.inner.has_listeners()
    }
}

impl Debug for MigrationEventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEventBus")
            .field("listeners", &self.inner.listeners.read_with(|l| l.len()))
            .finish()
    }
}

/// Handle of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberRef {
    id: u64,
}

struct MigrationEventBusInner {
    listeners: Atomic<Vec<(u64, MigrationEventListener)>>,
    next_id: AtomicU64,
}

impl Default for MigrationEventBusInner {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEventBusInner {
    fn new() -> Self {
        MigrationEventBusInner {
            listeners: atomic(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self, listener: MigrationEventListener) -> SubscriberRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write_with(|l| l.push((id, listener)));
        SubscriberRef { id }
    }

    fn deregister(&self, subscriber: SubscriberRef) -> BaleenResult<()> {
        let removed = self.listeners.write_with(|l| {
            let before = l.len();
            l.retain(|(id, _)| *id != subscriber.id);
            before != l.len()
        });

        if removed {
            Ok(())
        } else {
            log::error!("Listener {} is not registered", subscriber.id);
            Err(BaleenError::new(
                "Event bus error: the listener is not registered",
                ErrorKind::NotFound,
            ))
        }
    }

    fn publish(&self, event: MigrationEvent) {
        // Fast path: no listeners, nothing to do
        if !self.has_listeners() {
            return;
        }

        // listeners may register or deregister while being notified
        let listeners = self.listeners.snapshot();
        for (id, listener) in listeners {
            if let Err(e) = listener.notify(event.clone()) {
                log::warn!(
                    "Listener {} failed handling {} of {}: {}",
                    id,
                    event.kind(),
                    event.target(),
                    e
                );
            }
        }
    }

    fn close(&self) {
        self.listeners.write_with(|l| l.clear());
    }

    fn has_listeners(&self) -> bool {
        self.listeners.read_with(|l| !l.is_empty())
    }
}
