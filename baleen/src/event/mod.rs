//! Lifecycle notifications of migration runs.
//!
//! Runners publish a [MigrationEvent] before and after every batch and every
//! single migration. Listeners are plain closures wrapped in a
//! [MigrationEventListener] and registered on a [MigrationEventBus].

mod event;
mod event_bus;

pub use event::*;
pub use event_bus::*;
