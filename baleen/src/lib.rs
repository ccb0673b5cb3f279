//! # Baleen - Versioned Migration Engine
//!
//! Baleen runs reversible migrations in a well-defined order and keeps track
//! of which of them are applied. Given a goal, written as a human-friendly
//! alias, it works out which migrations have to run up or down and in which
//! order, runs them through a configurable pipeline and reports what changed.
//!
//! ## Key Features
//!
//! - **Ordered versions**: a [`collection::Collection`] sorted by a pluggable
//!   [`comparator::Comparator`] (name order, namespace priorities, reversed)
//! - **Aliases**: `HEAD`, `first`, `latest`, `HEAD~2`, `v12+`, id prefixes
//!   and file names, resolved by a [`resolver::ResolverChain`] with a
//!   per-collection cache
//! - **Convergence**: [`runner::Timeline`] moves the applied state up to,
//!   down to, or exactly onto a goal
//! - **Pipeline**: option injection and transactions around every migration,
//!   extensible with custom [`runner::Stage`]s
//! - **Partial progress**: a failing batch reports the versions it changed
//!   before the failure so they can still be recorded
//! - **Events**: before/after notifications for batches and single
//!   migrations, with progress
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use baleen::migrator::Migrator;
//! use baleen::repository::InMemoryRepository;
//! use baleen::runner::RunOptions;
//! use baleen::storage::FileStorage;
//!
//! let migrator = Migrator::builder()
//!     .repository(InMemoryRepository::with_migrations(migrations))
//!     .storage(FileStorage::new("migrations.applied"))
//!     .build()?;
//!
//! // apply everything
//! migrator.up("latest", &RunOptions::up())?;
//!
//! // step back by one version
//! migrator.go("HEAD-1", &RunOptions::up())?;
//! ```
//!
//! ## Threading
//!
//! A run is synchronous and happens entirely on the calling thread. Event
//! listeners are invoked inline. A collection must not be mutated from
//! another thread while a run walks it.
//!
//! ## Module Organization
//!
//! - [`collection`] - The ordered version container
//! - [`common`] - Shared utilities
//! - [`comparator`] - Version ordering
//! - [`errors`] - Error types and result definitions
//! - [`event`] - Run notifications and listeners
//! - [`migrator`] - Application entry point
//! - [`migrator_builder`] - Fluent configuration of a migrator
//! - [`migrator_config`] - Migrator settings
//! - [`repository`] - Discovery of migrations
//! - [`resolver`] - Alias resolution
//! - [`runner`] - Run options, pipeline, runners and timeline
//! - [`storage`] - Persistence of applied versions
//! - [`version`] - Versions and the migration trait

pub mod collection;
pub mod common;
pub mod comparator;
pub mod errors;
pub mod event;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod repository;
pub mod resolver;
pub mod runner;
pub mod storage;
pub mod version;

#[cfg(test)]
mod test_util;
