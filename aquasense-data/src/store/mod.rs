//! Store seam
//!
//! The relational store is an external dependency reached through two
//! dyn-safe async traits: [`Store`] (connect, begin, schema administration)
//! and [`StoreSession`] (predicate-augmented queries, mutations, commit and
//! rollback inside one transaction). Repositories never see these directly;
//! they go through the session manager, which owns error translation.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`]: in-memory, always compiled, intended for tests/dev.
//! - [`PostgresStore`]: sqlx/PostgreSQL, behind the `database` feature.

mod memory;

#[cfg(feature = "database")]
mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "database")]
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::entity::{EntityDescriptor, Record, Schema};
use crate::error::StoreError;
use crate::repository::{Criteria, Select};

/// Result type for store backends
pub type StoreResult<T> = Result<T, StoreError>;

/// A store backend: session acquisition plus schema administration
#[async_trait]
pub trait Store: Send + Sync {
    /// Begin a transaction and return the session bound to it
    ///
    /// Each call produces an independent session; concurrent units of work
    /// never share one.
    async fn begin(&self) -> StoreResult<Box<dyn StoreSession>>;

    /// Create every registered table (administrative; test/bootstrap only)
    async fn create_schema(&self, schema: &Schema) -> StoreResult<()>;

    /// Drop every registered table (administrative; test/bootstrap only)
    async fn drop_schema(&self, schema: &Schema) -> StoreResult<()>;
}

/// One transaction against the store
///
/// Mutations are visible inside the session immediately and become durable
/// only on [`commit`](StoreSession::commit). Dropping an uncommitted session
/// rolls the transaction back.
#[async_trait]
pub trait StoreSession: Send {
    /// Execute a planned select, eager-loading relationships when asked
    ///
    /// Eager selects return one record per joined row, each carrying a
    /// single related row per relationship; the query planner collapses the
    /// fan-out.
    async fn select(&mut self, select: &Select) -> StoreResult<Vec<Record>>;

    /// Insert one row and return the persisted record, generated columns
    /// included
    async fn insert(
        &mut self,
        entity: &'static EntityDescriptor,
        record: Record,
    ) -> StoreResult<Record>;

    /// Set the given column values on every row matching the criteria;
    /// returns the affected row count
    async fn update(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
        values: &Record,
    ) -> StoreResult<u64>;

    /// Delete every row matching the criteria; returns the affected row
    /// count
    async fn delete(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<u64>;

    /// True when at least one row matches the criteria
    async fn exists(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<bool>;

    /// Number of rows matching the criteria
    async fn count(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<u64>;

    /// Make the transaction durable
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard the transaction
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
