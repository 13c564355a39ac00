//! In-memory store backend
//!
//! Intended for tests/dev. Transactions stage a copy of the table state;
//! commit swaps the copy in, rollback (or drop) discards it, so concurrent
//! sessions resolve last-commit-wins. Primary-key and unique-column
//! constraints are enforced and generated columns assigned, so repository
//! semantics hold without a running database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entity::{EntityDescriptor, Record, Schema, Value, ValueIdentity};
use crate::error::{StoreError, StoreOperation};
use crate::repository::{Criteria, Select};

use super::{Store, StoreResult, StoreSession};

#[derive(Debug, Clone, Default)]
struct Table {
    rows: Vec<Record>,
    next_id: i64,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tables: HashMap<&'static str, Table>,
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::transaction_failed("state lock poisoned")
}

fn missing_table(operation: StoreOperation, table: &str) -> StoreError {
    StoreError::query_failed(operation, format!("table `{}` does not exist", table))
}

fn key_identity(record: &Record, entity: &EntityDescriptor) -> Vec<ValueIdentity> {
    entity
        .primary_key
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(Value::identity)
                .unwrap_or(ValueIdentity::Null)
        })
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreSession>> {
        let staged = self.state.lock().map_err(|_| poisoned())?.clone();
        Ok(Box::new(MemorySession {
            shared: Arc::clone(&self.state),
            staged,
        }))
    }

    async fn create_schema(&self, schema: &Schema) -> StoreResult<()> {
        let mut state = self.state.lock().map_err(|_| poisoned())?;
        for descriptor in schema.descriptors() {
            state.tables.entry(descriptor.table).or_default();
        }
        Ok(())
    }

    async fn drop_schema(&self, schema: &Schema) -> StoreResult<()> {
        let mut state = self.state.lock().map_err(|_| poisoned())?;
        for descriptor in schema.descriptors().iter().rev() {
            state.tables.remove(descriptor.table);
        }
        Ok(())
    }
}

struct MemorySession {
    shared: Arc<Mutex<MemoryState>>,
    staged: MemoryState,
}

impl MemorySession {
    fn table(&self, operation: StoreOperation, entity: &EntityDescriptor) -> StoreResult<&Table> {
        self.staged
            .tables
            .get(entity.table)
            .ok_or_else(|| missing_table(operation, entity.table))
    }

    fn table_mut(
        &mut self,
        operation: StoreOperation,
        entity: &EntityDescriptor,
    ) -> StoreResult<&mut Table> {
        self.staged
            .tables
            .get_mut(entity.table)
            .ok_or_else(|| missing_table(operation, entity.table))
    }

    fn check_unique_columns(table: &Table, entity: &EntityDescriptor) -> StoreResult<()> {
        for column in entity.unique_columns() {
            let mut seen: HashSet<ValueIdentity> = HashSet::new();
            for row in &table.rows {
                if let Some(value) = row.get(column.name) {
                    if !value.is_null() && !seen.insert(value.identity()) {
                        return Err(StoreError::unique_violation(
                            StoreOperation::Update,
                            format!("duplicate value for unique column `{}`", column.name),
                        )
                        .with_context(format!("{}.{}", entity.table, column.name)));
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn select(&mut self, select: &Select) -> StoreResult<Vec<Record>> {
        let entity = select.entity;
        let owners: Vec<Record> = self
            .table(StoreOperation::Query, entity)?
            .rows
            .iter()
            .filter(|row| select.criteria.matches(row))
            .cloned()
            .collect();

        if !select.eager {
            return Ok(owners);
        }

        // Emulate LEFT JOIN fan-out: each related row repeats the owner row
        // once, carrying that single related row; multiple relationships
        // multiply out, matching what a joined select produces.
        let mut out = Vec::new();
        for owner in owners {
            let mut expansion = vec![owner];
            for relationship in entity.relationships {
                let link = match expansion[0].get(relationship.local_key) {
                    Some(value) if !value.is_null() => value.clone(),
                    _ => continue,
                };
                let related: Vec<Record> = self
                    .table(StoreOperation::Query, relationship.target)?
                    .rows
                    .iter()
                    .filter(|row| {
                        row.get(relationship.foreign_key)
                            .is_some_and(|value| value.matches(&link))
                    })
                    .cloned()
                    .collect();
                if related.is_empty() {
                    continue;
                }
                let mut next = Vec::with_capacity(expansion.len() * related.len());
                for row in expansion {
                    for related_row in &related {
                        let mut cloned = row.clone();
                        cloned.attach_related(relationship.name, related_row.clone());
                        next.push(cloned);
                    }
                }
                expansion = next;
            }
            out.extend(expansion);
        }
        Ok(out)
    }

    async fn insert(
        &mut self,
        entity: &'static EntityDescriptor,
        mut record: Record,
    ) -> StoreResult<Record> {
        let table = self.table_mut(StoreOperation::Insert, entity)?;

        for column in entity.generated_columns() {
            match record.get(column.name).and_then(Value::as_int) {
                // Explicit value into a generated column; keep the counter
                // ahead of it.
                Some(provided) => table.next_id = table.next_id.max(provided),
                None => {
                    table.next_id += 1;
                    record.set(column.name, Value::Int(table.next_id));
                }
            }
        }

        let identity = key_identity(&record, entity);
        if table
            .rows
            .iter()
            .any(|row| key_identity(row, entity) == identity)
        {
            return Err(StoreError::unique_violation(
                StoreOperation::Insert,
                format!("duplicate primary key for `{}`", entity.table),
            )
            .with_context(entity.table));
        }

        for column in entity.unique_columns() {
            if let Some(value) = record.get(column.name) {
                if !value.is_null()
                    && table
                        .rows
                        .iter()
                        .any(|row| row.get(column.name).is_some_and(|v| v.matches(value)))
                {
                    return Err(StoreError::unique_violation(
                        StoreOperation::Insert,
                        format!("duplicate value for unique column `{}`", column.name),
                    )
                    .with_context(format!("{}.{}", entity.table, column.name)));
                }
            }
        }

        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
        values: &Record,
    ) -> StoreResult<u64> {
        let table = self.table_mut(StoreOperation::Update, entity)?;
        let mut affected = 0;
        for row in table.rows.iter_mut() {
            if criteria.matches(row) {
                for (column, value) in values.fields() {
                    row.set(column, value.clone());
                }
                affected += 1;
            }
        }
        if affected > 0 {
            Self::check_unique_columns(table, entity)?;
        }
        Ok(affected)
    }

    async fn delete(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<u64> {
        let table = self.table_mut(StoreOperation::Delete, entity)?;
        let before = table.rows.len();
        table.rows.retain(|row| !criteria.matches(row));
        Ok((before - table.rows.len()) as u64)
    }

    async fn exists(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<bool> {
        Ok(self
            .table(StoreOperation::Query, entity)?
            .rows
            .iter()
            .any(|row| criteria.matches(row)))
    }

    async fn count(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> StoreResult<u64> {
        Ok(self
            .table(StoreOperation::Query, entity)?
            .rows
            .iter()
            .filter(|row| criteria.matches(row))
            .count() as u64)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        let mut shared = this.shared.lock().map_err(|_| poisoned())?;
        *shared = this.staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnDef, ColumnType};
    use crate::repository::select_all;

    static COLUMNS: [ColumnDef; 3] = [
        ColumnDef::new("tank_id", ColumnType::Int).generated(),
        ColumnDef::new("tank_code", ColumnType::Text).unique(),
        ColumnDef::new("tank_name", ColumnType::Text),
    ];

    static TANK: EntityDescriptor = EntityDescriptor {
        entity: "Tank",
        table: "tank",
        columns: &COLUMNS,
        primary_key: &["tank_id"],
        relationships: &[],
    };

    fn schema() -> Schema {
        Schema::new().register(&TANK)
    }

    fn tank_record(code: &str, name: &str) -> Record {
        Record::new()
            .with("tank_id", Value::Null)
            .with("tank_code", code)
            .with("tank_name", name)
    }

    #[tokio::test]
    async fn test_insert_assigns_generated_id() {
        let store = MemoryStore::new();
        store.create_schema(&schema()).await.unwrap();

        let mut session = store.begin().await.unwrap();
        let first = session.insert(&TANK, tank_record("a", "one")).await.unwrap();
        let second = session.insert(&TANK, tank_record("b", "two")).await.unwrap();
        assert_eq!(first.int("tank_id").unwrap(), 1);
        assert_eq!(second.int("tank_id").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_uncommitted_session_is_invisible() {
        let store = MemoryStore::new();
        store.create_schema(&schema()).await.unwrap();

        let mut session = store.begin().await.unwrap();
        session.insert(&TANK, tank_record("a", "one")).await.unwrap();
        drop(session);

        let mut reader = store.begin().await.unwrap();
        let count = reader.count(&TANK, &Criteria::none()).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_rows() {
        let store = MemoryStore::new();
        store.create_schema(&schema()).await.unwrap();

        let mut session = store.begin().await.unwrap();
        session.insert(&TANK, tank_record("a", "one")).await.unwrap();
        session.commit().await.unwrap();

        let mut reader = store.begin().await.unwrap();
        let rows = reader.select(&select_all(&TANK)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("tank_code").unwrap(), "a");
    }

    #[tokio::test]
    async fn test_unique_column_rejected_within_session() {
        let store = MemoryStore::new();
        store.create_schema(&schema()).await.unwrap();

        let mut session = store.begin().await.unwrap();
        session.insert(&TANK, tank_record("a", "one")).await.unwrap();
        let err = session
            .insert(&TANK, tank_record("a", "other"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::StoreErrorKind::UniqueViolation);
    }

    #[tokio::test]
    async fn test_missing_table_is_a_query_error() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        let err = session
            .insert(&TANK, tank_record("a", "one"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::StoreErrorKind::QueryFailed);
    }

    #[tokio::test]
    async fn test_drop_schema_removes_tables() {
        let store = MemoryStore::new();
        store.create_schema(&schema()).await.unwrap();
        store.drop_schema(&schema()).await.unwrap();

        let mut session = store.begin().await.unwrap();
        assert!(session.count(&TANK, &Criteria::none()).await.is_err());
    }
}
