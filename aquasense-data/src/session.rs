//! Scoped transactional sessions
//!
//! The [`SessionManager`] owns the store handle and hands out one
//! [`SessionScope`] per logical unit of work. A scope wraps one backend
//! transaction and is the single point where store failures are classified
//! into the typed error taxonomy:
//!
//! - a missing required row becomes [`DataError::NotFound`],
//! - unique/constraint violations become [`DataError::Integrity`],
//! - everything else is logged and propagated unchanged as
//!   [`DataError::Store`].
//!
//! Commit is explicit and consumes the scope; the manager never
//! auto-commits. A scope dropped without committing (error path, early
//! return, abandoned task) takes its backend transaction down with it, so
//! the session is released on every exit path and no partial state can be
//! observed.

use std::sync::Arc;

use crate::entity::{EntityDescriptor, Record, Schema};
use crate::error::{DataError, StoreError, StoreErrorKind};
use crate::repository::{Criteria, Select};
use crate::store::{Store, StoreSession};

/// Owns the store and creates transactional session scopes
pub struct SessionManager {
    store: Arc<dyn Store>,
    schema: Schema,
}

impl SessionManager {
    /// Create a manager over a store backend and its registered schema
    pub fn new(store: Arc<dyn Store>, schema: Schema) -> Self {
        tracing::info!(
            entities = schema.descriptors().len(),
            "initialize SessionManager"
        );
        Self { store, schema }
    }

    /// Begin a session scope bound to the calling unit of work
    pub async fn session(&self) -> Result<SessionScope, DataError> {
        let session = self.store.begin().await?;
        Ok(SessionScope {
            session: Some(session),
        })
    }

    /// Create every registered table (test/bootstrap collaborators only)
    pub async fn create_schema(&self) -> Result<(), DataError> {
        self.store.create_schema(&self.schema).await?;
        Ok(())
    }

    /// Drop every registered table (test/bootstrap collaborators only)
    pub async fn drop_schema(&self) -> Result<(), DataError> {
        self.store.drop_schema(&self.schema).await?;
        Ok(())
    }
}

/// One transactional session, exclusively owned by the call that created it
pub struct SessionScope {
    session: Option<Box<dyn StoreSession>>,
}

impl SessionScope {
    fn inner(&mut self) -> Result<&mut dyn StoreSession, DataError> {
        match self.session.as_mut() {
            Some(session) => Ok(session.as_mut()),
            None => Err(DataError::Store(StoreError::transaction_failed(
                "session scope already closed",
            ))),
        }
    }

    fn translate(entity: &'static EntityDescriptor, err: StoreError) -> DataError {
        match err.kind {
            StoreErrorKind::NotFound => DataError::NotFound {
                entity: entity.entity,
                key: err.message,
            },
            StoreErrorKind::UniqueViolation | StoreErrorKind::ConstraintViolation => {
                DataError::Integrity {
                    entity: entity.entity,
                    detail: err.message,
                }
            }
            _ => {
                tracing::error!(
                    entity = entity.entity,
                    error = %err,
                    "session rollback because of store error"
                );
                DataError::Store(err)
            }
        }
    }

    /// Execute a planned select
    pub async fn select(&mut self, select: &Select) -> Result<Vec<Record>, DataError> {
        let entity = select.entity;
        self.inner()?
            .select(select)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Insert one row, returning the persisted record
    pub async fn insert(
        &mut self,
        entity: &'static EntityDescriptor,
        record: Record,
    ) -> Result<Record, DataError> {
        self.inner()?
            .insert(entity, record)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Update matching rows, returning the affected count
    pub async fn update(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
        values: &Record,
    ) -> Result<u64, DataError> {
        self.inner()?
            .update(entity, criteria, values)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Delete matching rows, returning the affected count
    pub async fn delete(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> Result<u64, DataError> {
        self.inner()?
            .delete(entity, criteria)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Existence check
    pub async fn exists(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> Result<bool, DataError> {
        self.inner()?
            .exists(entity, criteria)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Row count
    pub async fn count(
        &mut self,
        entity: &'static EntityDescriptor,
        criteria: &Criteria,
    ) -> Result<u64, DataError> {
        self.inner()?
            .count(entity, criteria)
            .await
            .map_err(|e| Self::translate(entity, e))
    }

    /// Commit the transaction, consuming the scope
    pub async fn commit(mut self) -> Result<(), DataError> {
        match self.session.take() {
            Some(session) => {
                session.commit().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Roll the transaction back, consuming the scope
    pub async fn rollback(mut self) -> Result<(), DataError> {
        match self.session.take() {
            Some(session) => {
                session.rollback().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        if self.session.is_some() {
            // Read-only scopes and error paths land here; the backend
            // transaction rolls back when its handle is dropped.
            tracing::trace!("session scope released without commit");
        }
    }
}
