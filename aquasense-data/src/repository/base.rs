//! Generic repository
//!
//! One [`Repository`] instance serves one entity type. Every operation opens
//! its own session scope (one scope per call, never reused across calls),
//! runs its unit of work, and commits explicitly before returning when it
//! mutated anything. Read operations let the scope roll back on release.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::{Entity, Key, Record, Value};
use crate::error::DataError;
use crate::session::{SessionManager, SessionScope};

use super::criteria::Criteria;
use super::planner;

/// Generic data access for one entity type
pub struct Repository<E: Entity> {
    sessions: Arc<SessionManager>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Create a repository over a session manager
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        tracing::info!(entity = E::descriptor().entity, "initialize Repository");
        Self {
            sessions,
            _entity: PhantomData,
        }
    }

    fn not_found(key: &Key) -> DataError {
        DataError::NotFound {
            entity: E::descriptor().entity,
            key: key.to_string(),
        }
    }

    fn describe_fields(fields: &[(&str, Value)]) -> String {
        fields
            .iter()
            .map(|(field, value)| format!("{}={}", field, value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate a partial field map against the descriptor, producing the
    /// SET values for a targeted update
    fn validated_values(fields: &[(&str, Value)]) -> Result<Record, DataError> {
        let mut values = Record::new();
        for (field, value) in fields {
            let column = E::descriptor()
                .column(field)
                .ok_or_else(|| DataError::UnknownField {
                    entity: E::descriptor().entity,
                    field: (*field).to_string(),
                })?;
            values.set(column.name, value.clone());
        }
        Ok(values)
    }

    async fn select_by(
        scope: &mut SessionScope,
        criteria: Criteria,
    ) -> Result<Vec<Record>, DataError> {
        let select = planner::apply_criteria(planner::select_all(E::descriptor()), criteria);
        scope.select(&select).await
    }

    async fn find_entity_in(
        scope: &mut SessionScope,
        key: &Key,
    ) -> Result<Option<E>, DataError> {
        let criteria = Criteria::from_key(E::descriptor(), key)?;
        let rows = Self::select_by(scope, criteria).await?;
        match planner::resolve_single(rows, E::descriptor())? {
            Some(record) => Ok(Some(E::from_record(&record)?)),
            None => Ok(None),
        }
    }

    /// Insert the domain object and reflect the persisted row back into it
    async fn insert_in(
        &self,
        scope: &mut SessionScope,
        domain: &mut E::Domain,
    ) -> Result<(), DataError> {
        let entity = E::from_domain(domain);
        let persisted = match scope.insert(E::descriptor(), entity.to_record()).await {
            Err(DataError::Integrity { entity, detail }) => {
                return Err(DataError::AlreadyExists { entity, detail });
            }
            result => result?,
        };

        // With relationships the insert result lacks related rows; re-read
        // the persisted state in the same transaction.
        let persisted = if E::descriptor().has_relationships() {
            let key = E::from_record(&persisted)?.primary_key();
            let criteria = Criteria::from_key(E::descriptor(), &key)?;
            let rows = Self::select_by(scope, criteria).await?;
            planner::resolve_single(rows, E::descriptor())?
                .ok_or_else(|| Self::not_found(&key))?
        } else {
            persisted
        };

        *domain = E::from_record(&persisted)?.to_domain();
        Ok(())
    }

    /// Write the entity's current column values under its primary key
    async fn flush_update_in(scope: &mut SessionScope, entity: &E) -> Result<(), DataError> {
        let criteria = Criteria::from_key(E::descriptor(), &entity.primary_key())?;
        let record = entity.to_record();
        let mut values = Record::new();
        for (column, value) in record.fields() {
            if !E::descriptor().is_primary_key(column) {
                values.set(column, value.clone());
            }
        }
        scope.update(E::descriptor(), &criteria, &values).await?;
        Ok(())
    }

    /// Insert a new row from the domain object
    ///
    /// Store-generated fields (e.g., an autoincrement id) are copied back
    /// into the caller's domain object, so the reference reflects final
    /// persisted state without a fresh read.
    ///
    /// # Errors
    ///
    /// [`DataError::AlreadyExists`] when the insert violates a uniqueness
    /// constraint.
    pub async fn create(&self, domain: &mut E::Domain) -> Result<(), DataError> {
        let mut scope = self.sessions.session().await?;
        self.insert_in(&mut scope, domain).await?;
        scope.commit().await
    }

    /// Load the row matching the domain object's primary key and apply the
    /// entity's in-place field update
    ///
    /// # Errors
    ///
    /// [`DataError::NotFound`] when no row matches the key.
    pub async fn update(&self, domain: &E::Domain) -> Result<(), DataError> {
        let mut scope = self.sessions.session().await?;
        let key = E::from_domain(domain).primary_key();
        let mut entity = Self::find_entity_in(&mut scope, &key)
            .await?
            .ok_or_else(|| Self::not_found(&key))?;
        entity.update(domain)?;
        Self::flush_update_in(&mut scope, &entity).await?;
        scope.commit().await
    }

    /// Set specific columns on the row matching the key, without a
    /// load/mutate cycle
    ///
    /// Zero matched rows is a silent no-op, unlike [`update`](Self::update).
    pub async fn update_field(
        &self,
        key: impl Into<Key>,
        fields: &[(&str, Value)],
    ) -> Result<(), DataError> {
        let key = key.into();
        let values = Self::validated_values(fields)?;
        let criteria = Criteria::from_key(E::descriptor(), &key)?;
        let mut scope = self.sessions.session().await?;
        scope.update(E::descriptor(), &criteria, &values).await?;
        scope.commit().await
    }

    /// Upsert by resolved primary key
    ///
    /// When a row matches the key, the entity's update path runs; otherwise
    /// the insert path runs, generated-field copyback included. Concurrent
    /// saves against the same key resolve last-write-wins; there is no
    /// version token.
    pub async fn save(&self, domain: &mut E::Domain) -> Result<(), DataError> {
        let mut scope = self.sessions.session().await?;
        let key = E::from_domain(domain).primary_key();
        match Self::find_entity_in(&mut scope, &key).await? {
            Some(mut entity) => {
                entity.update(domain)?;
                Self::flush_update_in(&mut scope, &entity).await?;
            }
            None => self.insert_in(&mut scope, domain).await?,
        }
        scope.commit().await
    }

    /// Delete the row matching the primary key
    ///
    /// # Errors
    ///
    /// [`DataError::NotFound`] when zero rows were affected.
    pub async fn delete(&self, key: impl Into<Key>) -> Result<(), DataError> {
        let key = key.into();
        let criteria = Criteria::from_key(E::descriptor(), &key)?;
        let mut scope = self.sessions.session().await?;
        let affected = scope.delete(E::descriptor(), &criteria).await?;
        if affected == 0 {
            return Err(Self::not_found(&key));
        }
        scope.commit().await
    }

    /// Delete every row matching the field map
    ///
    /// Bulk semantics: zero matched rows is not an error, unlike
    /// [`delete`](Self::delete).
    pub async fn delete_by(&self, fields: &[(&str, Value)]) -> Result<(), DataError> {
        let criteria = Criteria::from_fields(E::descriptor(), fields)?;
        let mut scope = self.sessions.session().await?;
        scope.delete(E::descriptor(), &criteria).await?;
        scope.commit().await
    }

    /// Fetch exactly one domain object by primary key
    ///
    /// # Errors
    ///
    /// [`DataError::NotFound`] when the key matches nothing.
    pub async fn get_by_id(&self, key: impl Into<Key>) -> Result<E::Domain, DataError> {
        let key = key.into();
        let mut scope = self.sessions.session().await?;
        let entity = Self::find_entity_in(&mut scope, &key)
            .await?
            .ok_or_else(|| Self::not_found(&key))?;
        Ok(entity.to_domain())
    }

    /// Fetch the domain object by primary key, or `None` when absent
    pub async fn find_by_id(&self, key: impl Into<Key>) -> Result<Option<E::Domain>, DataError> {
        let key = key.into();
        let mut scope = self.sessions.session().await?;
        Ok(Self::find_entity_in(&mut scope, &key)
            .await?
            .map(|entity| entity.to_domain()))
    }

    /// Fetch every row, relationship-deduplicated
    pub async fn find_all(&self) -> Result<Vec<E::Domain>, DataError> {
        let mut scope = self.sessions.session().await?;
        let rows = scope.select(&planner::select_all(E::descriptor())).await?;
        planner::resolve_list(rows, E::descriptor())
            .iter()
            .map(|record| Ok(E::from_record(record)?.to_domain()))
            .collect()
    }

    /// Fetch every row matching all given fields (conjunction)
    pub async fn find_by(&self, fields: &[(&str, Value)]) -> Result<Vec<E::Domain>, DataError> {
        let criteria = Criteria::from_fields(E::descriptor(), fields)?;
        let mut scope = self.sessions.session().await?;
        let rows = Self::select_by(&mut scope, criteria).await?;
        planner::resolve_list(rows, E::descriptor())
            .iter()
            .map(|record| Ok(E::from_record(record)?.to_domain()))
            .collect()
    }

    /// First match of [`find_by`](Self::find_by)
    ///
    /// # Errors
    ///
    /// [`DataError::NotFound`] when nothing matches.
    pub async fn get_by(&self, fields: &[(&str, Value)]) -> Result<E::Domain, DataError> {
        let described = Self::describe_fields(fields);
        let domains = self.find_by(fields).await?;
        domains
            .into_iter()
            .next()
            .ok_or_else(|| DataError::NotFound {
                entity: E::descriptor().entity,
                key: described,
            })
    }

    /// True when at least one row matches the field map
    pub async fn exist_by(&self, fields: &[(&str, Value)]) -> Result<bool, DataError> {
        let criteria = Criteria::from_fields(E::descriptor(), fields)?;
        let mut scope = self.sessions.session().await?;
        scope.exists(E::descriptor(), &criteria).await
    }

    /// Number of rows matching the field map
    pub async fn count_by(&self, fields: &[(&str, Value)]) -> Result<u64, DataError> {
        let criteria = Criteria::from_fields(E::descriptor(), fields)?;
        let mut scope = self.sessions.session().await?;
        scope.count(E::descriptor(), &criteria).await
    }
}
