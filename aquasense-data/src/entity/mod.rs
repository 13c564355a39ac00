//! Entity mapping contract
//!
//! An entity is the persisted projection of a domain object: it knows its
//! static [`EntityDescriptor`], converts to and from the domain value, and
//! serializes itself into the [`Record`] form the store seam speaks.
//! Implementations are pure: no I/O, no shared state.
//!
//! Round-trip fidelity is part of the contract: `from_domain(d).to_domain()`
//! reproduces every field shared by both representations, except columns the
//! store assigns before the entity has been persisted.

mod descriptor;
mod key;
mod record;
mod value;

pub use descriptor::{ColumnDef, ColumnType, EntityDescriptor, Relationship, Schema};
pub use key::Key;
pub use record::Record;
pub use value::{Value, ValueIdentity};

use crate::error::DataError;

/// Persisted projection of a domain object
pub trait Entity: Sized + Send + Sync + 'static {
    /// The domain value this entity projects
    type Domain: Send + Sync;

    /// Static metadata for this entity type
    fn descriptor() -> &'static EntityDescriptor;

    /// Construct an entity reflecting the domain object's fields
    fn from_domain(domain: &Self::Domain) -> Self;

    /// Project the persisted state back to a domain object
    fn to_domain(&self) -> Self::Domain;

    /// Mutate selected in-place fields from a domain object
    ///
    /// Implementations may deliberately omit store-assigned fields. Entity
    /// types that forbid updates (append-only history records) return
    /// [`DataError::ImmutableEntity`] instead of silently ignoring the call.
    fn update(&mut self, domain: &Self::Domain) -> Result<(), DataError>;

    /// Primary-key value, scalar or composite per the descriptor
    fn primary_key(&self) -> Key;

    /// Serialize into the record form handed to the store
    fn to_record(&self) -> Record;

    /// Rebuild an entity from a persisted record
    fn from_record(record: &Record) -> Result<Self, DataError>;
}
