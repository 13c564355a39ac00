//! # aquasense-data
//!
//! Data-access core for the AquaSense aquaculture sensor platform: one
//! generic repository abstraction shared by every entity type (facilities,
//! sensor readings), over swappable store backends.
//!
//! ## Features
//!
//! - **Generic repository**: create / update / save (upsert) / delete /
//!   conditional delete / lookups / existence / counting for any type
//!   implementing the [`entity::Entity`] contract
//! - **Static entity descriptors**: primary keys (scalar or composite),
//!   unique columns and relationships declared once per type, no runtime
//!   reflection
//! - **Relationship-aware planning**: eager-loading selects with
//!   join-fan-out deduplication
//! - **Scoped sessions**: one transaction per unit of work, typed error
//!   translation at the session boundary, release on every exit path
//! - **Backends**: PostgreSQL via sqlx (feature `database`, default) and an
//!   in-memory store for tests/dev
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use aquasense_data::prelude::*;
//!
//! # async fn run() -> Result<(), DataError> {
//! let config = DatabaseConfig::load()?;
//! let store = Arc::new(PostgresStore::connect(&config).await?);
//! let schema = Schema::new()
//!     .register(&aquasense_data::facility::WATER_TANK_CENTER)
//!     .register(&aquasense_data::facility::WATER_TANK_BUILDING)
//!     .register(&aquasense_data::facility::WATER_TANK);
//! let sessions = Arc::new(SessionManager::new(store, schema));
//!
//! let centers: WaterTankCenterRepository = Repository::new(sessions.clone());
//! let mut center = WaterTankCenter::new("north");
//! centers.create(&mut center).await?; // center.center_id is now assigned
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod facility;
pub mod repository;
pub mod sensor;
pub mod session;
pub mod store;

/// Commonly used types, importable in one line
pub mod prelude {
    pub use crate::config::DatabaseConfig;
    pub use crate::entity::{
        ColumnDef, ColumnType, Entity, EntityDescriptor, Key, Record, Relationship, Schema, Value,
    };
    pub use crate::error::{DataError, StoreError, StoreErrorKind, StoreOperation};
    pub use crate::facility::{
        WaterTank, WaterTankBuilding, WaterTankBuildingRepository, WaterTankCenter,
        WaterTankCenterRepository, WaterTankRepository,
    };
    pub use crate::repository::{Criteria, Repository};
    pub use crate::sensor::{
        WaterTankSensorRecord, WaterTankSensorRecordContent, WaterTankSensorRecordHistoryRepository,
        WaterTankSensorRecordRepository,
    };
    pub use crate::session::{SessionManager, SessionScope};
    pub use crate::store::{MemoryStore, Store, StoreSession};

    #[cfg(feature = "database")]
    pub use crate::store::PostgresStore;
}
