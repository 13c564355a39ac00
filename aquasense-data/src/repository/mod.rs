//! Generic repository over the entity mapping contract
//!
//! This module is the public data-access surface:
//!
//! - [`Criteria`]: equality predicates built from primary keys or validated
//!   field maps
//! - [`Select`] and the planner functions: relationship-aware query shaping
//!   and join-fan-out resolution
//! - [`Repository`]: create / update / update_field / save / delete /
//!   delete_by / get_by_id / find_by_id / find_all / find_by / get_by /
//!   exist_by / count_by, parameterized by one entity type per instance
//!
//! # Example
//!
//! ```rust,ignore
//! use aquasense_data::prelude::*;
//!
//! let sessions = Arc::new(SessionManager::new(store, schema));
//! let tanks: WaterTankRepository = Repository::new(sessions.clone());
//!
//! let mut tank = WaterTank::new("t1", &building);
//! tanks.create(&mut tank).await?;          // tank.tank_id now set
//! let found = tanks.get_by(&[("tank_code", tank.tank_code.clone().into())]).await?;
//! ```

mod base;
mod criteria;
mod planner;

pub use base::Repository;
pub use criteria::{Criteria, Predicate};
pub use planner::{apply_criteria, resolve_list, resolve_single, select_all, Select};
