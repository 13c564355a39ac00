//! Facility domain: centers, buildings and water tanks
//!
//! A center owns buildings, a building owns tanks. Codes are composed at
//! construction time (`{center_id}_{building_name}`,
//! `{building_code}_{tank_name}`) and are unique across the installation,
//! which is what external callers address tanks by.

use serde::{Deserialize, Serialize};

use crate::entity::{ColumnDef, ColumnType, Entity, EntityDescriptor, Key, Record, Value};
use crate::error::DataError;
use crate::repository::Repository;

/// A water-tank center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTankCenter {
    /// Primary key, store-assigned on first insert
    pub center_id: Option<i64>,
    /// Center name
    pub center_name: String,
}

impl WaterTankCenter {
    /// New center with an unset id
    pub fn new(center_name: impl Into<String>) -> Self {
        Self {
            center_id: None,
            center_name: center_name.into(),
        }
    }
}

/// A building inside a center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTankBuilding {
    /// Primary key, store-assigned on first insert
    pub building_id: Option<i64>,
    /// Building name
    pub building_name: String,
    /// Unique code, `{center_id}_{building_name}`
    pub building_code: String,
    /// Owning center id
    pub center_id: Option<i64>,
}

impl WaterTankBuilding {
    /// New building under a persisted center
    pub fn new(building_name: impl Into<String>, center: &WaterTankCenter) -> Self {
        let building_name = building_name.into();
        Self {
            building_id: None,
            building_code: format!("{}_{}", center.center_id.unwrap_or_default(), building_name),
            building_name,
            center_id: center.center_id,
        }
    }
}

/// A water tank inside a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTank {
    /// Primary key, store-assigned on first insert
    pub tank_id: Option<i64>,
    /// Tank name
    pub tank_name: String,
    /// Unique code, `{building_code}_{tank_name}`; external callers address
    /// tanks by this
    pub tank_code: String,
    /// Owning center id
    pub center_id: Option<i64>,
    /// Owning building id
    pub building_id: Option<i64>,
}

impl WaterTank {
    /// New tank under a persisted building
    pub fn new(tank_name: impl Into<String>, building: &WaterTankBuilding) -> Self {
        let tank_name = tank_name.into();
        Self {
            tank_id: None,
            tank_code: format!("{}_{}", building.building_code, tank_name),
            tank_name,
            center_id: building.center_id,
            building_id: building.building_id,
        }
    }
}

static WATER_TANK_CENTER_COLUMNS: [ColumnDef; 2] = [
    ColumnDef::new("center_id", ColumnType::Int).generated(),
    ColumnDef::new("center_name", ColumnType::Text),
];

/// Descriptor for [`WaterTankCenterEntity`]
pub static WATER_TANK_CENTER: EntityDescriptor = EntityDescriptor {
    entity: "WaterTankCenter",
    table: "water_tank_center",
    columns: &WATER_TANK_CENTER_COLUMNS,
    primary_key: &["center_id"],
    relationships: &[],
};

static WATER_TANK_BUILDING_COLUMNS: [ColumnDef; 4] = [
    ColumnDef::new("building_id", ColumnType::Int).generated(),
    ColumnDef::new("building_name", ColumnType::Text),
    ColumnDef::new("building_code", ColumnType::Text).unique(),
    ColumnDef::new("center_id", ColumnType::Int),
];

/// Descriptor for [`WaterTankBuildingEntity`]
pub static WATER_TANK_BUILDING: EntityDescriptor = EntityDescriptor {
    entity: "WaterTankBuilding",
    table: "water_tank_building",
    columns: &WATER_TANK_BUILDING_COLUMNS,
    primary_key: &["building_id"],
    relationships: &[],
};

static WATER_TANK_COLUMNS: [ColumnDef; 5] = [
    ColumnDef::new("tank_id", ColumnType::Int).generated(),
    ColumnDef::new("tank_name", ColumnType::Text),
    ColumnDef::new("tank_code", ColumnType::Text).unique(),
    ColumnDef::new("center_id", ColumnType::Int),
    ColumnDef::new("building_id", ColumnType::Int),
];

/// Descriptor for [`WaterTankEntity`]
pub static WATER_TANK: EntityDescriptor = EntityDescriptor {
    entity: "WaterTank",
    table: "water_tank",
    columns: &WATER_TANK_COLUMNS,
    primary_key: &["tank_id"],
    relationships: &[],
};

/// Persisted projection of [`WaterTankCenter`]
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankCenterEntity {
    center_id: Option<i64>,
    center_name: String,
}

impl Entity for WaterTankCenterEntity {
    type Domain = WaterTankCenter;

    fn descriptor() -> &'static EntityDescriptor {
        &WATER_TANK_CENTER
    }

    fn from_domain(domain: &Self::Domain) -> Self {
        Self {
            center_id: domain.center_id,
            center_name: domain.center_name.clone(),
        }
    }

    fn to_domain(&self) -> Self::Domain {
        WaterTankCenter {
            center_id: self.center_id,
            center_name: self.center_name.clone(),
        }
    }

    fn update(&mut self, domain: &Self::Domain) -> Result<(), DataError> {
        self.center_name = domain.center_name.clone();
        Ok(())
    }

    fn primary_key(&self) -> Key {
        Key::Scalar(Value::from(self.center_id))
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("center_id", self.center_id)
            .with("center_name", self.center_name.clone())
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        Ok(Self {
            center_id: record.opt_int("center_id")?,
            center_name: record.text("center_name")?,
        })
    }
}

/// Persisted projection of [`WaterTankBuilding`]
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankBuildingEntity {
    building_id: Option<i64>,
    building_name: String,
    building_code: String,
    center_id: Option<i64>,
}

impl Entity for WaterTankBuildingEntity {
    type Domain = WaterTankBuilding;

    fn descriptor() -> &'static EntityDescriptor {
        &WATER_TANK_BUILDING
    }

    fn from_domain(domain: &Self::Domain) -> Self {
        Self {
            building_id: domain.building_id,
            building_name: domain.building_name.clone(),
            building_code: domain.building_code.clone(),
            center_id: domain.center_id,
        }
    }

    fn to_domain(&self) -> Self::Domain {
        WaterTankBuilding {
            building_id: self.building_id,
            building_name: self.building_name.clone(),
            building_code: self.building_code.clone(),
            center_id: self.center_id,
        }
    }

    // Ownership ids never move on update, only the naming fields.
    fn update(&mut self, domain: &Self::Domain) -> Result<(), DataError> {
        self.building_name = domain.building_name.clone();
        self.building_code = domain.building_code.clone();
        Ok(())
    }

    fn primary_key(&self) -> Key {
        Key::Scalar(Value::from(self.building_id))
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("building_id", self.building_id)
            .with("building_name", self.building_name.clone())
            .with("building_code", self.building_code.clone())
            .with("center_id", self.center_id)
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        Ok(Self {
            building_id: record.opt_int("building_id")?,
            building_name: record.text("building_name")?,
            building_code: record.text("building_code")?,
            center_id: record.opt_int("center_id")?,
        })
    }
}

/// Persisted projection of [`WaterTank`]
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankEntity {
    tank_id: Option<i64>,
    tank_name: String,
    tank_code: String,
    center_id: Option<i64>,
    building_id: Option<i64>,
}

impl Entity for WaterTankEntity {
    type Domain = WaterTank;

    fn descriptor() -> &'static EntityDescriptor {
        &WATER_TANK
    }

    fn from_domain(domain: &Self::Domain) -> Self {
        Self {
            tank_id: domain.tank_id,
            tank_name: domain.tank_name.clone(),
            tank_code: domain.tank_code.clone(),
            center_id: domain.center_id,
            building_id: domain.building_id,
        }
    }

    fn to_domain(&self) -> Self::Domain {
        WaterTank {
            tank_id: self.tank_id,
            tank_name: self.tank_name.clone(),
            tank_code: self.tank_code.clone(),
            center_id: self.center_id,
            building_id: self.building_id,
        }
    }

    // Ownership ids never move on update, only the naming fields.
    fn update(&mut self, domain: &Self::Domain) -> Result<(), DataError> {
        self.tank_name = domain.tank_name.clone();
        self.tank_code = domain.tank_code.clone();
        Ok(())
    }

    fn primary_key(&self) -> Key {
        Key::Scalar(Value::from(self.tank_id))
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("tank_id", self.tank_id)
            .with("tank_name", self.tank_name.clone())
            .with("tank_code", self.tank_code.clone())
            .with("center_id", self.center_id)
            .with("building_id", self.building_id)
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        Ok(Self {
            tank_id: record.opt_int("tank_id")?,
            tank_name: record.text("tank_name")?,
            tank_code: record.text("tank_code")?,
            center_id: record.opt_int("center_id")?,
            building_id: record.opt_int("building_id")?,
        })
    }
}

/// Repository over [`WaterTankCenterEntity`]
pub type WaterTankCenterRepository = Repository<WaterTankCenterEntity>;

/// Repository over [`WaterTankBuildingEntity`]
pub type WaterTankBuildingRepository = Repository<WaterTankBuildingEntity>;

/// Repository over [`WaterTankEntity`]
pub type WaterTankRepository = Repository<WaterTankEntity>;

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted_center() -> WaterTankCenter {
        WaterTankCenter {
            center_id: Some(3),
            center_name: "north".to_string(),
        }
    }

    #[test]
    fn test_codes_compose_from_parents() {
        let center = persisted_center();
        let building = WaterTankBuilding::new("b1", &center);
        assert_eq!(building.building_code, "3_b1");
        assert_eq!(building.center_id, Some(3));

        let persisted_building = WaterTankBuilding {
            building_id: Some(8),
            ..building
        };
        let tank = WaterTank::new("t2", &persisted_building);
        assert_eq!(tank.tank_code, "3_b1_t2");
        assert_eq!(tank.center_id, Some(3));
        assert_eq!(tank.building_id, Some(8));
    }

    #[test]
    fn test_tank_round_trip() {
        let center = persisted_center();
        let building = WaterTankBuilding::new("b1", &center);
        let tank = WaterTank::new("t1", &building);
        let entity = WaterTankEntity::from_domain(&tank);
        assert_eq!(entity.to_domain(), tank);
    }

    #[test]
    fn test_tank_record_round_trip() {
        let tank = WaterTank {
            tank_id: Some(5),
            tank_name: "t1".to_string(),
            tank_code: "3_b1_t1".to_string(),
            center_id: Some(3),
            building_id: Some(8),
        };
        let entity = WaterTankEntity::from_domain(&tank);
        let rebuilt = WaterTankEntity::from_record(&entity.to_record()).unwrap();
        assert_eq!(rebuilt, entity);
    }

    #[test]
    fn test_update_keeps_ownership_ids() {
        let mut entity = WaterTankEntity {
            tank_id: Some(5),
            tank_name: "old".to_string(),
            tank_code: "3_b1_old".to_string(),
            center_id: Some(3),
            building_id: Some(8),
        };
        let incoming = WaterTank {
            tank_id: Some(5),
            tank_name: "new".to_string(),
            tank_code: "3_b1_new".to_string(),
            center_id: Some(99),
            building_id: Some(99),
        };
        entity.update(&incoming).unwrap();
        assert_eq!(entity.tank_name, "new");
        assert_eq!(entity.center_id, Some(3));
        assert_eq!(entity.building_id, Some(8));
    }

    #[test]
    fn test_unset_key_is_null_scalar() {
        let entity = WaterTankCenterEntity::from_domain(&WaterTankCenter::new("n"));
        assert_eq!(entity.primary_key(), Key::Scalar(Value::Null));
    }
}
