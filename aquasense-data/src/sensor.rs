//! Sensor domain: water-tank measurements
//!
//! One domain value, two persisted shapes: the latest-reading table keeps a
//! single row per tank (scalar key, upserted on every reading), while the
//! history table is append-only with a composite `(tank_id, recorded_at)`
//! key and rejects updates outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{ColumnDef, ColumnType, Entity, EntityDescriptor, Key, Record};
use crate::error::DataError;
use crate::repository::Repository;

/// Measured values from one tank sensor sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTankSensorRecordContent {
    /// Water temperature in Celsius
    pub temperature: f64,
    /// Acidity
    pub ph: f64,
    /// Dissolved oxygen in mg/L
    pub dissolved_oxygen: f64,
    /// Salinity in PSU
    pub salinity: f64,
    /// Measurement time
    pub recorded_at: DateTime<Utc>,
}

/// A sensor reading bound to a tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTankSensorRecord {
    /// Tank the reading belongs to
    pub tank_id: i64,
    /// Measured values
    pub content: WaterTankSensorRecordContent,
}

impl WaterTankSensorRecord {
    /// Bind measured content to a tank
    pub fn from_content(tank_id: i64, content: WaterTankSensorRecordContent) -> Self {
        Self { tank_id, content }
    }
}

static SENSOR_RECORD_COLUMNS: [ColumnDef; 6] = [
    ColumnDef::new("tank_id", ColumnType::Int),
    ColumnDef::new("temperature", ColumnType::Float),
    ColumnDef::new("ph", ColumnType::Float),
    ColumnDef::new("dissolved_oxygen", ColumnType::Float),
    ColumnDef::new("salinity", ColumnType::Float),
    ColumnDef::new("recorded_at", ColumnType::Timestamp),
];

/// Descriptor for [`WaterTankSensorRecordEntity`]
pub static WATER_TANK_SENSOR_RECORD: EntityDescriptor = EntityDescriptor {
    entity: "WaterTankSensorRecord",
    table: "water_tank_sensor_record",
    columns: &SENSOR_RECORD_COLUMNS,
    primary_key: &["tank_id"],
    relationships: &[],
};

/// Descriptor for [`WaterTankSensorRecordHistoryEntity`]
pub static WATER_TANK_SENSOR_RECORD_HISTORY: EntityDescriptor = EntityDescriptor {
    entity: "WaterTankSensorRecordHistory",
    table: "water_tank_sensor_record_history",
    columns: &SENSOR_RECORD_COLUMNS,
    primary_key: &["tank_id", "recorded_at"],
    relationships: &[],
};

fn record_from_parts(tank_id: i64, content: &WaterTankSensorRecordContent) -> Record {
    Record::new()
        .with("tank_id", tank_id)
        .with("temperature", content.temperature)
        .with("ph", content.ph)
        .with("dissolved_oxygen", content.dissolved_oxygen)
        .with("salinity", content.salinity)
        .with("recorded_at", content.recorded_at)
}

fn parts_from_record(record: &Record) -> Result<(i64, WaterTankSensorRecordContent), DataError> {
    Ok((
        record.int("tank_id")?,
        WaterTankSensorRecordContent {
            temperature: record.float("temperature")?,
            ph: record.float("ph")?,
            dissolved_oxygen: record.float("dissolved_oxygen")?,
            salinity: record.float("salinity")?,
            recorded_at: record.timestamp("recorded_at")?,
        },
    ))
}

/// Latest reading per tank, one row per tank
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankSensorRecordEntity {
    tank_id: i64,
    content: WaterTankSensorRecordContent,
}

impl Entity for WaterTankSensorRecordEntity {
    type Domain = WaterTankSensorRecord;

    fn descriptor() -> &'static EntityDescriptor {
        &WATER_TANK_SENSOR_RECORD
    }

    fn from_domain(domain: &Self::Domain) -> Self {
        Self {
            tank_id: domain.tank_id,
            content: domain.content.clone(),
        }
    }

    fn to_domain(&self) -> Self::Domain {
        WaterTankSensorRecord {
            tank_id: self.tank_id,
            content: self.content.clone(),
        }
    }

    // Measurements move, the original recording time stays.
    fn update(&mut self, domain: &Self::Domain) -> Result<(), DataError> {
        self.content.temperature = domain.content.temperature;
        self.content.ph = domain.content.ph;
        self.content.dissolved_oxygen = domain.content.dissolved_oxygen;
        self.content.salinity = domain.content.salinity;
        Ok(())
    }

    fn primary_key(&self) -> Key {
        Key::from(self.tank_id)
    }

    fn to_record(&self) -> Record {
        record_from_parts(self.tank_id, &self.content)
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        let (tank_id, content) = parts_from_record(record)?;
        Ok(Self { tank_id, content })
    }
}

/// Append-only reading history, one row per measurement
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankSensorRecordHistoryEntity {
    tank_id: i64,
    content: WaterTankSensorRecordContent,
}

impl Entity for WaterTankSensorRecordHistoryEntity {
    type Domain = WaterTankSensorRecord;

    fn descriptor() -> &'static EntityDescriptor {
        &WATER_TANK_SENSOR_RECORD_HISTORY
    }

    fn from_domain(domain: &Self::Domain) -> Self {
        Self {
            tank_id: domain.tank_id,
            content: domain.content.clone(),
        }
    }

    fn to_domain(&self) -> Self::Domain {
        WaterTankSensorRecord {
            tank_id: self.tank_id,
            content: self.content.clone(),
        }
    }

    fn update(&mut self, _domain: &Self::Domain) -> Result<(), DataError> {
        Err(DataError::ImmutableEntity {
            entity: WATER_TANK_SENSOR_RECORD_HISTORY.entity,
        })
    }

    fn primary_key(&self) -> Key {
        Key::from((self.tank_id, self.content.recorded_at))
    }

    fn to_record(&self) -> Record {
        record_from_parts(self.tank_id, &self.content)
    }

    fn from_record(record: &Record) -> Result<Self, DataError> {
        let (tank_id, content) = parts_from_record(record)?;
        Ok(Self { tank_id, content })
    }
}

/// Repository over the latest-reading table
pub type WaterTankSensorRecordRepository = Repository<WaterTankSensorRecordEntity>;

/// Repository over the append-only history table
pub type WaterTankSensorRecordHistoryRepository = Repository<WaterTankSensorRecordHistoryEntity>;
