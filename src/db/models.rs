use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::error::{CoreError, Result};

/// Mirrors a row of the `devices` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub device_id: i32,
    pub device_name: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Device {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            device_id: row.try_get("device_id")?,
            device_name: row.try_get("device_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Mirrors a row of the `sensor_data` table.
///
/// `reading_id` is not part of the entity; it only orders ties.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub device_id: i32,
    pub temp: f64,
    pub humidity: f64,
    pub light_level: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
    pub date_time: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SensorReading {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            device_id: row.try_get("device_id")?,
            temp: row.try_get("temp")?,
            humidity: row.try_get("humidity")?,
            light_level: row.try_get("light_level")?,
            soil_moisture: row.try_get("soil_moisture")?,
            water_level: row.try_get("water_level")?,
            date_time: row.try_get("date_time")?,
        })
    }
}

/// Measurements submitted for ingestion. Carries no timestamp: `date_time`
/// is stamped from the server clock when the row is written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSensorReading {
    pub device_id: i32,
    pub temp: f64,
    pub humidity: f64,
    pub light_level: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
}

impl NewSensorReading {
    /// Any finite value is accepted; NaN and infinities are rejected.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("temp", self.temp),
            ("humidity", self.humidity),
            ("light_level", self.light_level),
            ("soil_moisture", self.soil_moisture),
            ("water_level", self.water_level),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(CoreError::validation(format!(
                "{name} must be a finite number, got {v}"
            ))),
            None => Ok(()),
        }
    }

    pub fn stamped(self, date_time: DateTime<Utc>) -> SensorReading {
        SensorReading {
            device_id: self.device_id,
            temp: self.temp,
            humidity: self.humidity,
            light_level: self.light_level,
            soil_moisture: self.soil_moisture,
            water_level: self.water_level,
            date_time,
        }
    }
}
