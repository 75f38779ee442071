use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::{Device, NewSensorReading, SensorReading};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeviceDto {
    pub device_id: i32,
    pub device_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Device> for DeviceDto {
    fn from(d: Device) -> Self {
        Self {
            device_id: d.device_id,
            device_name: d.device_name,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    pub device_id: i32,
    /// Degrees Celsius
    pub temp: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub light_level: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
    /// Server time at ingestion (RFC3339, UTC).
    pub date_time: DateTime<Utc>,
}

impl From<SensorReading> for SensorReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            device_id: r.device_id,
            temp: r.temp,
            humidity: r.humidity,
            light_level: r.light_level,
            soil_moisture: r.soil_moisture,
            water_level: r.water_level,
            date_time: r.date_time,
        }
    }
}

/// Request body for `POST /devices/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterDeviceRequest {
    pub device_name: String,
}

/// Request body for `POST /sensorData/period/{id}`.
///
/// Bounds are kept as strings so a malformed timestamp surfaces as a
/// validation error naming the offending bound.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PeriodRequest {
    /// Start of time range (RFC3339, inclusive).
    pub start: String,
    /// End of time range (RFC3339, inclusive).
    pub end: String,
}

/// Request body for `POST /sensorData/sendData/{id}`.
///
/// Unknown fields, including any client-side `date_time`, are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendSensorDataRequest {
    pub temp: f64,
    pub humidity: f64,
    pub light_level: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
}

impl SendSensorDataRequest {
    pub fn for_device(self, device_id: i32) -> NewSensorReading {
        NewSensorReading {
            device_id,
            temp: self.temp,
            humidity: self.humidity,
            light_level: self.light_level,
            soil_moisture: self.soil_moisture,
            water_level: self.water_level,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}
