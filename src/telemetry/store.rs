use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{TelemetryRepository, TimeRange};
use crate::{
    db::models::{NewSensorReading, SensorReading},
    error::{CoreError, Result},
};

/// Postgres-backed [`TelemetryRepository`] over the `sensor_data` table.
#[derive(Clone)]
pub struct TelemetryStore {
    pool: PgPool,
}

impl TelemetryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TelemetryRepository for TelemetryStore {
    async fn latest(&self, device_id: i32) -> Result<SensorReading> {
        debug!(device_id = %device_id, "Fetching latest sensor data");

        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT device_id, temp, humidity, light_level,
                   soil_moisture, water_level, date_time
            FROM sensor_data
            WHERE device_id = $1
            ORDER BY date_time DESC, reading_id DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::store("latest sensor data", format!("device_id={device_id}"), e))?
        .ok_or_else(|| CoreError::not_found("sensor reading", device_id))
    }

    async fn historic(&self, device_id: i32) -> Result<Vec<SensorReading>> {
        debug!(device_id = %device_id, "Fetching historic sensor data");

        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT device_id, temp, humidity, light_level,
                   soil_moisture, water_level, date_time
            FROM sensor_data
            WHERE device_id = $1
            ORDER BY date_time DESC, reading_id DESC
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::store("historic sensor data", format!("device_id={device_id}"), e))
    }

    async fn by_period(&self, device_id: i32, range: TimeRange) -> Result<Vec<SensorReading>> {
        debug!(
            device_id = %device_id,
            start = %range.start(),
            end = %range.end(),
            "Fetching sensor data by period"
        );

        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT device_id, temp, humidity, light_level,
                   soil_moisture, water_level, date_time
            FROM sensor_data
            WHERE device_id = $1
              AND date_time BETWEEN $2 AND $3
            ORDER BY date_time DESC, reading_id DESC
            "#,
        )
        .bind(device_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::store("sensor data by period", format!("device_id={device_id}"), e))
    }

    async fn ingest(&self, reading: NewSensorReading) -> Result<SensorReading> {
        reading.validate()?;
        let device_id = reading.device_id;

        let stored = sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_data
                (device_id, temp, humidity, light_level,
                 soil_moisture, water_level, date_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING device_id, temp, humidity, light_level,
                      soil_moisture, water_level, date_time
            "#,
        )
        .bind(device_id)
        .bind(reading.temp)
        .bind(reading.humidity)
        .bind(reading.light_level)
        .bind(reading.soil_moisture)
        .bind(reading.water_level)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::store("ingest sensor data", format!("device_id={device_id}"), e))?;

        info!(device_id = %device_id, date_time = %stored.date_time, "Sensor data ingested");
        Ok(stored)
    }
}
