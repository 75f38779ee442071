use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    db::models::{Device, NewSensorReading, SensorReading},
    devices::DeviceRepository,
    error::{CoreError, Result},
    telemetry::{TelemetryRepository, TimeRange},
};

/// Constraint violations the in-memory store reports in place of Postgres.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("insert on sensor_data violates foreign key: device_id {0} is not present in devices")]
    UnknownDevice(i32),

    #[error("delete on devices violates foreign key: device_id {0} is still referenced from sensor_data")]
    DeviceHasReadings(i32),
}

#[derive(Default)]
struct Tables {
    devices: BTreeMap<i32, Device>,
    last_device_id: i32,
    /// Append-only, in insertion order.
    readings: Vec<SensorReading>,
}

/// In-memory implementation of both [`DeviceRepository`] and
/// [`TelemetryRepository`] with the same ordering and constraint behaviour as
/// the Postgres schema.
///
/// Wrapped in `Arc` so clones share state across tasks.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readings for `device_id` matching `keep`, newest first. The sort is
    /// stable over reverse insertion order, so equal timestamps come out
    /// newest insert first.
    async fn select(&self, device_id: i32, keep: impl Fn(&SensorReading) -> bool) -> Vec<SensorReading> {
        let tables = self.inner.read().await;
        let mut rows: Vec<SensorReading> = tables
            .readings
            .iter()
            .rev()
            .filter(|r| r.device_id == device_id && keep(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        rows
    }

    async fn insert(&self, reading: NewSensorReading, date_time: DateTime<Utc>) -> Result<SensorReading> {
        let mut tables = self.inner.write().await;
        if !tables.devices.contains_key(&reading.device_id) {
            return Err(CoreError::store(
                "ingest sensor data",
                format!("device_id={}", reading.device_id),
                MemoryStoreError::UnknownDevice(reading.device_id),
            ));
        }
        let stored = reading.stamped(date_time);
        tables.readings.push(stored.clone());
        Ok(stored)
    }
}

impl DeviceRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Device>> {
        Ok(self.inner.read().await.devices.values().cloned().collect())
    }

    async fn get_by_id(&self, device_id: i32) -> Result<Device> {
        self.inner
            .read()
            .await
            .devices
            .get(&device_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("device", device_id))
    }

    async fn create(&self, device_name: &str) -> Result<Device> {
        let mut tables = self.inner.write().await;
        tables.last_device_id += 1;
        let device = Device {
            device_id: tables.last_device_id,
            device_name: device_name.to_owned(),
            created_at: Utc::now().trunc_subsecs(6),
        };
        tables.devices.insert(device.device_id, device.clone());
        Ok(device)
    }

    async fn delete(&self, device_id: i32) -> Result<()> {
        let mut tables = self.inner.write().await;
        if tables.readings.iter().any(|r| r.device_id == device_id) {
            return Err(CoreError::store(
                "delete device",
                format!("device_id={device_id}"),
                MemoryStoreError::DeviceHasReadings(device_id),
            ));
        }
        tables.devices.remove(&device_id);
        Ok(())
    }
}

impl TelemetryRepository for MemoryStore {
    async fn latest(&self, device_id: i32) -> Result<SensorReading> {
        self.select(device_id, |_| true)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("sensor reading", device_id))
    }

    async fn historic(&self, device_id: i32) -> Result<Vec<SensorReading>> {
        Ok(self.select(device_id, |_| true).await)
    }

    async fn by_period(&self, device_id: i32, range: TimeRange) -> Result<Vec<SensorReading>> {
        Ok(self.select(device_id, |r| range.contains(r.date_time)).await)
    }

    async fn ingest(&self, reading: NewSensorReading) -> Result<SensorReading> {
        reading.validate()?;
        // Postgres keeps microseconds.
        self.insert(reading, Utc::now().trunc_subsecs(6)).await
    }
}
