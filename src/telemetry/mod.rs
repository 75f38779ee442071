mod period;
mod store;

use std::future::Future;

pub use period::TimeRange;
pub use store::TelemetryStore;

use crate::{
    db::models::{NewSensorReading, SensorReading},
    error::Result,
};

/// Sensor readings keyed by device: ingestion plus latest, historic and
/// time-range queries. Every query result is ordered by `date_time`
/// descending, with ties broken newest insert first.
pub trait TelemetryRepository: Clone + Send + Sync + 'static {
    /// `NotFound` when the device has no readings.
    fn latest(&self, device_id: i32) -> impl Future<Output = Result<SensorReading>> + Send;

    fn historic(&self, device_id: i32) -> impl Future<Output = Result<Vec<SensorReading>>> + Send;

    /// Readings with `range.start() <= date_time <= range.end()`.
    fn by_period(
        &self,
        device_id: i32,
        range: TimeRange,
    ) -> impl Future<Output = Result<Vec<SensorReading>>> + Send;

    /// Appends one reading stamped with the server clock and returns it as
    /// persisted. Unknown devices are rejected by the store.
    fn ingest(&self, reading: NewSensorReading) -> impl Future<Output = Result<SensorReading>> + Send;
}
