//! Contract tests against a real Postgres instance.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use sqlx::PgPool;

use greenhouse_telemetry::{
    db::models::NewSensorReading,
    devices::{DeviceRegistry, DeviceRepository},
    error::CoreError,
    telemetry::{TelemetryRepository, TelemetryStore, TimeRange},
};

fn measurements(device_id: i32, temp: f64) -> NewSensorReading {
    NewSensorReading {
        device_id,
        temp,
        humidity: 48.0,
        light_level: 300.0,
        soil_moisture: 0.4,
        water_level: 0.8,
    }
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

// ---------------------------------------------------------------------------
// Device registry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_then_get_returns_equal_device(pool: PgPool) {
    let registry = DeviceRegistry::new(pool);
    let created = registry.create("greenhouse-1").await.unwrap();
    assert_eq!(created.device_id, 1);
    assert_eq!(registry.get_by_id(created.device_id).await.unwrap(), created);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_is_ordered_by_id(pool: PgPool) {
    let registry = DeviceRegistry::new(pool);
    registry.create("b").await.unwrap();
    registry.create("a").await.unwrap();
    let ids: Vec<i32> = registry.list().await.unwrap().iter().map(|d| d.device_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn get_unknown_device_is_not_found(pool: PgPool) {
    let registry = DeviceRegistry::new(pool);
    let err = registry.get_by_id(404).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { device_id: 404, .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_is_idempotent(pool: PgPool) {
    let registry = DeviceRegistry::new(pool);
    let d = registry.create("x").await.unwrap();
    registry.delete(d.device_id).await.unwrap();
    registry.delete(d.device_id).await.unwrap();
    registry.delete(12345).await.unwrap();
    assert!(registry.list().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ids_are_not_reused_after_delete(pool: PgPool) {
    let registry = DeviceRegistry::new(pool);
    let a = registry.create("a").await.unwrap();
    registry.delete(a.device_id).await.unwrap();
    let b = registry.create("b").await.unwrap();
    assert!(b.device_id > a.device_id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_device_with_readings_is_a_store_error(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();
    telemetry.ingest(measurements(d.device_id, 20.0)).await.unwrap();

    let err = registry.delete(d.device_id).await.unwrap_err();
    assert!(matches!(err, CoreError::Store { .. }));
}

// ---------------------------------------------------------------------------
// Telemetry store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn device_without_readings(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("empty").await.unwrap();

    let err = telemetry.latest(d.device_id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
    assert!(telemetry.historic(d.device_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ingest_for_unknown_device_is_a_store_error(pool: PgPool) {
    let telemetry = TelemetryStore::new(pool);
    let err = telemetry.ingest(measurements(77, 20.0)).await.unwrap_err();
    assert!(matches!(err, CoreError::Store { .. }));
    assert!(err.to_string().contains("device_id=77"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn greenhouse_scenario(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("greenhouse-1").await.unwrap();

    let first = telemetry.ingest(measurements(d.device_id, 22.5)).await.unwrap();
    assert_eq!(telemetry.latest(d.device_id).await.unwrap(), first);

    pause().await;
    let second = telemetry.ingest(measurements(d.device_id, 23.0)).await.unwrap();
    assert_eq!(telemetry.latest(d.device_id).await.unwrap(), second);

    let historic = telemetry.historic(d.device_id).await.unwrap();
    assert_eq!(historic, vec![second, first]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn identical_ingests_are_all_kept_in_order(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();

    for _ in 0..4 {
        telemetry.ingest(measurements(d.device_id, 21.0)).await.unwrap();
    }
    let rows = telemetry.historic(d.device_id).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.windows(2).all(|w| w[0].date_time >= w[1].date_time));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn by_period_is_inclusive_and_excludes_outside(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();

    let early = telemetry.ingest(measurements(d.device_id, 1.0)).await.unwrap();
    pause().await;
    let inside = telemetry.ingest(measurements(d.device_id, 2.0)).await.unwrap();
    pause().await;
    let late = telemetry.ingest(measurements(d.device_id, 3.0)).await.unwrap();

    let exact = TimeRange::new(inside.date_time, inside.date_time).unwrap();
    assert_eq!(telemetry.by_period(d.device_id, exact).await.unwrap(), vec![inside.clone()]);

    let wide = TimeRange::new(early.date_time, late.date_time).unwrap();
    let rows = telemetry.by_period(d.device_id, wide).await.unwrap();
    assert_eq!(rows, vec![late, inside, early]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn by_period_in_the_future_is_empty(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();
    telemetry.ingest(measurements(d.device_id, 1.0)).await.unwrap();

    let start = Utc::now() + chrono::Duration::days(1);
    let range = TimeRange::new(start, start + chrono::Duration::days(1)).unwrap();
    assert!(telemetry.by_period(d.device_id, range).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn by_period_start_between_microseconds_excludes_earlier_reading(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();
    let stored = telemetry.ingest(measurements(d.device_id, 1.0)).await.unwrap();

    let start = stored.date_time + chrono::Duration::nanoseconds(500);
    let range = TimeRange::new(start, stored.date_time + chrono::Duration::seconds(1)).unwrap();
    assert!(!range.contains(stored.date_time));
    assert!(telemetry.by_period(d.device_id, range).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn by_period_end_between_microseconds_keeps_reading(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool);
    let d = registry.create("x").await.unwrap();
    let stored = telemetry.ingest(measurements(d.device_id, 1.0)).await.unwrap();

    let end = stored.date_time + chrono::Duration::nanoseconds(500);
    let range = TimeRange::new(stored.date_time - chrono::Duration::seconds(1), end).unwrap();
    assert_eq!(telemetry.by_period(d.device_id, range).await.unwrap(), vec![stored]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn equal_timestamps_resolve_newest_insert_first(pool: PgPool) {
    let registry = DeviceRegistry::new(pool.clone());
    let telemetry = TelemetryStore::new(pool.clone());
    let d = registry.create("x").await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    for temp in [1.0_f64, 2.0, 3.0] {
        sqlx::query(
            "INSERT INTO sensor_data \
                 (device_id, temp, humidity, light_level, soil_moisture, water_level, date_time) \
             VALUES ($1, $2, 0, 0, 0, 0, $3)",
        )
        .bind(d.device_id)
        .bind(temp)
        .bind(at)
        .execute(&pool)
        .await
        .unwrap();
    }

    assert_eq!(telemetry.latest(d.device_id).await.unwrap().temp, 3.0);

    let temps: Vec<f64> = telemetry
        .historic(d.device_id)
        .await
        .unwrap()
        .iter()
        .map(|r| r.temp)
        .collect();
    assert_eq!(temps, vec![3.0, 2.0, 1.0]);

    let range = TimeRange::new(at, at).unwrap();
    let temps: Vec<f64> = telemetry
        .by_period(d.device_id, range)
        .await
        .unwrap()
        .iter()
        .map(|r| r.temp)
        .collect();
    assert_eq!(temps, vec![3.0, 2.0, 1.0]);
}
