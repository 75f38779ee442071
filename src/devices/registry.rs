use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use super::DeviceRepository;
use crate::{
    db::models::Device,
    error::{CoreError, Result, UnexpectedRowCount},
};

/// Postgres-backed [`DeviceRepository`] over the `devices` table.
#[derive(Clone)]
pub struct DeviceRegistry {
    pool: PgPool,
}

impl DeviceRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for DeviceRegistry {
    async fn list(&self) -> Result<Vec<Device>> {
        debug!("Listing devices");

        sqlx::query_as::<_, Device>(
            r#"
            SELECT device_id, device_name, created_at
            FROM devices
            ORDER BY device_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::store("list devices", "all devices", e))
    }

    async fn get_by_id(&self, device_id: i32) -> Result<Device> {
        debug!(device_id = %device_id, "Fetching device");

        let mut rows = sqlx::query_as::<_, Device>(
            r#"
            SELECT device_id, device_name, created_at
            FROM devices
            WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::store("get device", format!("device_id={device_id}"), e))?;

        match rows.len() {
            0 => Err(CoreError::not_found("device", device_id)),
            1 => Ok(rows.remove(0)),
            n => Err(CoreError::store(
                "get device",
                format!("device_id={device_id}"),
                UnexpectedRowCount(n),
            )),
        }
    }

    async fn create(&self, device_name: &str) -> Result<Device> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (device_name, created_at)
            VALUES ($1, $2)
            RETURNING device_id, device_name, created_at
            "#,
        )
        .bind(device_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::store("create device", format!("device_name={device_name:?}"), e))?;

        info!(device_id = %device.device_id, device_name = %device.device_name, "Device registered");
        Ok(device)
    }

    async fn delete(&self, device_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE device_id = $1")
            .bind(device_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::store("delete device", format!("device_id={device_id}"), e))?;

        info!(device_id = %device_id, rows = result.rows_affected(), "Device deleted");
        Ok(())
    }
}
