pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{devices::DeviceRepository, telemetry::TelemetryRepository};
use handlers::ApiDoc;

/// Builds the HTTP surface over any device/telemetry implementation, so the
/// same routes serve Postgres in production and the in-memory store in tests.
pub fn router<D, T>(devices: D, telemetry: T) -> Router
where
    D: DeviceRepository,
    T: TelemetryRepository,
{
    let (router, api): (Router, _) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/devices", get(handlers::list_devices::<D>))
        .route("/devices/register", post(handlers::register_device::<D>))
        .route("/devices/{id}", get(handlers::get_device::<D>))
        .route("/devices/delete/{id}", delete(handlers::delete_device::<D>))
        .with_state(devices)
        .split_for_parts();

    let sensor_data: Router = Router::new()
        .route("/sensorData/latest/{id}", get(handlers::get_latest::<T>))
        .route("/sensorData/historic/{id}", get(handlers::get_historic::<T>))
        .route("/sensorData/period/{id}", post(handlers::get_by_period::<T>))
        .route("/sensorData/sendData/{id}", post(handlers::send_data::<T>))
        .with_state(telemetry);

    router
        .merge(sensor_data)
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
