use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use utoipa::OpenApi;

use super::{
    dto::{
        DeviceDto, PeriodRequest, RegisterDeviceRequest, SendSensorDataRequest, SensorReadingDto,
        StatusResponse,
    },
    errors::AppError,
};
use crate::{
    devices::DeviceRepository,
    error::CoreError,
    telemetry::{TelemetryRepository, TimeRange},
};

// ---------------------------------------------------------------------------
// Extractor rejections
// ---------------------------------------------------------------------------

// Malformed ids and bodies are validation errors, answered as 400 with the
// same `{"error": ...}` body as every other failure.

fn device_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, CoreError> {
    path.map(|Path(id)| id)
        .map_err(|e| CoreError::validation(format!("invalid device ID: {}", e.body_text())))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, CoreError> {
    body.map(|Json(input)| input)
        .map_err(|e| CoreError::validation(format!("invalid input: {}", e.body_text())))
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// List every registered device, ordered by id.
#[utoipa::path(
    get,
    path = "/devices",
    responses(
        (status = 200, description = "All registered devices", body = Vec<DeviceDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "devices"
)]
pub async fn list_devices<D: DeviceRepository>(
    State(devices): State<D>,
) -> Result<Json<Vec<DeviceDto>>, AppError> {
    let rows = devices.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/devices/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Device details", body = DeviceDto),
        (status = 400, description = "Invalid device ID"),
        (status = 404, description = "No device with this ID"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "devices"
)]
pub async fn get_device<D: DeviceRepository>(
    State(devices): State<D>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeviceDto>, AppError> {
    let id = device_id(path)?;
    let device = devices.get_by_id(id).await?;
    Ok(Json(device.into()))
}

/// Register a new device. The id and `created_at` are assigned server-side.
#[utoipa::path(
    post,
    path = "/devices/register",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Registered device", body = DeviceDto),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "devices"
)]
pub async fn register_device<D: DeviceRepository>(
    State(devices): State<D>,
    body: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<Json<DeviceDto>, AppError> {
    let input = json_body(body)?;
    let device = devices.create(&input.device_name).await?;
    Ok(Json(device.into()))
}

/// Delete a device. Succeeds whether or not the device existed.
#[utoipa::path(
    delete,
    path = "/devices/delete/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Device removed or already absent", body = StatusResponse),
        (status = 400, description = "Invalid device ID"),
        (status = 500, description = "Internal server error, e.g. the device still has sensor data"),
    ),
    tag = "devices"
)]
pub async fn delete_device<D: DeviceRepository>(
    State(devices): State<D>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = device_id(path)?;
    devices.delete(id).await?;
    Ok(Json(StatusResponse {
        status: "success".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// Sensor data
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/sensorData/latest/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Most recent reading", body = SensorReadingDto),
        (status = 400, description = "Invalid device ID"),
        (status = 404, description = "Device has no readings"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensorData"
)]
pub async fn get_latest<T: TelemetryRepository>(
    State(telemetry): State<T>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<SensorReadingDto>, AppError> {
    let id = device_id(path)?;
    let reading = telemetry.latest(id).await?;
    Ok(Json(reading.into()))
}

/// All readings for a device, most recent first.
#[utoipa::path(
    get,
    path = "/sensorData/historic/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Readings ordered by date_time DESC", body = Vec<SensorReadingDto>),
        (status = 400, description = "Invalid device ID"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensorData"
)]
pub async fn get_historic<T: TelemetryRepository>(
    State(telemetry): State<T>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let id = device_id(path)?;
    let rows = telemetry.historic(id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Readings with `start <= date_time <= end`, most recent first.
#[utoipa::path(
    post,
    path = "/sensorData/period/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    request_body = PeriodRequest,
    responses(
        (status = 200, description = "Readings in range, ordered by date_time DESC", body = Vec<SensorReadingDto>),
        (status = 400, description = "Malformed body, unparseable or inverted range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sensorData"
)]
pub async fn get_by_period<T: TelemetryRepository>(
    State(telemetry): State<T>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<PeriodRequest>, JsonRejection>,
) -> Result<Json<Vec<SensorReadingDto>>, AppError> {
    let id = device_id(path)?;
    let input = json_body(body)?;
    let range = TimeRange::parse(&input.start, &input.end)?;
    let rows = telemetry.by_period(id, range).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Ingest one reading; `date_time` is stamped by the server.
#[utoipa::path(
    post,
    path = "/sensorData/sendData/{id}",
    params(
        ("id" = i32, Path, description = "Device ID"),
    ),
    request_body = SendSensorDataRequest,
    responses(
        (status = 200, description = "Persisted reading", body = SensorReadingDto),
        (status = 400, description = "Malformed body or non-finite measurement"),
        (status = 500, description = "Internal server error, e.g. unknown device"),
    ),
    tag = "sensorData"
)]
pub async fn send_data<T: TelemetryRepository>(
    State(telemetry): State<T>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<SendSensorDataRequest>, JsonRejection>,
) -> Result<Json<SensorReadingDto>, AppError> {
    let id = device_id(path)?;
    let input = json_body(body)?;
    let reading = telemetry.ingest(input.for_device(id)).await?;
    Ok(Json(reading.into()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = StatusResponse),
    ),
    tag = "system"
)]
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_owned(),
    })
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        list_devices,
        get_device,
        register_device,
        delete_device,
        get_latest,
        get_historic,
        get_by_period,
        send_data,
        health,
    ),
    components(schemas(
        DeviceDto,
        SensorReadingDto,
        RegisterDeviceRequest,
        PeriodRequest,
        SendSensorDataRequest,
        StatusResponse,
    )),
    tags(
        (name = "devices",    description = "Device registry endpoints"),
        (name = "sensorData", description = "Sensor data ingestion and queries"),
        (name = "system",     description = "System endpoints"),
    ),
    info(
        title = "Greenhouse Telemetry API",
        version = "0.1.0",
        description = "REST API for greenhouse device registration and sensor telemetry"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
