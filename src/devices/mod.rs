mod registry;

use std::future::Future;

pub use registry::DeviceRegistry;

use crate::{db::models::Device, error::Result};

/// Device identity records: creation, lookup, deletion, listing.
///
/// Implementations must be cheap to clone; each clone shares the same store
/// handle so the registry can be handed to every request task.
pub trait DeviceRepository: Clone + Send + Sync + 'static {
    /// All devices, ordered by ascending `device_id`.
    fn list(&self) -> impl Future<Output = Result<Vec<Device>>> + Send;

    /// `NotFound` when no device has this id.
    fn get_by_id(&self, device_id: i32) -> impl Future<Output = Result<Device>> + Send;

    /// Persists a new device. Id and `created_at` are assigned server-side.
    fn create(&self, device_name: &str) -> impl Future<Output = Result<Device>> + Send;

    /// Idempotent: removing an absent id succeeds.
    fn delete(&self, device_id: i32) -> impl Future<Output = Result<()>> + Send;
}
