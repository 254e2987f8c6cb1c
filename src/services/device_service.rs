use async_trait::async_trait;
use thiserror::Error;

use crate::models::{device::Device, update::AvailableUpdate};

/// Outcome of a collaborator call that did not produce a value. Not-found is
/// its own variant so callers never have to inspect messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("device not found")]
    DeviceNotFound,

    #[error("{0}")]
    Failure(String),
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::Failure(format!("redis error: {}", err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Failure(format!("corrupt record: {}", err))
    }
}

#[async_trait]
pub trait DeviceLookup: Send + Sync {
    async fn get_device_by_uuid(&self, device_uuid: &str) -> Result<Device, ServiceError>;
}

#[async_trait]
pub trait UpdateAvailabilityService: Send + Sync {
    /// An empty list means the device exists and is up to date.
    async fn get_update_available_for_device_by_uuid(
        &self,
        device_uuid: &str,
    ) -> Result<Vec<AvailableUpdate>, ServiceError>;
}
