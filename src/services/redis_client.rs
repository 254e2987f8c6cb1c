use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, Pipeline};
use tracing::debug;

use crate::models::{device::Device, update::AvailableUpdate};
use crate::services::device_service::{DeviceLookup, ServiceError, UpdateAvailabilityService};

fn device_key(device_uuid: &str) -> String {
    format!("device:{}", device_uuid)
}

fn updates_key(device_uuid: &str) -> String {
    format!("updates:{}", device_uuid)
}

/// Device and update records kept in Redis as JSON strings.
///
/// `device:<uuid>` holds the [`Device`], `updates:<uuid>` the list of
/// [`AvailableUpdate`]s. A device without an `updates:` key has no update.
#[derive(Clone)]
pub struct RedisDeviceStore {
    manager: ConnectionManager,
}

impl RedisDeviceStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self { manager })
    }

    pub async fn put_device(&self, device: &Device) -> Result<(), ServiceError> {
        debug!("Storing device {}", device.uuid);

        let payload = serde_json::to_string(device)?;
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(device_key(&device.uuid), payload).await?;
        Ok(())
    }

    pub async fn put_updates(
        &self,
        device_uuid: &str,
        updates: &[AvailableUpdate],
    ) -> Result<(), ServiceError> {
        debug!("Storing {} updates for device {}", updates.len(), device_uuid);

        let mut conn = self.manager.clone();
        let exists: bool = conn.exists(device_key(device_uuid)).await?;
        if !exists {
            return Err(ServiceError::DeviceNotFound);
        }

        let payload = serde_json::to_string(updates)?;
        conn.set::<_, _, ()>(updates_key(device_uuid), payload).await?;
        Ok(())
    }

    pub async fn remove_device(&self, device_uuid: &str) -> Result<(), ServiceError> {
        debug!("Removing device {}", device_uuid);

        let mut pipe = Pipeline::new();
        pipe.atomic()
            .del(device_key(device_uuid))
            .del(updates_key(device_uuid));

        let mut conn = self.manager.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl DeviceLookup for RedisDeviceStore {
    async fn get_device_by_uuid(&self, device_uuid: &str) -> Result<Device, ServiceError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(device_key(device_uuid)).await?;
        let json = value.ok_or(ServiceError::DeviceNotFound)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[async_trait]
impl UpdateAvailabilityService for RedisDeviceStore {
    async fn get_update_available_for_device_by_uuid(
        &self,
        device_uuid: &str,
    ) -> Result<Vec<AvailableUpdate>, ServiceError> {
        // Read both keys in one transaction so a concurrent removal shows up
        // as a missing device, not as an empty update list.
        let mut pipe = Pipeline::new();
        pipe.atomic()
            .exists(device_key(device_uuid))
            .get(updates_key(device_uuid));

        let mut conn = self.manager.clone();
        let (exists, updates): (bool, Option<String>) = pipe.query_async(&mut conn).await?;
        if !exists {
            return Err(ServiceError::DeviceNotFound);
        }

        match updates {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}
