use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{device::Device, update::AvailableUpdate};
use crate::services::device_service::{DeviceLookup, ServiceError, UpdateAvailabilityService};

#[derive(Debug, Clone)]
struct DeviceRecord {
    device: Device,
    updates: Vec<AvailableUpdate>,
}

/// One entry of a devices file: the device fields plus its pending updates.
#[derive(Debug, Deserialize)]
pub struct SeedRecord {
    #[serde(flatten)]
    pub device: Device,
    #[serde(default)]
    pub updates: Vec<AvailableUpdate>,
}

/// In-process device store used when no Redis URL is configured. It is
/// filled from a devices file at startup and lives only as long as the
/// process.
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    inner: Arc<RwLock<HashMap<String, DeviceRecord>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a JSON array of [`SeedRecord`]s.
    pub async fn from_seed_json(json: &str) -> anyhow::Result<Self> {
        let records: Vec<SeedRecord> =
            serde_json::from_str(json).context("parse devices file")?;

        let registry = Self::new();
        for record in records {
            let device_uuid = record.device.uuid.clone();
            registry.put_device(record.device).await;
            registry.put_updates(&device_uuid, record.updates).await?;
        }
        Ok(registry)
    }

    pub async fn from_seed_file(path: &str) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read devices file: {path}"))?;
        let registry = Self::from_seed_json(&contents)
            .await
            .with_context(|| format!("load devices file: {path}"))?;
        info!("Loaded {} devices from {}", registry.len().await, path);
        Ok(registry)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Inserts or replaces a device. Updates already recorded for the same
    /// UUID are kept.
    pub async fn put_device(&self, device: Device) {
        let mut records = self.inner.write().await;
        match records.get_mut(&device.uuid) {
            Some(record) => record.device = device,
            None => {
                records.insert(
                    device.uuid.clone(),
                    DeviceRecord {
                        device,
                        updates: Vec::new(),
                    },
                );
            }
        }
    }

    pub async fn put_updates(
        &self,
        device_uuid: &str,
        updates: Vec<AvailableUpdate>,
    ) -> Result<(), ServiceError> {
        let mut records = self.inner.write().await;
        let record = records
            .get_mut(device_uuid)
            .ok_or(ServiceError::DeviceNotFound)?;
        record.updates = updates;
        Ok(())
    }

    pub async fn remove_device(&self, device_uuid: &str) -> bool {
        self.inner.write().await.remove(device_uuid).is_some()
    }
}

#[async_trait]
impl DeviceLookup for DeviceRegistry {
    async fn get_device_by_uuid(&self, device_uuid: &str) -> Result<Device, ServiceError> {
        self.inner
            .read()
            .await
            .get(device_uuid)
            .map(|record| record.device.clone())
            .ok_or(ServiceError::DeviceNotFound)
    }
}

#[async_trait]
impl UpdateAvailabilityService for DeviceRegistry {
    async fn get_update_available_for_device_by_uuid(
        &self,
        device_uuid: &str,
    ) -> Result<Vec<AvailableUpdate>, ServiceError> {
        self.inner
            .read()
            .await
            .get(device_uuid)
            .map(|record| record.updates.clone())
            .ok_or(ServiceError::DeviceNotFound)
    }
}
