#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use device_update_api::{
    handlers,
    models::{device::Device, update::AvailableUpdate},
    services::device_service::{DeviceLookup, ServiceError, UpdateAvailabilityService},
    AppState,
};

/// Device lookup double: answers only the UUIDs it was scripted for and
/// records every call it receives.
#[derive(Clone, Default)]
pub struct ScriptedDevices {
    responses: Arc<Mutex<HashMap<String, Result<Device, ServiceError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, device_uuid: &str, result: Result<Device, ServiceError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(device_uuid.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceLookup for ScriptedDevices {
    async fn get_device_by_uuid(&self, device_uuid: &str) -> Result<Device, ServiceError> {
        self.calls.lock().unwrap().push(device_uuid.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(device_uuid)
            .cloned()
            .unwrap_or_else(|| {
                Err(ServiceError::Failure(format!("unexpected lookup of {device_uuid}")))
            })
    }
}

#[derive(Clone, Default)]
pub struct ScriptedUpdates {
    responses: Arc<Mutex<HashMap<String, Result<Vec<AvailableUpdate>, ServiceError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        self,
        device_uuid: &str,
        result: Result<Vec<AvailableUpdate>, ServiceError>,
    ) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(device_uuid.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateAvailabilityService for ScriptedUpdates {
    async fn get_update_available_for_device_by_uuid(
        &self,
        device_uuid: &str,
    ) -> Result<Vec<AvailableUpdate>, ServiceError> {
        self.calls.lock().unwrap().push(device_uuid.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(device_uuid)
            .cloned()
            .unwrap_or_else(|| {
                Err(ServiceError::Failure(format!("unexpected query for {device_uuid}")))
            })
    }
}

pub fn app_state(devices: &ScriptedDevices, updates: &ScriptedUpdates) -> AppState {
    AppState::with_services(Arc::new(devices.clone()), Arc::new(updates.clone()))
}

pub fn random_uuid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

pub fn sample_update(version: &str) -> AvailableUpdate {
    AvailableUpdate {
        image_id: format!("image-{version}"),
        name: "edge-image".to_string(),
        version: version.to_string(),
        release_notes: Some(format!("Release {version}")),
        released_at: None,
    }
}

/// Sends a GET through the full route table and returns status and JSON body.
pub async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: serde_json::Value = test::read_body_json(resp).await;
    (status, body)
}
