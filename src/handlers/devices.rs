use std::time::Instant;

use actix_web::{http::StatusCode, web, HttpResponse};
use tracing::{error, info, warn};

use crate::middleware::device_context::DeviceContext;
use crate::models::{device::Device, update::UpdateAvailability};
use crate::services::device_service::{DeviceLookup, ServiceError, UpdateAvailabilityService};
use crate::services::metrics::get_metrics;
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum DeviceRequestError {
    #[error("device UUID is required")]
    EmptyIdentifier,
    #[error("device not found")]
    DeviceNotFound,
    /// Collaborator failures; their detail is logged, never sent to the client.
    #[error("internal server error")]
    Unclassified,
}

impl From<ServiceError> for DeviceRequestError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::DeviceNotFound => DeviceRequestError::DeviceNotFound,
            ServiceError::Failure(_) => DeviceRequestError::Unclassified,
        }
    }
}

impl actix_web::ResponseError for DeviceRequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeviceRequestError::EmptyIdentifier => StatusCode::BAD_REQUEST,
            DeviceRequestError::DeviceNotFound => StatusCode::NOT_FOUND,
            DeviceRequestError::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

fn require_identifier(device: &DeviceContext) -> Result<&str, DeviceRequestError> {
    if device.is_empty() {
        warn!("Rejecting device request without a device UUID");
        return Err(DeviceRequestError::EmptyIdentifier);
    }
    Ok(device.device_uuid())
}

fn log_service_error(operation: &str, device_uuid: &str, err: &ServiceError) {
    match err {
        ServiceError::DeviceNotFound => info!("{}: device {} not found", operation, device_uuid),
        ServiceError::Failure(detail) => {
            error!("{} failed for device {}: {}", operation, device_uuid, detail)
        }
    }
}

async fn load_device(
    devices: &dyn DeviceLookup,
    device_uuid: &str,
) -> Result<Device, DeviceRequestError> {
    devices.get_device_by_uuid(device_uuid).await.map_err(|err| {
        log_service_error("device lookup", device_uuid, &err);
        DeviceRequestError::from(err)
    })
}

/// Validates the identifier, confirms the device exists, then asks the
/// update source. Each step ends the request on failure; nothing is retried.
pub async fn check_update_availability(
    devices: &dyn DeviceLookup,
    updates: &dyn UpdateAvailabilityService,
    device: &DeviceContext,
) -> Result<UpdateAvailability, DeviceRequestError> {
    let device_uuid = require_identifier(device)?;
    load_device(devices, device_uuid).await?;

    // A not-found here means the device disappeared after the lookup; it is
    // reported the same way as a failed lookup.
    let available = updates
        .get_update_available_for_device_by_uuid(device_uuid)
        .await
        .map_err(|err| {
            log_service_error("update availability", device_uuid, &err);
            DeviceRequestError::from(err)
        })?;

    Ok(UpdateAvailability::new(device_uuid, available))
}

async fn record_outcome(result: &Result<UpdateAvailability, DeviceRequestError>, started: Instant) {
    let Some(metrics) = get_metrics().await else {
        return;
    };

    metrics.increment_update_checks();
    match result {
        Ok(availability) if availability.update_available => metrics.increment_updates_found(),
        Ok(_) => {}
        Err(DeviceRequestError::EmptyIdentifier) => metrics.increment_bad_requests(),
        Err(DeviceRequestError::DeviceNotFound) => metrics.increment_not_found(),
        Err(DeviceRequestError::Unclassified) => metrics.increment_failures(),
    }
    metrics
        .record_request_duration(started.elapsed().as_secs_f64())
        .await;
}

pub async fn get_update_available_for_device(
    data: web::Data<AppState>,
    device: DeviceContext,
) -> Result<HttpResponse, DeviceRequestError> {
    let started = Instant::now();
    let result =
        check_update_availability(data.devices.as_ref(), data.updates.as_ref(), &device).await;
    record_outcome(&result, started).await;

    let availability = result?;
    info!(
        "Device {} update available: {} ({} candidates)",
        availability.device_uuid,
        availability.update_available,
        availability.updates.len()
    );
    Ok(HttpResponse::Ok().json(availability))
}

pub async fn get_device(
    data: web::Data<AppState>,
    device: DeviceContext,
) -> Result<HttpResponse, DeviceRequestError> {
    let device_uuid = require_identifier(&device)?;
    let record = load_device(data.devices.as_ref(), device_uuid).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[cfg(test)]
mod tests {
    use super::DeviceRequestError;
    use crate::services::device_service::ServiceError;
    use actix_web::{body::to_bytes, http::StatusCode, ResponseError};

    #[test]
    fn error_taxonomy_maps_to_status_codes() {
        assert_eq!(
            DeviceRequestError::EmptyIdentifier.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DeviceRequestError::from(ServiceError::DeviceNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DeviceRequestError::from(ServiceError::Failure("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_rt::test]
    async fn internal_errors_do_not_leak_details() {
        let err = DeviceRequestError::from(ServiceError::Failure(
            "redis error: connection refused".into(),
        ));
        let response = err.error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "internal server error");
        assert!(!String::from_utf8_lossy(&body).contains("redis"));
    }
}
