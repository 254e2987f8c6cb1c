pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Instant;

use services::device_service::{DeviceLookup, UpdateAvailabilityService};

#[derive(Clone)]
pub struct AppState {
    pub devices: Arc<dyn DeviceLookup>,
    pub updates: Arc<dyn UpdateAvailabilityService>,
    pub start_time: Instant,
}

impl AppState {
    /// State backed by a single store answering both device lookups and
    /// update queries.
    pub fn new<S>(store: S) -> Self
    where
        S: DeviceLookup + UpdateAvailabilityService + 'static,
    {
        let store = Arc::new(store);
        Self::with_services(store.clone(), store)
    }

    pub fn with_services(
        devices: Arc<dyn DeviceLookup>,
        updates: Arc<dyn UpdateAvailabilityService>,
    ) -> Self {
        Self {
            devices,
            updates,
            start_time: Instant::now(),
        }
    }
}
