pub mod devices;
pub mod health;
pub mod metrics;

use actix_web::web;

/// Registers every route the service exposes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::metrics_handler))
        .route("/updates", web::get().to(devices::get_update_available_for_device))
        .service(
            web::scope("/devices/{device_uuid}")
                .route("", web::get().to(devices::get_device))
                .route("/updates", web::get().to(devices::get_update_available_for_device)),
        );
}
