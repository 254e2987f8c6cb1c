use actix_web::{web, App, HttpServer};
use device_update_api::{
    config::Settings,
    handlers,
    services::{
        device_registry::DeviceRegistry,
        metrics::initialize_metrics,
        redis_client::RedisDeviceStore,
    },
    AppState,
};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid settings: {}", e),
        )
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!("Starting Device Update API");

    initialize_metrics().await;

    let app_state = match (settings.redis_url.as_deref(), settings.devices_file.as_deref()) {
        (Some(redis_url), _) => {
            info!("Connecting to Redis at {}", redis_url);
            match RedisDeviceStore::new(redis_url).await {
                Ok(store) => {
                    info!("Successfully connected to Redis at {}", redis_url);
                    AppState::new(store)
                }
                Err(e) => {
                    error!("Failed to connect to Redis at {}: {:?}", redis_url, e);
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        format!("Redis connection failed: {:?}", e),
                    ));
                }
            }
        }
        (None, Some(devices_file)) => {
            warn!("REDIS_URL not set, serving devices from {} in memory", devices_file);
            match DeviceRegistry::from_seed_file(devices_file).await {
                Ok(registry) => AppState::new(registry),
                Err(e) => {
                    error!("Failed to load devices file {}: {:?}", devices_file, e);
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Devices file load failed: {:?}", e),
                    ));
                }
            }
        }
        (None, None) => {
            error!("No device store configured, set REDIS_URL or DEVICES_FILE");
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "No device store configured",
            ));
        }
    };

    info!("Server starting on {}:{}", settings.server_host, settings.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .workers(settings.workers)
    .keep_alive(Duration::from_secs(settings.keep_alive_secs))
    .client_request_timeout(Duration::from_secs(settings.request_timeout_secs))
    .bind((settings.server_host.as_str(), settings.server_port))?
    .run()
    .await
}
