pub mod device_registry;
pub mod device_service;
pub mod metrics;
pub mod redis_client;
