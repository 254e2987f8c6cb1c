pub mod device_context;
