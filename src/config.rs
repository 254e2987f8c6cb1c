use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime settings. Sources, lowest precedence first: built-in defaults,
/// the file named by `SETTINGS_FILE` (if any), then environment variables
/// such as `SERVER_PORT` or `REDIS_URL`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,
    pub redis_url: Option<String>,
    /// JSON devices file for the in-memory store, used when `redis_url` is
    /// not set.
    pub devices_file: Option<String>,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub keep_alive_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::default())
    }

    pub fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("workers", 4)?
            .set_default("log_level", "info")?
            .set_default("request_timeout_secs", 5)?
            .set_default("keep_alive_secs", 30)?;

        if let Ok(path) = std::env::var("SETTINGS_FILE") {
            builder = builder.add_source(File::with_name(&path).required(false));
        }

        builder
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
