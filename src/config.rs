use crate::entities::SensorRegistry;
use crate::error::EntityError;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub entities: EntitiesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntitiesConfig {
    /// Appliance name, prefixes every unique id.
    #[serde(default = "default_instance")]
    pub instance: String,
    /// Sensor keys never resolved.
    #[serde(default)]
    pub disabled_sensors: Vec<String>,
    /// Payload snapshot written by an external poller, read on each scrape.
    #[serde(default)]
    pub payload_path: Option<String>,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9120
}

fn default_instance() -> String {
    "truenas".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            instance: default_instance(),
            disabled_sensors: Vec::new(),
            payload_path: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TRUENAS_ENTITIES").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject settings that cannot apply to `registry`.
    pub fn validate(&self, registry: &SensorRegistry) -> std::result::Result<(), EntityError> {
        if self.entities.instance.trim().is_empty() {
            return Err(EntityError::Config(
                "entities.instance must not be empty".to_string(),
            ));
        }
        if let Some(unknown) = self
            .entities
            .disabled_sensors
            .iter()
            .find(|key| !registry.contains(key))
        {
            return Err(EntityError::UnknownSensor(unknown.clone()));
        }
        Ok(())
    }
}
