//! Service configuration

use anyhow::Result;
use serde::Deserialize;

/// Service configuration, read from `DELAY_`-prefixed environment
/// variables with serde defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP port for the prediction API
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Directory holding the persisted model and pipeline
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Historical flights CSV used when no saved model exists
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

fn default_http_port() -> u16 {
    8080
}

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_data_path() -> String {
    "data/data.csv".to_string()
}

impl ServiceConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("DELAY"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ServiceConfig {
            http_port: default_http_port(),
            model_dir: default_model_dir(),
            data_path: default_data_path(),
        }))
    }
}
