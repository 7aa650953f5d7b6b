//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSettings, ExchangeSettings, LoggingConfig, SentimentSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables prefixed `COINSAGE__` override file values,
/// e.g. `COINSAGE__EXCHANGE__SYMBOL=ETHUSDT`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("COINSAGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// The built-in defaults, used when no config file is given.
pub fn default_config() -> AppConfig {
    AppConfig::default()
}
