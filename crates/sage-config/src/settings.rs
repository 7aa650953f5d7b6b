//! Configuration structures.

use sage_analysis::WindowSpec;
use sage_engine::EngineSettings;
use sage_indicators::IndicatorParams;
use sage_oracle::OracleSettings;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default = "default_windows")]
    pub windows: Vec<WindowSpec>,
    #[serde(default)]
    pub indicators: IndicatorParams,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
    #[serde(default)]
    pub sentiment: SentimentSettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            exchange: ExchangeSettings::default(),
            windows: default_windows(),
            indicators: IndicatorParams::default(),
            engine: EngineSettings::default(),
            oracle: OracleSettings::default(),
            sentiment: SentimentSettings::default(),
            data: DataSettings::default(),
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "coinsage".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Exchange data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSettings {
    pub symbol: String,
    pub timeframe: String,
    /// Closed candles fetched per cycle
    pub limit: usize,
    /// Extra seconds past the boundary before fetching, letting the
    /// exchange finalize the candle
    pub settle_delay_secs: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            timeframe: "5m".to_string(),
            limit: 864,
            settle_delay_secs: 5,
        }
    }
}

/// Sentiment feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSettings {
    pub enabled: bool,
    /// Daily samples fetched per cycle
    pub history_limit: usize,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            history_limit: 7,
        }
    }
}

/// Local data paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    pub dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: "trading_data".to_string(),
        }
    }
}

fn default_windows() -> Vec<WindowSpec> {
    vec![
        WindowSpec::trailing("1d", 288),
        WindowSpec::trailing("2d", 432),
        WindowSpec::full("3d"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.exchange.symbol, "BTCUSDT");
        assert_eq!(config.exchange.timeframe, "5m");
        assert!(config.sentiment.enabled);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let toml = r#"
            [exchange]
            symbol = "ETHUSDT"
            timeframe = "1h"
            limit = 500
            settle_delay_secs = 3

            [[windows]]
            name = "1d"
            bars = 24

            [[windows]]
            name = "full"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.exchange.symbol, "ETHUSDT");
        assert_eq!(config.windows.len(), 2);
        assert_eq!(config.windows[0].bars, Some(24));
        assert_eq!(config.windows[1].bars, None);
        // Untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.indicators.rsi_period, 14);
    }

    #[test]
    fn test_default_windows_present_when_omitted() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.windows.len(), 3);
        assert_eq!(config.windows[2].bars, None);
    }
}
