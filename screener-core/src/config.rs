use anyhow::Result;
use serde::Deserialize;

use crate::models::{ChartInterval, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://datapi.jup.ag/v1";
pub const DEFAULT_CHART_BASE_URL: &str = "https://datapi.jup.ag/v2";
pub const DEFAULT_LAUNCHPAD: &str = "Believe";
pub const DEFAULT_CHART_CANDLES: u32 = 100;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub chart_base_url: String,
    pub launchpad: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chart_base_url: DEFAULT_CHART_BASE_URL.to_string(),
            launchpad: DEFAULT_LAUNCHPAD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExploreConfig {
    pub timeframe: Timeframe,
    pub chart_interval: ChartInterval,
    pub chart_candles: u32,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            chart_interval: ChartInterval::default(),
            chart_candles: DEFAULT_CHART_CANDLES,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ScreenerConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub explore: ExploreConfig,
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        // Defaults first, then `config/default.(toml|yaml|json)` relative to the working
        // directory, then `SCREENER__...` environment variables.
        Self::load(config::Environment::with_prefix("SCREENER").separator("__"))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let defaults = ExploreConfig::default();
        let api = ApiConfig::default();

        let settings = config::Config::builder()
            .set_default("api.base_url", api.base_url)?
            .set_default("api.chart_base_url", api.chart_base_url)?
            .set_default("api.launchpad", api.launchpad)?
            .set_default("explore.timeframe", defaults.timeframe.as_str())?
            .set_default("explore.chart_interval", defaults.chart_interval.as_str())?
            .set_default("explore.chart_candles", i64::from(defaults.chart_candles))?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(env)
            .build()?;

        settings.try_deserialize().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("SCREENER")
            .separator("__")
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ScreenerConfig::load(env_from(&[])).unwrap();
        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.api.launchpad, "Believe");
    }

    #[test]
    fn test_environment_overrides() {
        let config = ScreenerConfig::load(env_from(&[
            ("SCREENER__API__BASE_URL", "http://localhost:4000"),
            ("SCREENER__EXPLORE__TIMEFRAME", "1h"),
            ("SCREENER__EXPLORE__CHART_CANDLES", "24"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:4000");
        assert_eq!(config.api.chart_base_url, DEFAULT_CHART_BASE_URL);
        assert_eq!(config.explore.timeframe, Timeframe::H1);
        assert_eq!(config.explore.chart_candles, 24);
    }
}
