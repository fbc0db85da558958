//! # config
//!
//! Startup configuration for the straddle monitor.
//!
//! Everything here is a constant for the lifetime of the process — the
//! session loop receives a [`Config`] once and never consults the
//! environment again. Defaults target an SPX / CBOE setup against a local
//! gateway.
//!
//! | Variable             | Default       | Description                          |
//! |----------------------|---------------|--------------------------------------|
//! | `TWS_HOST`           | `127.0.0.1`   | Data endpoint host                   |
//! | `TWS_PORT`           | `7496`        | Data endpoint port (7497 = paper)    |
//! | `CLIENT_ID`          | `3`           | Provider client identifier           |
//! | `UNDERLYING`         | `SPX`         | Index symbol to track                |
//! | `EXCHANGE`           | `CBOE`        | Listing venue of the underlying      |
//! | `SMART_VENUE`        | `SMART`       | Routed venue for option chains       |
//! | `TRADING_CLASS`      | `SPXW`        | Preferred (PM-settled weekly) class  |
//! | `STRIKE_STEP`        | `5`           | Strike rounding interval             |
//! | `EXPIRY_COUNT`       | `6`           | Number of expirations to track       |
//! | `POLL_INTERVAL_SECS` | `5`           | Dashboard refresh cadence            |
//! | `SETTLE_DELAY_SECS`  | `2`           | Wait after a re-subscription         |
//! | `DATA_MODE`          | `delayed`     | `live` or `delayed` market data      |
//! | `SIM_START_PRICE`    | `5000`        | Opening spot for the simulated feed  |

use std::time::Duration;

use crate::models::DataMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub client_id: u32,
    pub underlying: String,
    pub exchange: String,
    pub smart_venue: String,
    pub trading_class: String,
    pub strike_step: f64,
    pub expiry_count: usize,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub data_mode: DataMode,
    pub sim_start_price: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let data_mode = match env_str("DATA_MODE", "delayed").to_ascii_lowercase().as_str() {
            "live" => DataMode::Live,
            _ => DataMode::Delayed,
        };

        Self {
            host: env_str("TWS_HOST", "127.0.0.1"),
            port: env_parse("TWS_PORT", 7496),
            client_id: env_parse("CLIENT_ID", 3),
            underlying: env_str("UNDERLYING", "SPX"),
            exchange: env_str("EXCHANGE", "CBOE"),
            smart_venue: env_str("SMART_VENUE", "SMART"),
            trading_class: env_str("TRADING_CLASS", "SPXW"),
            strike_step: env_parse("STRIKE_STEP", 5.0),
            expiry_count: env_parse("EXPIRY_COUNT", 6),
            poll_interval: Duration::from_secs(env_parse("POLL_INTERVAL_SECS", 5)),
            settle_delay: Duration::from_secs(env_parse("SETTLE_DELAY_SECS", 2)),
            data_mode,
            sim_start_price: env_parse("SIM_START_PRICE", 5000.0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Env-var-free keys only, so parallel tests cannot interfere.
        assert_eq!(env_parse("STRADDLE_TEST_UNSET_PORT", 7496u16), 7496);
        assert_eq!(env_str("STRADDLE_TEST_UNSET_HOST", "127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_data_mode_parsing() {
        std::env::remove_var("DATA_MODE");
        let cfg = Config::from_env();
        assert_eq!(cfg.data_mode, DataMode::Delayed);
    }
}
