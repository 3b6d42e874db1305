use std::{env, fmt::Display, str::FromStr};

use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_PORT: &str = "3001";
pub const DEFAULT_FSA_BASE_URL: &str = "https://data.food.gov.uk/food-alerts";

#[derive(Error, Debug)]
#[error("Invalid {key} value: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub fsa_base_url: Url,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", DEFAULT_PORT)?,
            fsa_base_url: try_load("FSA_BASE_URL", DEFAULT_FSA_BASE_URL)?,
        })
    }

    /// Config pointing at an arbitrary upstream, used by tests and embedders.
    pub fn with_upstream(fsa_base_url: Url) -> Self {
        Self {
            port: 0,
            fsa_base_url,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ConfigError {
                key,
                reason: e.to_string(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let port: u16 = DEFAULT_PORT.parse().unwrap();
        let url: Url = DEFAULT_FSA_BASE_URL.parse().unwrap();

        assert_eq!(port, 3001);
        assert_eq!(url.host_str(), Some("data.food.gov.uk"));
    }

    #[test]
    fn test_unset_key_falls_back() {
        let port: u16 = try_load("ALERTS_TEST_UNSET_PORT_KEY", "4242").unwrap();
        assert_eq!(port, 4242);
    }

    #[test]
    fn test_bad_default_is_reported() {
        let err = try_load::<u16>("ALERTS_TEST_UNSET_PORT_KEY", "not-a-port").unwrap_err();
        assert!(err.to_string().starts_with("Invalid ALERTS_TEST_UNSET_PORT_KEY value"));
    }
}
