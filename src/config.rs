//! Runtime settings loaded from the environment

use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Bot settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub predict_endpoint: String,
    pub request_timeout: Duration,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Settings {
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:5000/predict";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_CHART_WIDTH: u32 = 1024;
    pub const DEFAULT_CHART_HEIGHT: u32 = 768;

    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let predict_endpoint = lookup("PREDICT_ENDPOINT")
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string());

        let timeout_secs = parse_or(&lookup, "PREDICT_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let chart_width = parse_or(&lookup, "CHART_WIDTH", Self::DEFAULT_CHART_WIDTH)?;
        let chart_height = parse_or(&lookup, "CHART_HEIGHT", Self::DEFAULT_CHART_HEIGHT)?;

        if chart_width == 0 {
            return Err(ConfigError::Invalid { key: "CHART_WIDTH", value: "0".to_string() });
        }
        if chart_height == 0 {
            return Err(ConfigError::Invalid { key: "CHART_HEIGHT", value: "0".to_string() });
        }

        Ok(Self {
            discord_token,
            predict_endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            chart_width,
            chart_height,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
