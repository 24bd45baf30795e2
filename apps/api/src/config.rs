use anyhow::{anyhow, Context, Result};

use crate::assessment::profiles::ProfileFallback;
use crate::assessment::strategy::StrategyKind;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// In-memory stores are used when unset.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub classification_strategy: StrategyKind,
    pub profile_fallback: ProfileFallback,
    pub seed_catalog: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            classification_strategy: optional_env("CLASSIFICATION_STRATEGY")
                .map(|v| v.parse::<StrategyKind>().map_err(|e| anyhow!(e)))
                .transpose()
                .context("CLASSIFICATION_STRATEGY must be 'threshold' or 'permutation'")?
                .unwrap_or_default(),
            profile_fallback: optional_env("PROFILE_FALLBACK")
                .map(|v| parse_fallback(&v))
                .transpose()?
                .unwrap_or_default(),
            seed_catalog: optional_env("SEED_CATALOG")
                .map(|v| parse_bool("SEED_CATALOG", &v))
                .transpose()?
                .unwrap_or(true),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_fallback(value: &str) -> Result<ProfileFallback> {
    match value.trim().to_ascii_lowercase().as_str() {
        "first" => Ok(ProfileFallback::First),
        "none" => Ok(ProfileFallback::None),
        other => Err(anyhow!(
            "PROFILE_FALLBACK must be 'first' or 'none', got '{other}'"
        )),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean, got '{other}'")),
    }
}
