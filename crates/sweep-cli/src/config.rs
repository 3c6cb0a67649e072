use anyhow::{Context, Result};
use chrono::NaiveDate;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use sweep_core::models::MaterializationConfig;
use sweep_core::timezone::{today_in, validate_timezone};

const CONFIG_FILE: &str = "sweep.toml";
const ENV_PREFIX: &str = "SWEEP_";

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// IANA timezone that defines "today" for materialization and expiry
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// Fallback log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub materialization: MaterializationConfig,
}

fn default_database_path() -> String {
    "sweep.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().context("Failed to load configuration")?;
        validate_timezone(&config.timezone)?;
        Ok(config)
    }

    /// Today's date in the configured timezone
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(today_in(&self.timezone)?)
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz) if validate_timezone(&tz).is_ok() => tz,
        _ => "UTC".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config =
            Config::from_figment(Figment::new().merge(Toml::string("timezone = \"UTC\""))).unwrap();
        assert_eq!(config.database_path, "sweep.db");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.materialization, MaterializationConfig::default());
    }

    #[test]
    fn test_partial_materialization_table() {
        let toml = r#"
            database_path = "/var/lib/sweep/jobs.db"
            timezone = "America/Chicago"

            [materialization]
            horizon_months = 6
        "#;
        let config = Config::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();
        assert_eq!(config.database_path, "/var/lib/sweep/jobs.db");
        assert_eq!(config.materialization.horizon_months, 6);
        assert_eq!(config.materialization.max_batch_size, 100);
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let result = Config::from_figment(Figment::new().merge(Toml::string("timezone = \"Nowhere/Town\"")));
        assert!(result.is_err());
    }

    #[test]
    fn test_detected_timezone_is_valid() {
        assert!(validate_timezone(&detect_system_timezone()).is_ok());
    }
}
