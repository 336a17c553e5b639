//! # Config
//!
//! `config` is a module for loading velocity limits and file locations from a TOML file.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// Configured velocity limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VelocityLimits {
    /// Maximum amount loaded per day
    pub daily_amount: Decimal,
    /// Maximum amount loaded per Monday-anchored week
    pub weekly_amount: Decimal,
    /// Maximum number of loads per day
    pub daily_loads: u32,
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self {
            daily_amount: Decimal::new(5000, 0),
            weekly_amount: Decimal::new(20000, 0),
            daily_loads: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Transactions file used when none is given on the command line
    pub input_file: Option<PathBuf>,
    /// Decisions file used when none is given on the command line
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub limits: VelocityLimits,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(?config, "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml_str(
            r#"
            input_file = "input.txt"
            output_file = "output.txt"

            [limits]
            daily_amount = "1000.50"
            weekly_amount = "7500"
            daily_loads = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.input_file, Some(PathBuf::from("input.txt")));
        assert_eq!(config.output_file, Some(PathBuf::from("output.txt")));
        assert_eq!(
            config.limits,
            VelocityLimits {
                daily_amount: dec!(1000.50),
                weekly_amount: dec!(7500),
                daily_loads: 5,
            }
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.limits.daily_amount, dec!(5000));
        assert_eq!(config.limits.weekly_amount, dec!(20000));
        assert_eq!(config.limits.daily_loads, 3);
    }

    #[test]
    fn partial_limits_fill_defaults() {
        let config = Config::from_toml_str("[limits]\ndaily_loads = 10\n").unwrap();
        assert_eq!(config.limits.daily_loads, 10);
        assert_eq!(config.limits.daily_amount, dec!(5000));
    }

    #[test]
    fn unknown_limit_fails() {
        assert!(Config::from_toml_str("[limits]\nmonthly_amount = \"1\"\n").is_err());
    }

    #[test]
    fn load_from_path_works() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nweekly_amount = \"12345.67\"").unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.limits.weekly_amount, dec!(12345.67));
    }

    #[test]
    fn missing_file_fails_with_path() {
        let err = Config::load_from_path("/nonexistent/velocity.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/velocity.toml"));
    }
}
