//! Configuration file support for the PRP calculator.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/prp-calc/config.toml`.

use crate::types::{DEFAULT_PPP_CONCENTRATION_X, DEFAULT_PRP_CONCENTRATION_X, DEFAULT_PRP_YIELD_ML};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub protocol: ProtocolDefaults,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Protocol parameters used when a request omits them
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProtocolDefaults {
    #[serde(default = "default_prp_yield_ml")]
    pub prp_yield_ml: f64,

    #[serde(default = "default_prp_concentration_x")]
    pub prp_concentration_x: f64,

    #[serde(default = "default_ppp_concentration_x")]
    pub ppp_concentration_x: f64,
}

impl Default for ProtocolDefaults {
    fn default() -> Self {
        Self {
            prp_yield_ml: default_prp_yield_ml(),
            prp_concentration_x: default_prp_concentration_x(),
            ppp_concentration_x: default_ppp_concentration_x(),
        }
    }
}

/// Output formatting configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

// Default value functions
fn default_prp_yield_ml() -> f64 {
    DEFAULT_PRP_YIELD_ML
}

fn default_prp_concentration_x() -> f64 {
    DEFAULT_PRP_CONCENTRATION_X
}

fn default_ppp_concentration_x() -> f64 {
    DEFAULT_PPP_CONCENTRATION_X
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject non-finite protocol defaults
    ///
    /// Positivity is still enforced per request by the calculator.
    pub fn validate(&self) -> Result<()> {
        let p = &self.protocol;
        for (name, value) in [
            ("prp_yield_ml", p.prp_yield_ml),
            ("prp_concentration_x", p.prp_concentration_x),
            ("ppp_concentration_x", p.ppp_concentration_x),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!(
                    "protocol.{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".config"),
            None => PathBuf::from("."),
        });
        base.join("prp-calc").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.protocol.prp_yield_ml, 1.0);
        assert_eq!(config.protocol.prp_concentration_x, 7.0);
        assert_eq!(config.protocol.ppp_concentration_x, 0.5);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[protocol]
prp_yield_ml = 1.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.protocol.prp_yield_ml, 1.5);
        assert_eq!(config.protocol.prp_concentration_x, 7.0); // default
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.protocol.ppp_concentration_x = 0.25;
        config.output.pretty = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.protocol, config.protocol);
        assert!(loaded.output.pretty);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[protocol\nprp_yield_ml = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }

    #[test]
    fn test_non_finite_default_rejected() {
        let mut config = Config::default();
        config.protocol.prp_yield_ml = f64::INFINITY;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.ends_with("prp-calc/config.toml"));
    }
}
