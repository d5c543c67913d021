// ⚙️ Configuration - engine parameters, data location, server binding
// Read from an optional TOML file; CLI flags override individual values

use crate::error::{RankError, Result};
use crate::household::QuintilePolicy;
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Income assigned to rank 100 in the anchor curve.
    /// Scale it with the currency of the loaded data.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,

    /// How household quintile boundaries are derived
    #[serde(default)]
    pub quintile_policy: QuintilePolicy,
}

fn default_upper_bound() -> f64 {
    300_000.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            upper_bound: default_upper_bound(),
            quintile_policy: QuintilePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.upper_bound.is_finite() || self.upper_bound <= 0.0 {
            return Err(RankError::invalid(format!(
                "upper_bound must be a positive number, got {}",
                self.upper_bound
            )));
        }
        Ok(())
    }
}

// ============================================================================
// DATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for `*.json` distribution/household files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Geography used when a request does not name one
    #[serde(default = "default_geography")]
    pub default_geography: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/census-2021")
}

fn default_geography() -> String {
    "CA".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: default_data_dir(),
            default_geography: default_geography(),
        }
    }
}

// ============================================================================
// SERVER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allowed CORS origin; permissive when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            cors_origin: None,
        }
    }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Parse a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.engine.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) if path.exists() => Config::from_file(path),
            Some(path) => {
                tracing::info!("Config file {:?} not found, using defaults", path);
                Ok(Config::default())
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.upper_bound, 300_000.0);
        assert_eq!(config.engine.quintile_policy, QuintilePolicy::Midpoint);
        assert_eq!(config.data.default_geography, "CA");
        assert_eq!(config.server.bind_addr, "0.0.0.0:3001");
        assert!(config.engine.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            upper_bound = 450000.0
            quintile_policy = "explicit-bounds"

            [data]
            data_dir = "/srv/census"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.upper_bound, 450_000.0);
        assert_eq!(config.engine.quintile_policy, QuintilePolicy::ExplicitBounds);
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/census"));
        assert_eq!(config.data.default_geography, "CA");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_upper_bound() {
        let engine = EngineConfig {
            upper_bound: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(engine.validate(), Err(RankError::InvalidInput(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_addr = \"127.0.0.1:8080\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_from_file_rejects_bad_engine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nupper_bound = -5.0").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
