//! Configuration Loader
//!
//! Environment-aware configuration loading. Discovers a YAML file, applies
//! environment-specific overrides, validates, and hands out an immutable
//! snapshot. Missing files fall back to defaults so development and test
//! environments need no setup.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::GauntletConfig;
use crate::error::{GauntletError, Result};

/// Immutable configuration snapshot plus the environment it was loaded for
pub struct ConfigManager {
    config: GauntletConfig,
    environment: String,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> Result<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_with_env(&environment)
    }

    /// Load configuration for an explicit environment
    ///
    /// Useful for tests that must not mutate global environment variables.
    pub fn load_with_env(environment: &str) -> Result<Arc<ConfigManager>> {
        let config = match Self::config_file_path(environment) {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!(
                    environment = environment,
                    "No configuration file found, using defaults"
                );
                GauntletConfig::default()
            }
        };

        config.validate().map_err(GauntletError::Configuration)?;

        debug!(
            environment = environment,
            elimination_threshold = config.processing.elimination_threshold,
            drain_batch_size = config.notifications.drain_batch_size,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
        }))
    }

    pub fn config(&self) -> &GauntletConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Detect environment from GAUNTLET_ENV, falling back to development
    fn detect_environment() -> String {
        env::var("GAUNTLET_ENV").unwrap_or_else(|_| "development".to_string())
    }

    /// Resolve the config file for an environment
    ///
    /// `GAUNTLET_CONFIG_PATH` points at an explicit file; otherwise
    /// `config/gauntlet-config.{environment}.yaml` then
    /// `config/gauntlet-config.yaml` are tried relative to the working
    /// directory. Returns None when nothing exists.
    fn config_file_path(environment: &str) -> Option<PathBuf> {
        if let Ok(explicit) = env::var("GAUNTLET_CONFIG_PATH") {
            let path = PathBuf::from(explicit);
            if path.exists() {
                return Some(path);
            }
            warn!(
                path = %path.display(),
                "GAUNTLET_CONFIG_PATH set but file does not exist"
            );
            return None;
        }

        let candidates = [
            PathBuf::from(format!("config/gauntlet-config.{environment}.yaml")),
            PathBuf::from("config/gauntlet-config.yaml"),
        ];
        candidates.into_iter().find(|p| p.exists())
    }

    fn load_from_file(path: &Path) -> Result<GauntletConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GauntletError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            GauntletError::Configuration(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}
