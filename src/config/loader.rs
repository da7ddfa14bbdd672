//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineFile, EngineMetadata, PresenceConfig, ToleranceConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/
/// ├── engine.yaml      # Metadata and batch settings
/// ├── tolerances.yaml  # Check-in, lateness, checkout and overtime windows
/// └── presence.yaml    # Presence state classification
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// println!("Lateness grace: {} min", loader.tolerances().lateness_tolerance_minutes);
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any value violates its constraints
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_file = Self::load_yaml::<EngineFile>(&path.join("engine.yaml"))?;
        let tolerances = Self::load_yaml::<ToleranceConfig>(&path.join("tolerances.yaml"))?;
        let presence = Self::load_yaml::<PresenceConfig>(&path.join("presence.yaml"))?;

        let config = EngineConfig::new(engine_file.engine, tolerances, presence, engine_file.batch)?;
        debug!(
            path = %path.display(),
            name = %config.metadata().name,
            version = %config.metadata().version,
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the deployment metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Returns the tolerance windows.
    pub fn tolerances(&self) -> &ToleranceConfig {
        self.config.tolerances()
    }

    /// Returns the presence state classification.
    pub fn presence(&self) -> &PresenceConfig {
        self.config.presence()
    }
}
