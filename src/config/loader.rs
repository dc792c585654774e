//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineFile, EngineMetadata, NamedWeights, NamedWeightsFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml         # Engine metadata and request defaults
/// └── named_weights.yaml  # Fixed correction factors per package name
/// ```
///
/// # Example
///
/// ```no_run
/// use exposure_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Loaded engine: {}", loader.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing or is not valid YAML for
    /// its expected structure.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_file = Self::load_yaml::<EngineFile>(&path.join("engine.yaml"))?;
        let weights_file = Self::load_yaml::<NamedWeightsFile>(&path.join("named_weights.yaml"))?;

        let named_weights: NamedWeights = weights_file.named_weights.into_iter().collect();
        debug!(
            path = %path.display(),
            named_weights = named_weights.len(),
            "Loaded engine configuration"
        );

        let config = EngineConfig::new(engine_file.engine, engine_file.defaults, named_weights);
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

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Returns the named-package correction overrides.
    pub fn named_weights(&self) -> &NamedWeights {
        self.config.named_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComputationMode, SortKey};

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().name, "Outdoor Exposure Engine");
        assert_eq!(loader.metadata().version, "0.1.0");
    }

    #[test]
    fn test_named_weights_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let weights = loader.named_weights();

        assert_eq!(weights.len(), 5);
        assert_eq!(weights.get("강남D"), Some(0.5430));
        assert_eq!(weights.get("서초D"), Some(0.7165));
        assert_eq!(weights.get("이태원D"), Some(0.3311));
        assert_eq!(weights.get("종로D"), Some(0.4892));
        assert_eq!(weights.get("종로중구MD"), Some(0.5442));
    }

    #[test]
    fn test_defaults_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let defaults = loader.config().defaults();

        assert_eq!(defaults.mode, ComputationMode::Default);
        assert_eq!(defaults.sort_by, SortKey::Rots);
        assert_eq!(defaults.top_n, None);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_engine_file_defaults_are_optional() {
        let parsed: EngineFile =
            serde_yaml::from_str("engine:\n  name: test\n  version: \"1\"\n").unwrap();
        assert_eq!(parsed.defaults.mode, ComputationMode::Default);
        assert_eq!(parsed.defaults.top_n, None);
    }

    #[test]
    fn test_malformed_weights_fail_to_parse() {
        let parsed = serde_yaml::from_str::<NamedWeightsFile>("named_weights: [1, 2]");
        assert!(parsed.is_err());
    }
}
