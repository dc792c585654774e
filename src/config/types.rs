//! Configuration types for the exposure engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::{ComputationMode, SortKey};

/// Metadata about the engine deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Human-readable engine name.
    pub name: String,
    /// Version string stamped on every report.
    pub version: String,
}

/// Defaults applied when a request leaves an option out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineDefaults {
    /// Computation mode when none is requested.
    #[serde(default)]
    pub mode: ComputationMode,
    /// Ranking metric when none is requested.
    #[serde(default)]
    pub sort_by: SortKey,
    /// Displayed subset size when none is requested.
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// engine.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineFile {
    /// Engine metadata.
    pub engine: EngineMetadata,
    /// Request defaults.
    #[serde(default)]
    pub defaults: EngineDefaults,
}

/// named_weights.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedWeightsFile {
    /// Map of package name to fixed correction factor.
    pub named_weights: BTreeMap<String, f64>,
}

/// Fixed correction factors for specific named packages.
///
/// A package listed here bypasses the quantity table entirely.
///
/// # Example
///
/// ```
/// use exposure_engine::config::NamedWeights;
///
/// let weights = NamedWeights::from_iter([("강남D".to_string(), 0.5430)]);
/// assert_eq!(weights.get("강남D"), Some(0.5430));
/// assert_eq!(weights.get("서초D"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedWeights {
    weights: BTreeMap<String, f64>,
}

impl NamedWeights {
    /// Returns the override factor for a package name.
    pub fn get(&self, package_name: &str) -> Option<f64> {
        self.weights.get(package_name).copied()
    }

    /// Returns the number of configured overrides.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true when no override is configured.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(String, f64)> for NamedWeights {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    defaults: EngineDefaults,
    named_weights: NamedWeights,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        metadata: EngineMetadata,
        defaults: EngineDefaults,
        named_weights: NamedWeights,
    ) -> Self {
        Self {
            metadata,
            defaults,
            named_weights,
        }
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the request defaults.
    pub fn defaults(&self) -> &EngineDefaults {
        &self.defaults
    }

    /// Returns the named-package correction overrides.
    pub fn named_weights(&self) -> &NamedWeights {
        &self.named_weights
    }
}
