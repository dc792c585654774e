//! Configuration loading and management for the exposure engine.
//!
//! This module loads engine metadata, request defaults and the named-package
//! correction overrides from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use exposure_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded engine: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, EngineDefaults, EngineFile, EngineMetadata, NamedWeights, NamedWeightsFile,
};
