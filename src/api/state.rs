//! Application state for the exposure engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::ConfigLoader;
use crate::data::{Dataset, PackageTable, SourceTables};

/// Shared application state.
///
/// The configuration and dataset are immutable for the life of the server.
/// The package table is the only mutable table and sits behind a lock.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    dataset: Arc<Dataset>,
    packages: Arc<RwLock<PackageTable>>,
}

impl AppState {
    /// Creates a new application state from loaded configuration and tables.
    pub fn new(config: ConfigLoader, tables: SourceTables) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(tables.dataset),
            packages: Arc::new(RwLock::new(tables.packages)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the immutable dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Locks the package table for reading.
    ///
    /// A poisoned lock is recovered: appends either fully apply or fail
    /// before touching the table.
    pub fn packages(&self) -> RwLockReadGuard<'_, PackageTable> {
        self.packages.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the package table for writing.
    pub fn packages_mut(&self) -> RwLockWriteGuard<'_, PackageTable> {
        self.packages.write().unwrap_or_else(PoisonError::into_inner)
    }
}
