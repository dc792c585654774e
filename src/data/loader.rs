//! Concurrent source-table loading.
//!
//! Every table is read on its own task and the load completes only when all
//! of them have arrived. A single failure fails the whole load: the engine
//! never starts on partial data.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::dataset::Dataset;
use super::packages::PackageTable;
use super::rows::{DemographicRow, DigitalRow, FactorRow, KpiRow, PackageRow, ShelterRow};

/// Everything loaded from a dataset directory.
#[derive(Debug, Clone)]
pub struct SourceTables {
    /// The immutable joined dataset.
    pub dataset: Dataset,
    /// The package table, which callers may append to.
    pub packages: PackageTable,
}

/// Loads the six source tables of a dataset directory.
///
/// # Directory Structure
///
/// ```text
/// data/sample/
/// ├── kpi.json           # Unit summary per month
/// ├── digital.json       # Stay time and share of time per unit and month
/// ├── shelter.json       # Coordinates and grade per unit
/// ├── package.json       # Package memberships
/// ├── factor.json        # Correction factor per quantity
/// └── demographics.json  # Metrics per unit, month, gender and age
/// ```
///
/// # Example
///
/// ```no_run
/// use exposure_engine::data::DatasetLoader;
///
/// # async fn run() -> exposure_engine::error::EngineResult<()> {
/// let tables = DatasetLoader::load("./data/sample").await?;
/// println!("Loaded {} units", tables.dataset.units().len());
/// # Ok(())
/// # }
/// ```
pub struct DatasetLoader;

impl DatasetLoader {
    /// Loads every table concurrently and joins them.
    pub async fn load<P: AsRef<Path>>(path: P) -> EngineResult<SourceTables> {
        let dir = path.as_ref().to_path_buf();
        let started = Instant::now();

        let kpi = Self::spawn_read::<KpiRow>(&dir, "kpi");
        let digital = Self::spawn_read::<DigitalRow>(&dir, "digital");
        let shelter = Self::spawn_read::<ShelterRow>(&dir, "shelter");
        let package = Self::spawn_read::<PackageRow>(&dir, "package");
        let factor = Self::spawn_read::<FactorRow>(&dir, "factor");
        let demographics = Self::spawn_read::<DemographicRow>(&dir, "demographics");

        let (kpi, digital, shelter, package, factor, demographics) = tokio::try_join!(
            Self::join(kpi),
            Self::join(digital),
            Self::join(shelter),
            Self::join(package),
            Self::join(factor),
            Self::join(demographics),
        )?;

        let dataset = Dataset::from_rows(kpi, digital, shelter, demographics, factor);
        let packages = PackageTable::from_rows(package);

        info!(
            path = %dir.display(),
            units = dataset.units().len(),
            demographics = dataset.demographics().len(),
            packages = packages.names().len(),
            duration_us = started.elapsed().as_micros() as u64,
            "Loaded source tables"
        );

        Ok(SourceTables { dataset, packages })
    }

    /// Starts reading one table on its own task.
    fn spawn_read<T>(dir: &Path, table: &'static str) -> JoinHandle<EngineResult<Vec<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = dir.join(format!("{}.json", table));
        tokio::spawn(Self::read_table(path, table))
    }

    /// Reads and parses one JSON table file.
    async fn read_table<T: DeserializeOwned>(
        path: PathBuf,
        table: &'static str,
    ) -> EngineResult<Vec<T>> {
        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|_| EngineError::DataNotFound {
                    table: table.to_string(),
                    path: path.display().to_string(),
                })?;

        let rows: Vec<T> =
            serde_json::from_str(&content).map_err(|e| EngineError::DataParseError {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        debug!(table, rows = rows.len(), "Read source table");
        Ok(rows)
    }

    /// Waits for a table task, folding task failures into load errors.
    async fn join<T>(handle: JoinHandle<EngineResult<T>>) -> EngineResult<T> {
        handle.await.map_err(|e| EngineError::DataLoadFailed {
            message: e.to_string(),
        })?
    }
}
