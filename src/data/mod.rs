//! Source-table access for the exposure engine.
//!
//! This module loads the unit summary, digital attribute, shelter, package,
//! correction-factor and demographic tables, joins them into a read-only
//! [`Dataset`] and keeps the append-only [`PackageTable`] separate.

mod dataset;
mod loader;
mod packages;
mod rows;

pub use dataset::Dataset;
pub use loader::{DatasetLoader, SourceTables};
pub use packages::{PackageMember, PackageTable};
pub use rows::{DemographicRow, DigitalRow, FactorRow, KpiRow, PackageRow, ShelterRow};
