//! Core data models for the exposure engine.
//!
//! This module contains all the domain models used throughout the engine.

mod correction;
mod demographic;
mod media_unit;
mod report;
mod selection;

pub use correction::{CorrectionRow, CorrectionTable};
pub use demographic::{
    DemographicFilter, DemographicRecord, Gender, GenderFilter, MAX_AGE_BRACKET, age_label,
};
pub use media_unit::{MediaType, MediaUnit, PackageType, ShelterType};
pub use report::{
    AdjustedUnit, AdjustmentRule, AgeGenderGroup, AgeGroup, AuditStep, AuditTrace, AuditWarning,
    CorrectionResolution, CorrectionSource, DemographicBreakdown, ExposureReport, GenderGroup,
    MapMarker, MetricTotals, ReportStatus, SelectionSummary,
};
pub use selection::{ComputationMode, PackageContext, ReportOptions, SelectionQuery, SortKey};
