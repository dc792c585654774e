//! Report models for the exposure engine.
//!
//! This module contains the [`ExposureReport`] type and the flat tables it
//! carries: adjusted unit rows, aggregate totals, demographic breakdowns,
//! map markers and an audit trace of every stage that ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ComputationMode, DemographicFilter, Gender, MediaType, PackageType, ShelterType};

/// The branch of the Metric Adjuster that produced a unit's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Adjustment disabled by the computation mode.
    FormulaDisabled,
    /// Poster on a tourist information panel, halved.
    TouristPosterHalved,
    /// Digital-sharing formula applied.
    DigitalSharing,
    /// Digital formula applicable but stay time missing; raw kept.
    MissingStayTime,
    /// Digital formula applicable but share of time missing; raw kept.
    MissingShareOfTime,
    /// No adjustment applicable; raw kept.
    PassThrough,
}

impl AdjustmentRule {
    /// Returns the snake_case identifier of this rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormulaDisabled => "formula_disabled",
            Self::TouristPosterHalved => "tourist_poster_halved",
            Self::DigitalSharing => "digital_sharing",
            Self::MissingStayTime => "missing_stay_time",
            Self::MissingShareOfTime => "missing_share_of_time",
            Self::PassThrough => "pass_through",
        }
    }
}

/// One media unit after adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedUnit {
    /// Unit identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Installation type, if recorded.
    pub shelter_type: Option<ShelterType>,
    /// Media type, if recorded.
    pub media_type: Option<MediaType>,
    /// Package type the unit was evaluated under.
    pub package_type: PackageType,
    /// ROTS fed into the adjuster.
    pub raw_rots: f64,
    /// Reach fed into the adjuster.
    pub raw_reach: f64,
    /// ROTS after adjustment.
    pub adjusted_rots: f64,
    /// Reach after adjustment, before the correction factor.
    pub adjusted_reach: f64,
    /// The adjuster branch that fired.
    pub rule: AdjustmentRule,
    /// Latitude, passed through.
    pub latitude: Option<f64>,
    /// Longitude, passed through.
    pub longitude: Option<f64>,
    /// Opaque grade label.
    pub grade: Option<String>,
}

/// Where a correction factor came from.
///
/// A `TableGap` and a calibrated zero both carry a factor of 0; the source
/// keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSource {
    /// No units selected.
    EmptySelection,
    /// Fixed override for a named package.
    NamedPackage,
    /// Exact match in the quantity table.
    QuantityTable,
    /// No row at the capped lookup quantity.
    TableGap,
}

/// A resolved correction factor and how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResolution {
    /// The reach multiplier.
    pub factor: f64,
    /// How the factor was resolved.
    pub source: CorrectionSource,
    /// Number of units the resolution was asked about.
    pub selection_size: usize,
    /// The quantity looked up after capping, for table-based resolutions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_quantity: Option<u32>,
}

impl CorrectionResolution {
    /// Resolution for an empty selection.
    pub fn empty() -> Self {
        Self {
            factor: 0.0,
            source: CorrectionSource::EmptySelection,
            selection_size: 0,
            lookup_quantity: None,
        }
    }
}

/// Aggregated totals for a set of adjusted units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTotals {
    /// Number of units aggregated.
    pub unit_count: usize,
    /// Sum of adjusted ROTS.
    pub total_rots: f64,
    /// Sum of adjusted Reach before correction.
    pub total_reach_raw: f64,
    /// Correction factor applied to the reach sum.
    pub correction: CorrectionResolution,
    /// Corrected Reach.
    pub total_reach: f64,
    /// ROTS per unit of corrected Reach, 0 when Reach is 0.
    pub frequency: f64,
}

impl MetricTotals {
    /// Totals of an empty selection.
    pub fn empty() -> Self {
        Self {
            unit_count: 0,
            total_rots: 0.0,
            total_reach_raw: 0.0,
            correction: CorrectionResolution::empty(),
            total_reach: 0.0,
            frequency: 0.0,
        }
    }
}

/// Corrected totals for one gender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderGroup {
    /// The gender.
    pub gender: Gender,
    /// Display label.
    pub label: String,
    /// Adjusted ROTS.
    pub rots: f64,
    /// Adjusted and corrected Reach.
    pub reach: f64,
}

/// Corrected totals for one age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroup {
    /// Age bracket code.
    pub age: u8,
    /// Display label.
    pub label: String,
    /// Adjusted ROTS.
    pub rots: f64,
    /// Adjusted and corrected Reach.
    pub reach: f64,
}

/// Corrected totals for one (age, gender) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGenderGroup {
    /// Age bracket code.
    pub age: u8,
    /// The gender.
    pub gender: Gender,
    /// Age display label.
    pub age_label: String,
    /// Gender display label.
    pub gender_label: String,
    /// Adjusted ROTS.
    pub rots: f64,
    /// Adjusted and corrected Reach.
    pub reach: f64,
}

/// Demographic decomposition of the displayed subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    /// False when no demographic record matched the displayed units.
    pub has_data: bool,
    /// Totals per gender, F before M.
    pub by_gender: Vec<GenderGroup>,
    /// Totals per age bracket, ascending.
    pub by_age: Vec<AgeGroup>,
    /// Totals per (age, gender), age ascending then F before M.
    pub by_age_gender: Vec<AgeGenderGroup>,
}

/// A displayed unit with a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    /// Unit identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Marker color for the unit's shelter type.
    pub color: String,
    /// Adjusted ROTS.
    pub rots: f64,
    /// Adjusted Reach.
    pub reach: f64,
}

/// Whether a report carries results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// At least one unit was selected.
    Ok,
    /// The selection resolved to no units.
    NoData,
}

/// What the Selection Resolver produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    /// Human-readable context label.
    pub context: String,
    /// Number of units selected.
    pub unit_count: usize,
    /// Number of ids entered, for custom selections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_ids: Option<usize>,
    /// Number of distinct entered ids found in the month, for custom selections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_ids: Option<usize>,
    /// Demographic restriction applied to raw values.
    pub demographic_filter: DemographicFilter,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Identifier of the stage that ran.
    pub rule_id: String,
    /// Human-readable name of the stage.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag data-quality issues that never stop a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Everything the engine returns for one request.
///
/// Every table is flat and final: the presentation layer renders it without
/// further arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was computed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that computed it.
    pub engine_version: String,
    /// Reporting month key.
    pub month: String,
    /// Adjustment scenario used.
    pub mode: ComputationMode,
    /// Whether the selection produced any units.
    pub status: ReportStatus,
    /// Selection summary.
    pub selection: SelectionSummary,
    /// Adjusted rows of the displayed subset, in ranked order.
    pub units: Vec<AdjustedUnit>,
    /// Totals over the whole selection.
    pub full_selection: MetricTotals,
    /// Totals over the displayed subset.
    pub displayed: MetricTotals,
    /// Demographic decomposition of the displayed subset.
    pub demographics: DemographicBreakdown,
    /// Displayed units that carry coordinates.
    pub map_markers: Vec<MapMarker>,
    /// Audit trace of every stage.
    pub audit_trace: AuditTrace,
}
