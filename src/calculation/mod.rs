//! Calculation logic for the exposure engine.
//!
//! This module contains the pipeline stages: selection resolution, per-unit
//! metric adjustment, correction factor resolution, aggregation and
//! ranking, demographic allocation and map markers, plus the report
//! orchestrator that runs them in order.

mod aggregation;
mod correction_factor;
mod demographic_allocation;
mod map_markers;
mod metric_adjustment;
mod report;
mod selection;

pub use aggregation::{AggregationResult, aggregate, aggregate_totals, rank_units};
pub use correction_factor::{CorrectionFactorResult, resolve_correction_factor};
pub use demographic_allocation::{
    DEFAULT_REACH_RATIO, DemographicAllocationResult, ReachRatios, allocate_demographics,
};
pub use map_markers::{DEFAULT_MARKER_COLOR, map_markers};
pub use metric_adjustment::{
    AdjustedMetrics, FULL_SLOT_SHARE, SHARING_WEIGHT, STAY_TIME_BASELINE, adjust_metrics,
    adjust_unit, adjust_units, time_factor,
};
pub use report::build_report;
pub use selection::{
    ALL_DIGITAL_OPTION, ALL_POSTER_OPTION, ContextTypes, ResolvedSelection, context_types,
    found_unit_ids, package_options, parse_custom_ids, resolve_selection,
};
