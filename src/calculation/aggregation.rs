//! Aggregation and ranking of adjusted units.

use std::cmp::Ordering;

use crate::models::{AdjustedUnit, AuditStep, CorrectionResolution, MetricTotals, SortKey};

/// The result of aggregating a set of units, including the audit step.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// The aggregated totals.
    pub totals: MetricTotals,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Sums adjusted metrics and applies the correction factor to the Reach sum.
///
/// The factor is applied once, after summing. Frequency is
/// `total_rots / total_reach`, or 0 when the corrected Reach is 0.
pub fn aggregate_totals(units: &[AdjustedUnit], correction: CorrectionResolution) -> MetricTotals {
    let total_rots: f64 = units.iter().map(|unit| unit.adjusted_rots).sum();
    let total_reach_raw: f64 = units.iter().map(|unit| unit.adjusted_reach).sum();
    let total_reach = total_reach_raw * correction.factor;
    let frequency = if total_reach > 0.0 {
        total_rots / total_reach
    } else {
        0.0
    };

    MetricTotals {
        unit_count: units.len(),
        total_rots,
        total_reach_raw,
        correction,
        total_reach,
        frequency,
    }
}

/// Aggregates a set of units and records an audit step.
///
/// `scope` names the set being aggregated ("full_selection" or "displayed")
/// and becomes part of the step's rule id.
pub fn aggregate(
    units: &[AdjustedUnit],
    correction: CorrectionResolution,
    scope: &str,
    step_number: u32,
) -> AggregationResult {
    let totals = aggregate_totals(units, correction);

    let audit_step = AuditStep {
        step_number,
        rule_id: format!("aggregation_{}", scope),
        rule_name: "Aggregation".to_string(),
        input: serde_json::json!({
            "unit_count": totals.unit_count,
            "correction_factor": totals.correction.factor,
        }),
        output: serde_json::json!({
            "total_rots": totals.total_rots,
            "total_reach_raw": totals.total_reach_raw,
            "total_reach": totals.total_reach,
            "frequency": totals.frequency,
        }),
        reasoning: format!(
            "{} units: reach {} x {} = {}",
            totals.unit_count, totals.total_reach_raw, totals.correction.factor, totals.total_reach
        ),
    };

    AggregationResult { totals, audit_step }
}

/// Returns the displayed subset: units ranked by `sort_by`, descending.
///
/// The sort is stable, so ties keep selection order. `top_n` of `None` or 0
/// keeps every unit; larger values than the selection are clamped.
pub fn rank_units(
    units: &[AdjustedUnit],
    sort_by: SortKey,
    top_n: Option<usize>,
) -> Vec<AdjustedUnit> {
    let key = |unit: &AdjustedUnit| match sort_by {
        SortKey::Rots => unit.adjusted_rots,
        SortKey::Reach => unit.adjusted_reach,
    };

    let mut ranked = units.to_vec();
    ranked.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));

    match top_n {
        Some(n) if n > 0 => ranked.truncate(n),
        _ => {}
    }
    ranked
}
