//! Report orchestration.
//!
//! Runs the stages in order: selection, adjustment, correction and
//! aggregation of the full selection, ranking, correction and aggregation
//! of the displayed subset, then demographic allocation and map markers.
//! Every stage records an audit step; data-quality issues become warnings.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::NamedWeights;
use crate::data::{Dataset, PackageTable};
use crate::models::{
    AdjustedUnit, AuditStep, AuditTrace, AuditWarning, CorrectionSource, DemographicBreakdown,
    ExposureReport, MetricTotals, PackageContext, ReportOptions, ReportStatus, SelectionQuery,
};

use super::aggregation::{aggregate, rank_units};
use super::correction_factor::resolve_correction_factor;
use super::demographic_allocation::{ReachRatios, allocate_demographics};
use super::map_markers::map_markers;
use super::metric_adjustment::adjust_units;
use super::selection::resolve_selection;

/// Builds the exposure report for one request.
///
/// An empty selection yields a [`ReportStatus::NoData`] report with zero
/// totals and no downstream stages. Nothing here fails: missing joins,
/// table gaps and absent demographics surface as audit warnings.
///
/// # Examples
///
/// ```
/// use exposure_engine::calculation::build_report;
/// use exposure_engine::config::NamedWeights;
/// use exposure_engine::data::{Dataset, PackageTable};
/// use exposure_engine::models::{
///     DemographicFilter, PackageContext, ReportOptions, ReportStatus, SelectionQuery,
/// };
///
/// let query = SelectionQuery {
///     month: "202501".to_string(),
///     context: PackageContext::AllDigital,
///     shelter_type: None,
///     media_type: None,
///     search: None,
///     demographic: DemographicFilter::default(),
/// };
///
/// let report = build_report(
///     &Dataset::default(),
///     &PackageTable::default(),
///     &NamedWeights::default(),
///     &query,
///     &ReportOptions::default(),
/// );
/// assert_eq!(report.status, ReportStatus::NoData);
/// ```
pub fn build_report(
    dataset: &Dataset,
    packages: &PackageTable,
    weights: &NamedWeights,
    query: &SelectionQuery,
    options: &ReportOptions,
) -> ExposureReport {
    let started = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let selection = resolve_selection(dataset, packages, query, step_number);
    steps.push(selection.audit_step);
    step_number += 1;

    if let (PackageContext::Custom { ids, .. }, Some(found)) =
        (&query.context, selection.summary.found_ids)
    {
        let distinct_requested = ids.iter().map(|id| id.trim()).collect::<HashSet<_>>().len();
        if found < distinct_requested {
            warnings.push(AuditWarning {
                code: "CUSTOM_IDS_NOT_FOUND".to_string(),
                message: format!(
                    "{} of {} distinct entered ids have no data in {}",
                    distinct_requested - found,
                    distinct_requested,
                    query.month
                ),
                severity: "medium".to_string(),
            });
        }
    }

    if selection.units.is_empty() {
        let duration_us = started.elapsed().as_micros() as u64;
        debug!(month = %query.month, context = %selection.summary.context, "Selection is empty");
        return ExposureReport {
            report_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            month: query.month.clone(),
            mode: options.mode,
            status: ReportStatus::NoData,
            selection: selection.summary,
            units: Vec::new(),
            full_selection: MetricTotals::empty(),
            displayed: MetricTotals::empty(),
            demographics: DemographicBreakdown::default(),
            map_markers: Vec::new(),
            audit_trace: AuditTrace {
                steps,
                warnings,
                duration_us,
            },
        };
    }

    let adjusted = adjust_units(&selection.units, options.mode);
    steps.push(adjustment_step(&adjusted, options, step_number));
    step_number += 1;

    let over_count = adjusted
        .iter()
        .filter(|unit| unit.adjusted_reach > unit.adjusted_rots)
        .count();
    if over_count > 0 {
        warnings.push(AuditWarning {
            code: "REACH_EXCEEDS_ROTS".to_string(),
            message: format!("{} units report more reach than rots", over_count),
            severity: "low".to_string(),
        });
    }

    let package_name = query.context.package_name();
    let table = dataset.correction_table();

    let full_correction =
        resolve_correction_factor(adjusted.len(), package_name, table, weights, step_number);
    steps.push(full_correction.audit_step);
    step_number += 1;

    let full = aggregate(&adjusted, full_correction.resolution, "full_selection", step_number);
    steps.push(full.audit_step);
    step_number += 1;

    let displayed_units = rank_units(&adjusted, options.sort_by, options.top_n);
    steps.push(AuditStep {
        step_number,
        rule_id: "ranking".to_string(),
        rule_name: "Ranking".to_string(),
        input: serde_json::json!({
            "unit_count": adjusted.len(),
            "sort_by": options.sort_by,
            "top_n": options.top_n,
        }),
        output: serde_json::json!({
            "displayed_count": displayed_units.len(),
        }),
        reasoning: format!(
            "Displaying {} of {} units",
            displayed_units.len(),
            adjusted.len()
        ),
    });
    step_number += 1;

    let displayed_correction = resolve_correction_factor(
        displayed_units.len(),
        package_name,
        table,
        weights,
        step_number,
    );
    steps.push(displayed_correction.audit_step);
    step_number += 1;

    let displayed = aggregate(
        &displayed_units,
        displayed_correction.resolution,
        "displayed",
        step_number,
    );
    steps.push(displayed.audit_step);
    step_number += 1;

    for (scope, totals) in [("full selection", &full.totals), ("displayed", &displayed.totals)] {
        if totals.correction.source == CorrectionSource::TableGap {
            warnings.push(AuditWarning {
                code: "TABLE_GAP".to_string(),
                message: match totals.correction.lookup_quantity {
                    Some(quantity) => format!(
                        "No correction factor for quantity {} ({}), reach set to 0",
                        quantity, scope
                    ),
                    None => format!("Correction table is empty ({}), reach set to 0", scope),
                },
                severity: "high".to_string(),
            });
        }
    }

    let ratios = ReachRatios::from_units(&displayed_units);
    let selected: HashSet<&str> = selection.units.iter().map(|unit| unit.id.as_str()).collect();
    let records = dataset
        .demographics_for_month(&query.month)
        .filter(|record| selected.contains(record.unit_id.as_str()))
        .filter(|record| query.demographic.matches(record));
    let allocation = allocate_demographics(
        records,
        &ratios,
        displayed.totals.correction.factor,
        step_number,
    );
    steps.push(allocation.audit_step);

    if !allocation.breakdown.has_data {
        warnings.push(AuditWarning {
            code: "NO_DEMOGRAPHIC_DATA".to_string(),
            message: format!("No demographic records for the selection in {}", query.month),
            severity: "low".to_string(),
        });
    }
    if allocation.defaulted_records > 0 {
        warnings.push(AuditWarning {
            code: "DEMOGRAPHIC_RATIO_DEFAULTED".to_string(),
            message: format!(
                "{} demographic records belong to units outside the displayed subset and kept their measured reach",
                allocation.defaulted_records
            ),
            severity: "low".to_string(),
        });
    }

    let markers = map_markers(&displayed_units);
    let duration_us = started.elapsed().as_micros() as u64;

    debug!(
        month = %query.month,
        context = %selection.summary.context,
        units = adjusted.len(),
        displayed = displayed_units.len(),
        warnings = warnings.len(),
        duration_us,
        "Built exposure report"
    );

    ExposureReport {
        report_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        month: query.month.clone(),
        mode: options.mode,
        status: ReportStatus::Ok,
        selection: selection.summary,
        units: displayed_units,
        full_selection: full.totals,
        displayed: displayed.totals,
        demographics: allocation.breakdown,
        map_markers: markers,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    }
}

fn adjustment_step(units: &[AdjustedUnit], options: &ReportOptions, step_number: u32) -> AuditStep {
    let mut rules: BTreeMap<&'static str, usize> = BTreeMap::new();
    for unit in units {
        *rules.entry(unit.rule.as_str()).or_default() += 1;
    }

    AuditStep {
        step_number,
        rule_id: "metric_adjustment".to_string(),
        rule_name: "Metric Adjustment".to_string(),
        input: serde_json::json!({
            "unit_count": units.len(),
            "mode": options.mode,
        }),
        output: serde_json::json!({
            "rules": rules,
        }),
        reasoning: format!("Adjusted {} units in {} mode", units.len(), options.mode.as_str()),
    }
}
