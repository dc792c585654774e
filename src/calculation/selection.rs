//! Selection resolution.
//!
//! Turns a month, a package context, optional filters and a demographic
//! restriction into the list of media units to report on, each tagged with
//! the package type it is evaluated under.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, PackageTable};
use crate::models::{
    AuditStep, MediaType, MediaUnit, PackageContext, PackageType, SelectionQuery,
    SelectionSummary, ShelterType,
};

/// Synthetic option for the all-units digital context.
pub const ALL_DIGITAL_OPTION: &str = "all-digital";

/// Synthetic option for the all-units poster context.
pub const ALL_POSTER_OPTION: &str = "all-poster";

/// The result of resolving a selection, including the audit step.
#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    /// Selected units in unit-table order, tagged and demographically
    /// restricted.
    pub units: Vec<MediaUnit>,
    /// What was selected.
    pub summary: SelectionSummary,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Installation and media types present in a context, for filter menus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextTypes {
    /// Distinct shelter types, sorted.
    pub shelter_types: Vec<ShelterType>,
    /// Distinct media types, sorted.
    pub media_types: Vec<MediaType>,
}

/// Parses free-text unit ids.
///
/// Ids are separated by commas or line breaks. Blank tokens are dropped;
/// duplicates and order are kept.
///
/// ```
/// use exposure_engine::calculation::parse_custom_ids;
///
/// assert_eq!(parse_custom_ids("1001, 1004\n\n9999,1001"), vec!["1001", "1004", "9999", "1001"]);
/// ```
pub fn parse_custom_ids(text: &str) -> Vec<String> {
    text.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the entered ids that exist in `month`, in unit-table order.
///
/// Unknown ids are dropped and repeated ids resolve once.
pub fn found_unit_ids(dataset: &Dataset, month: &str, ids: &[String]) -> Vec<String> {
    let wanted: HashSet<&str> = ids.iter().map(|id| id.trim()).collect();
    dataset
        .units_for_month(month)
        .filter(|unit| wanted.contains(unit.id.as_str()))
        .map(|unit| unit.id.clone())
        .collect()
}

/// Returns the package options offered to callers: the two synthetic
/// all-unit contexts followed by the stored package names, sorted.
pub fn package_options(packages: &PackageTable) -> Vec<String> {
    [ALL_DIGITAL_OPTION.to_string(), ALL_POSTER_OPTION.to_string()]
        .into_iter()
        .chain(packages.names())
        .collect()
}

/// Returns the shelter and media types present among a context's units in
/// a month, before any type filter.
pub fn context_types(
    dataset: &Dataset,
    packages: &PackageTable,
    month: &str,
    context: &PackageContext,
) -> ContextTypes {
    let candidates = candidates(dataset, packages, month, context);

    ContextTypes {
        shelter_types: candidates
            .iter()
            .filter_map(|(unit, _)| unit.shelter_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        media_types: candidates
            .iter()
            .filter_map(|(unit, _)| unit.media_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

/// Resolves a selection query into tagged units.
///
/// Candidates come from the context: every unit of the month for the
/// all-unit contexts, the stored members for a package, or the entered ids
/// for a custom list. Unknown ids are dropped silently. Shelter type, media
/// type and name search apply to every context except a custom list. When
/// the demographic filter is active, each unit's raw metrics are replaced by
/// the sums of its matching demographic records, or 0 when none match.
pub fn resolve_selection(
    dataset: &Dataset,
    packages: &PackageTable,
    query: &SelectionQuery,
    step_number: u32,
) -> ResolvedSelection {
    let candidates = candidates(dataset, packages, &query.month, &query.context);
    let candidate_count = candidates.len();

    let (requested_ids, found_ids) = match &query.context {
        PackageContext::Custom { ids, .. } => (Some(ids.len()), Some(candidate_count)),
        _ => (None, None),
    };

    let is_custom = matches!(query.context, PackageContext::Custom { .. });
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(str::to_lowercase);

    let mut units: Vec<MediaUnit> = candidates
        .into_iter()
        .filter(|(unit, _)| {
            is_custom
                || (query
                    .shelter_type
                    .as_ref()
                    .is_none_or(|wanted| unit.shelter_type.as_ref() == Some(wanted))
                    && query
                        .media_type
                        .as_ref()
                        .is_none_or(|wanted| unit.media_type.as_ref() == Some(wanted))
                    && search
                        .as_ref()
                        .is_none_or(|needle| unit.name.to_lowercase().contains(needle)))
        })
        .map(|(unit, package_type)| MediaUnit {
            package_type,
            ..unit.clone()
        })
        .collect();

    if query.demographic.is_active() {
        let selected: HashSet<&str> = units.iter().map(|unit| unit.id.as_str()).collect();
        let mut sums: HashMap<&str, (f64, f64)> = HashMap::new();
        for record in dataset.demographics_for_month(&query.month) {
            if selected.contains(record.unit_id.as_str()) && query.demographic.matches(record) {
                let entry = sums.entry(record.unit_id.as_str()).or_default();
                entry.0 += record.rots;
                entry.1 += record.reach;
            }
        }
        let sums: HashMap<String, (f64, f64)> = sums
            .into_iter()
            .map(|(id, sums)| (id.to_string(), sums))
            .collect();
        for unit in &mut units {
            let (rots, reach) = sums.get(&unit.id).copied().unwrap_or_default();
            unit.raw_rots = rots;
            unit.raw_reach = reach;
        }
    }

    let summary = SelectionSummary {
        context: query.context.label(),
        unit_count: units.len(),
        requested_ids,
        found_ids,
        demographic_filter: query.demographic,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "selection".to_string(),
        rule_name: "Selection".to_string(),
        input: serde_json::json!({
            "month": query.month,
            "context": summary.context,
            "shelter_type": query.shelter_type,
            "media_type": query.media_type,
            "search": query.search,
            "demographic_filter": query.demographic,
        }),
        output: serde_json::json!({
            "candidates": candidate_count,
            "unit_count": summary.unit_count,
            "requested_ids": requested_ids,
            "found_ids": found_ids,
        }),
        reasoning: format!(
            "{} candidate units in {} for {}, {} after filters",
            candidate_count, query.month, summary.context, summary.unit_count
        ),
    };

    ResolvedSelection {
        units,
        summary,
        audit_step,
    }
}

/// Returns a context's candidate units in unit-table order, each paired
/// with the package type it is evaluated under.
fn candidates<'a>(
    dataset: &'a Dataset,
    packages: &PackageTable,
    month: &'a str,
    context: &PackageContext,
) -> Vec<(&'a MediaUnit, PackageType)> {
    let month_units = dataset.units_for_month(month);

    match context {
        PackageContext::AllDigital => month_units
            .map(|unit| (unit, PackageType::Digital))
            .collect(),
        PackageContext::AllPoster => month_units
            .map(|unit| (unit, PackageType::Poster))
            .collect(),
        PackageContext::Package { name } => {
            let members: HashMap<String, PackageType> = packages.members(name).into_iter().collect();
            month_units
                .filter_map(|unit| members.get(&unit.id).map(|package_type| (unit, *package_type)))
                .collect()
        }
        PackageContext::Custom { ids, package_type } => {
            let wanted: HashSet<&str> = ids.iter().map(|id| id.trim()).collect();
            month_units
                .filter(|unit| wanted.contains(unit.id.as_str()))
                .map(|unit| (unit, *package_type))
                .collect()
        }
    }
}
