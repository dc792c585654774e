//! Demographic allocation.
//!
//! Demographic records carry measured, unadjusted metrics. Each record is
//! scaled by its unit's adjusted-to-raw Reach ratio so the groups inherit
//! the same adjustment their unit received, then grouped and corrected with
//! the displayed subset's correction factor.

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    AdjustedUnit, AgeGenderGroup, AgeGroup, AuditStep, DemographicBreakdown, DemographicRecord,
    Gender, GenderGroup, age_label,
};

/// Ratio used for a record whose unit has no ratio entry.
pub const DEFAULT_REACH_RATIO: f64 = 1.0;

/// Adjusted-to-raw Reach ratio per unit id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReachRatios {
    ratios: HashMap<String, f64>,
}

impl ReachRatios {
    /// Computes the ratio of every unit.
    ///
    /// A unit with zero raw Reach gets [`DEFAULT_REACH_RATIO`].
    pub fn from_units(units: &[AdjustedUnit]) -> Self {
        let ratios = units
            .iter()
            .map(|unit| {
                let ratio = if unit.raw_reach > 0.0 {
                    unit.adjusted_reach / unit.raw_reach
                } else {
                    DEFAULT_REACH_RATIO
                };
                (unit.id.clone(), ratio)
            })
            .collect();
        Self { ratios }
    }

    /// Returns the ratio for a unit, if one was computed.
    pub fn get(&self, unit_id: &str) -> Option<f64> {
        self.ratios.get(unit_id).copied()
    }

    /// Returns the ratio for a unit, or [`DEFAULT_REACH_RATIO`].
    pub fn get_or_default(&self, unit_id: &str) -> f64 {
        self.get(unit_id).unwrap_or(DEFAULT_REACH_RATIO)
    }

    /// Returns the number of units with a ratio.
    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    /// Returns true when no ratio was computed.
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

/// The result of demographic allocation, including the audit step.
#[derive(Debug, Clone)]
pub struct DemographicAllocationResult {
    /// The grouped, corrected breakdown.
    pub breakdown: DemographicBreakdown,
    /// Number of records that fell back to [`DEFAULT_REACH_RATIO`].
    pub defaulted_records: usize,
    /// The audit step recording this allocation.
    pub audit_step: AuditStep,
}

#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    rots: f64,
    reach: f64,
}

impl Sums {
    fn add(&mut self, rots: f64, reach: f64) {
        self.rots += rots;
        self.reach += reach;
    }
}

/// Allocates demographic records into gender, age and (age, gender) groups.
///
/// Both metrics of a record are multiplied by its unit's ratio. Group Reach
/// sums are multiplied by `correction_factor` after summing; ROTS are never
/// corrected. Groups are ordered F before M and by ascending age.
///
/// # Arguments
///
/// * `records` - The in-scope demographic records
/// * `ratios` - Reach ratios of the displayed units
/// * `correction_factor` - The displayed subset's correction factor
/// * `step_number` - The step number for audit trail sequencing
pub fn allocate_demographics<'a, I>(
    records: I,
    ratios: &ReachRatios,
    correction_factor: f64,
    step_number: u32,
) -> DemographicAllocationResult
where
    I: IntoIterator<Item = &'a DemographicRecord>,
{
    let mut by_gender: BTreeMap<Gender, Sums> = BTreeMap::new();
    let mut by_age: BTreeMap<u8, Sums> = BTreeMap::new();
    let mut by_age_gender: BTreeMap<(u8, Gender), Sums> = BTreeMap::new();
    let mut record_count = 0usize;
    let mut defaulted_records = 0usize;

    for record in records {
        record_count += 1;
        let ratio = match ratios.get(&record.unit_id) {
            Some(ratio) => ratio,
            None => {
                defaulted_records += 1;
                DEFAULT_REACH_RATIO
            }
        };
        let rots = record.rots * ratio;
        let reach = record.reach * ratio;

        by_gender.entry(record.gender).or_default().add(rots, reach);
        by_age.entry(record.age).or_default().add(rots, reach);
        by_age_gender
            .entry((record.age, record.gender))
            .or_default()
            .add(rots, reach);
    }

    let breakdown = DemographicBreakdown {
        has_data: record_count > 0,
        by_gender: by_gender
            .into_iter()
            .map(|(gender, sums)| GenderGroup {
                gender,
                label: gender.label().to_string(),
                rots: sums.rots,
                reach: sums.reach * correction_factor,
            })
            .collect(),
        by_age: by_age
            .into_iter()
            .map(|(age, sums)| AgeGroup {
                age,
                label: age_label(age).to_string(),
                rots: sums.rots,
                reach: sums.reach * correction_factor,
            })
            .collect(),
        by_age_gender: by_age_gender
            .into_iter()
            .map(|((age, gender), sums)| AgeGenderGroup {
                age,
                gender,
                age_label: age_label(age).to_string(),
                gender_label: gender.label().to_string(),
                rots: sums.rots,
                reach: sums.reach * correction_factor,
            })
            .collect(),
    };

    let corrected_reach: f64 = breakdown.by_gender.iter().map(|group| group.reach).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "demographic_allocation".to_string(),
        rule_name: "Demographic Allocation".to_string(),
        input: serde_json::json!({
            "record_count": record_count,
            "ratio_units": ratios.len(),
            "correction_factor": correction_factor,
        }),
        output: serde_json::json!({
            "has_data": breakdown.has_data,
            "gender_groups": breakdown.by_gender.len(),
            "age_groups": breakdown.by_age.len(),
            "defaulted_records": defaulted_records,
            "total_reach": corrected_reach,
        }),
        reasoning: if breakdown.has_data {
            format!(
                "{} records allocated, corrected reach {}",
                record_count, corrected_reach
            )
        } else {
            "No demographic records for the selected units".to_string()
        },
    };

    DemographicAllocationResult {
        breakdown,
        defaulted_records,
        audit_step,
    }
}
