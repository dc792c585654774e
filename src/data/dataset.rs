//! The joined, read-only dataset the engine computes over.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use crate::models::{
    CorrectionRow, CorrectionTable, DemographicRecord, Gender, MAX_AGE_BRACKET, MediaType,
    MediaUnit, PackageType, ShelterType,
};

use super::rows::{DemographicRow, DigitalRow, FactorRow, KpiRow, ShelterRow};

/// Immutable source tables for a session.
///
/// Media units are the KPI rows joined with their digital attributes (on
/// month and id) and their location (on id). Absent joins leave the
/// corresponding fields `None`. Package membership is not part of the
/// dataset: units carry the default package type until a selection tags them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    units: Vec<MediaUnit>,
    demographics: Vec<DemographicRecord>,
    correction: CorrectionTable,
}

impl Dataset {
    /// Creates a dataset from already-joined parts.
    pub fn new(
        units: Vec<MediaUnit>,
        demographics: Vec<DemographicRecord>,
        correction: CorrectionTable,
    ) -> Self {
        Self {
            units,
            demographics,
            correction,
        }
    }

    /// Joins raw source rows into a dataset.
    ///
    /// Duplicate (month, id) KPI rows keep the first occurrence. Demographic
    /// rows with an unknown gender or an age outside 1..=7 are dropped, as
    /// are correction rows with a negative or fractional quantity.
    pub fn from_rows(
        kpi: Vec<KpiRow>,
        digital: Vec<DigitalRow>,
        shelters: Vec<ShelterRow>,
        demographics: Vec<DemographicRow>,
        factors: Vec<FactorRow>,
    ) -> Self {
        let mut digital_by_key: HashMap<(String, String), DigitalRow> = HashMap::new();
        for row in digital {
            digital_by_key
                .entry((row.month.clone(), row.unit_id.clone()))
                .or_insert(row);
        }

        let mut shelter_by_id: HashMap<String, ShelterRow> = HashMap::new();
        for row in shelters {
            shelter_by_id.entry(row.unit_id.clone()).or_insert(row);
        }

        let mut seen = HashSet::new();
        let units = kpi
            .into_iter()
            .filter(|row| seen.insert((row.month.clone(), row.unit_id.clone())))
            .map(|row| {
                let digital = digital_by_key.get(&(row.month.clone(), row.unit_id.clone()));
                let shelter = shelter_by_id.get(&row.unit_id);
                MediaUnit {
                    name: row.name.unwrap_or_default(),
                    shelter_type: row.shelter_type.as_deref().map(ShelterType::parse),
                    media_type: row.media_type.as_deref().map(MediaType::parse),
                    package_type: PackageType::default(),
                    stay_time: digital.and_then(|d| d.stay_time),
                    share_of_time: digital.and_then(|d| d.share_of_time),
                    raw_rots: row.rots,
                    raw_reach: row.reach,
                    latitude: shelter.and_then(|s| s.latitude),
                    longitude: shelter.and_then(|s| s.longitude),
                    grade: shelter.and_then(|s| s.grade.clone()),
                    id: row.unit_id,
                    month: row.month,
                }
            })
            .collect();

        let demographic_total = demographics.len();
        let demographics: Vec<DemographicRecord> = demographics
            .into_iter()
            .filter_map(|row| {
                let gender = match row.gender.trim() {
                    "M" => Gender::Male,
                    "F" => Gender::Female,
                    _ => return None,
                };
                let age = row.age as u8;
                if row.age.fract() != 0.0 || age == 0 || age > MAX_AGE_BRACKET {
                    return None;
                }
                Some(DemographicRecord {
                    unit_id: row.unit_id,
                    month: row.month,
                    gender,
                    age,
                    rots: row.rots,
                    reach: row.reach,
                })
            })
            .collect();
        let dropped = demographic_total - demographics.len();
        if dropped > 0 {
            warn!(dropped, "Dropped demographic rows with unknown gender or age bracket");
        }

        let correction = CorrectionTable::new(
            factors
                .into_iter()
                .filter(|row| row.quantity >= 0.0 && row.quantity.fract() == 0.0)
                .map(|row| CorrectionRow {
                    quantity: row.quantity as u32,
                    correction_factor: row.correction_factor,
                })
                .collect(),
        );

        Self::new(units, demographics, correction)
    }

    /// Returns every media unit.
    pub fn units(&self) -> &[MediaUnit] {
        &self.units
    }

    /// Returns the media units of one month, in table order.
    pub fn units_for_month<'a>(&'a self, month: &'a str) -> impl Iterator<Item = &'a MediaUnit> {
        self.units.iter().filter(move |unit| unit.month == month)
    }

    /// Returns every demographic record.
    pub fn demographics(&self) -> &[DemographicRecord] {
        &self.demographics
    }

    /// Returns the demographic records of one month.
    pub fn demographics_for_month<'a>(
        &'a self,
        month: &'a str,
    ) -> impl Iterator<Item = &'a DemographicRecord> {
        self.demographics
            .iter()
            .filter(move |record| record.month == month)
    }

    /// Returns the correction-factor table.
    pub fn correction_table(&self) -> &CorrectionTable {
        &self.correction
    }

    /// Returns the distinct months of the unit table, most recent first.
    pub fn months(&self) -> Vec<String> {
        self.units
            .iter()
            .map(|unit| unit.month.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect()
    }
}
