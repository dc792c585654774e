//! Per-unit metric adjustment.
//!
//! This module turns a unit's raw ROTS and Reach into adjusted values. The
//! adjustment is a pure function of one unit and the computation mode, so it
//! can be mapped over any collection of units.

use crate::models::{AdjustedUnit, AdjustmentRule, ComputationMode, MediaUnit};

/// Share of time assumed for a digital unit in full-slot mode.
pub const FULL_SLOT_SHARE: f64 = 0.05;

/// Fraction of a shared digital exposure attributed to one advertiser.
pub const SHARING_WEIGHT: f64 = 0.5;

/// Baseline, in seconds, of the stay-time factor.
pub const STAY_TIME_BASELINE: f64 = 30.0;

/// Adjusted values for one unit and the rule that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedMetrics {
    /// Adjusted ROTS.
    pub rots: f64,
    /// Adjusted Reach.
    pub reach: f64,
    /// The branch that fired.
    pub rule: AdjustmentRule,
}

/// Returns the stay-time factor `(max(stay_time - 1, 0) + 30) / 30`.
///
/// Stay times below one second contribute nothing above the baseline, so
/// the factor is never below 1.
///
/// ```
/// use exposure_engine::calculation::time_factor;
///
/// assert!((time_factor(10.0) - 1.3).abs() < 1e-12);
/// assert_eq!(time_factor(0.5), 1.0);
/// ```
pub fn time_factor(stay_time: f64) -> f64 {
    ((stay_time - 1.0).max(0.0) + STAY_TIME_BASELINE) / STAY_TIME_BASELINE
}

/// Adjusts one unit's raw metrics.
///
/// Rules, in priority order:
/// 1. `no-digital-formula` mode returns the raw values.
/// 2. A poster on a tourist information panel is halved, even when it would
///    otherwise qualify for the digital formula.
/// 3. A digitally packaged or digital unit with a stay time gets
///    `time_factor * raw * share * 0.5` for each metric, where `share` is 0.05
///    in `digital-full-slot` mode and the unit's share of time otherwise. A
///    missing stay time or share of time keeps the raw values.
/// 4. Anything else keeps the raw values.
///
/// # Examples
///
/// ```
/// use exposure_engine::calculation::adjust_metrics;
/// use exposure_engine::models::{ComputationMode, MediaType, MediaUnit, PackageType, ShelterType};
///
/// let unit = MediaUnit {
///     id: "1001".to_string(),
///     month: "202501".to_string(),
///     name: "Gangnam Station Exit 1".to_string(),
///     shelter_type: Some(ShelterType::RoadsideShelter),
///     media_type: Some(MediaType::Poster),
///     package_type: PackageType::Digital,
///     stay_time: Some(10.0),
///     share_of_time: Some(0.2),
///     raw_rots: 1000.0,
///     raw_reach: 500.0,
///     latitude: None,
///     longitude: None,
///     grade: None,
/// };
///
/// let adjusted = adjust_metrics(&unit, ComputationMode::Default);
/// assert!((adjusted.rots - 130.0).abs() < 1e-9);
/// assert!((adjusted.reach - 65.0).abs() < 1e-9);
/// ```
pub fn adjust_metrics(unit: &MediaUnit, mode: ComputationMode) -> AdjustedMetrics {
    let raw = |rule| AdjustedMetrics {
        rots: unit.raw_rots,
        reach: unit.raw_reach,
        rule,
    };

    if mode == ComputationMode::NoDigitalFormula {
        return raw(AdjustmentRule::FormulaDisabled);
    }

    if unit.is_tourist_poster() {
        return AdjustedMetrics {
            rots: unit.raw_rots / 2.0,
            reach: unit.raw_reach / 2.0,
            rule: AdjustmentRule::TouristPosterHalved,
        };
    }

    if !unit.is_digitally_shared() {
        return raw(AdjustmentRule::PassThrough);
    }

    let Some(stay_time) = unit.stay_time else {
        return raw(AdjustmentRule::MissingStayTime);
    };

    let share = match (mode, unit.share_of_time) {
        (ComputationMode::DigitalFullSlot, _) => FULL_SLOT_SHARE,
        (_, Some(share)) => share,
        (_, None) => return raw(AdjustmentRule::MissingShareOfTime),
    };

    let factor = time_factor(stay_time);
    AdjustedMetrics {
        rots: factor * unit.raw_rots * share * SHARING_WEIGHT,
        reach: factor * unit.raw_reach * share * SHARING_WEIGHT,
        rule: AdjustmentRule::DigitalSharing,
    }
}

/// Adjusts one unit and builds its output row.
pub fn adjust_unit(unit: &MediaUnit, mode: ComputationMode) -> AdjustedUnit {
    let adjusted = adjust_metrics(unit, mode);
    AdjustedUnit {
        id: unit.id.clone(),
        name: unit.name.clone(),
        shelter_type: unit.shelter_type.clone(),
        media_type: unit.media_type.clone(),
        package_type: unit.package_type,
        raw_rots: unit.raw_rots,
        raw_reach: unit.raw_reach,
        adjusted_rots: adjusted.rots,
        adjusted_reach: adjusted.reach,
        rule: adjusted.rule,
        latitude: unit.latitude,
        longitude: unit.longitude,
        grade: unit.grade.clone(),
    }
}

/// Adjusts every unit, preserving order.
pub fn adjust_units(units: &[MediaUnit], mode: ComputationMode) -> Vec<AdjustedUnit> {
    units.iter().map(|unit| adjust_unit(unit, mode)).collect()
}
