//! Correction factor resolution.
//!
//! Summed Reach over-counts people who pass several units. The correction
//! factor scales the sum back down, keyed on how many units are aggregated.

use crate::config::NamedWeights;
use crate::models::{AuditStep, CorrectionResolution, CorrectionSource, CorrectionTable};

/// The result of resolving a correction factor, including the audit step.
#[derive(Debug, Clone)]
pub struct CorrectionFactorResult {
    /// The resolved factor and its source.
    pub resolution: CorrectionResolution,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Resolves the correction factor for a selection of `selection_size` units.
///
/// Resolution order:
/// 1. An empty selection resolves to 0.
/// 2. A stored package name with a configured override uses the override,
///    whatever the size.
/// 3. Otherwise the size is capped at the table's largest quantity and
///    matched exactly. A missing row (a gap below the cap, or an empty
///    table) resolves to 0 with [`CorrectionSource::TableGap`].
///
/// # Arguments
///
/// * `selection_size` - Number of units being aggregated
/// * `package_name` - Stored package name, `None` for every other context
/// * `table` - The quantity-keyed correction table
/// * `weights` - Named-package overrides
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use exposure_engine::calculation::resolve_correction_factor;
/// use exposure_engine::config::NamedWeights;
/// use exposure_engine::models::{CorrectionRow, CorrectionSource, CorrectionTable};
///
/// let table = CorrectionTable::new(vec![
///     CorrectionRow { quantity: 1, correction_factor: 1.0 },
///     CorrectionRow { quantity: 2, correction_factor: 0.9 },
/// ]);
///
/// let result = resolve_correction_factor(7, None, &table, &NamedWeights::default(), 1);
/// assert_eq!(result.resolution.factor, 0.9);
/// assert_eq!(result.resolution.lookup_quantity, Some(2));
/// assert_eq!(result.resolution.source, CorrectionSource::QuantityTable);
/// ```
pub fn resolve_correction_factor(
    selection_size: usize,
    package_name: Option<&str>,
    table: &CorrectionTable,
    weights: &NamedWeights,
    step_number: u32,
) -> CorrectionFactorResult {
    let resolution = resolve(selection_size, package_name, table, weights);

    let reasoning = match resolution.source {
        CorrectionSource::EmptySelection => "Empty selection, factor 0".to_string(),
        CorrectionSource::NamedPackage => format!(
            "Package '{}' has a fixed factor of {}",
            package_name.unwrap_or_default(),
            resolution.factor
        ),
        CorrectionSource::QuantityTable => format!(
            "{} units, looked up quantity {} = {}",
            selection_size,
            resolution.lookup_quantity.unwrap_or_default(),
            resolution.factor
        ),
        CorrectionSource::TableGap => match resolution.lookup_quantity {
            Some(quantity) => format!(
                "{} units, no table row for quantity {}, factor 0",
                selection_size, quantity
            ),
            None => "Correction table is empty, factor 0".to_string(),
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "correction_factor".to_string(),
        rule_name: "Correction Factor".to_string(),
        input: serde_json::json!({
            "selection_size": selection_size,
            "package_name": package_name,
            "max_quantity": table.max_quantity(),
        }),
        output: serde_json::json!({
            "factor": resolution.factor,
            "source": resolution.source,
            "lookup_quantity": resolution.lookup_quantity,
        }),
        reasoning,
    };

    CorrectionFactorResult {
        resolution,
        audit_step,
    }
}

fn resolve(
    selection_size: usize,
    package_name: Option<&str>,
    table: &CorrectionTable,
    weights: &NamedWeights,
) -> CorrectionResolution {
    if selection_size == 0 {
        return CorrectionResolution::empty();
    }

    if let Some(factor) = package_name.and_then(|name| weights.get(name)) {
        return CorrectionResolution {
            factor,
            source: CorrectionSource::NamedPackage,
            selection_size,
            lookup_quantity: None,
        };
    }

    let Some(max_quantity) = table.max_quantity() else {
        return CorrectionResolution {
            factor: 0.0,
            source: CorrectionSource::TableGap,
            selection_size,
            lookup_quantity: None,
        };
    };

    let lookup_quantity = u32::try_from(selection_size)
        .unwrap_or(u32::MAX)
        .min(max_quantity);

    match table.factor_at(lookup_quantity) {
        Some(factor) => CorrectionResolution {
            factor,
            source: CorrectionSource::QuantityTable,
            selection_size,
            lookup_quantity: Some(lookup_quantity),
        },
        None => CorrectionResolution {
            factor: 0.0,
            source: CorrectionSource::TableGap,
            selection_size,
            lookup_quantity: Some(lookup_quantity),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorrectionRow;
    use proptest::prelude::*;

    fn create_test_table() -> CorrectionTable {
        CorrectionTable::new(vec![
            CorrectionRow {
                quantity: 1,
                correction_factor: 1.0,
            },
            CorrectionRow {
                quantity: 2,
                correction_factor: 0.9,
            },
            CorrectionRow {
                quantity: 3,
                correction_factor: 0.8,
            },
            CorrectionRow {
                quantity: 5,
                correction_factor: 0.7,
            },
        ])
    }

    fn create_test_weights() -> NamedWeights {
        NamedWeights::from_iter([
            ("강남D".to_string(), 0.5430),
            ("종로D".to_string(), 0.4892),
        ])
    }

    #[test]
    fn test_empty_selection_resolves_to_zero() {
        let result =
            resolve_correction_factor(0, Some("강남D"), &create_test_table(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.0);
        assert_eq!(result.resolution.source, CorrectionSource::EmptySelection);
    }

    #[test]
    fn test_named_package_override_ignores_size() {
        for size in [1, 2, 50] {
            let result = resolve_correction_factor(
                size,
                Some("강남D"),
                &create_test_table(),
                &create_test_weights(),
                1,
            );
            assert_eq!(result.resolution.factor, 0.5430);
            assert_eq!(result.resolution.source, CorrectionSource::NamedPackage);
            assert_eq!(result.resolution.lookup_quantity, None);
        }
    }

    #[test]
    fn test_unweighted_package_uses_table() {
        let result =
            resolve_correction_factor(2, Some("뷰티"), &create_test_table(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.9);
        assert_eq!(result.resolution.source, CorrectionSource::QuantityTable);
    }

    #[test]
    fn test_exact_table_match() {
        let result = resolve_correction_factor(3, None, &create_test_table(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.8);
        assert_eq!(result.resolution.lookup_quantity, Some(3));
    }

    #[test]
    fn test_size_above_table_is_capped() {
        let result =
            resolve_correction_factor(1200, None, &create_test_table(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.7);
        assert_eq!(result.resolution.lookup_quantity, Some(5));
        assert_eq!(result.resolution.selection_size, 1200);
    }

    #[test]
    fn test_gap_below_cap_resolves_to_zero() {
        let result = resolve_correction_factor(4, None, &create_test_table(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.0);
        assert_eq!(result.resolution.source, CorrectionSource::TableGap);
        assert_eq!(result.resolution.lookup_quantity, Some(4));
        assert!(result.audit_step.reasoning.contains("no table row"));
    }

    #[test]
    fn test_empty_table_resolves_to_gap() {
        let result =
            resolve_correction_factor(3, None, &CorrectionTable::default(), &create_test_weights(), 1);

        assert_eq!(result.resolution.factor, 0.0);
        assert_eq!(result.resolution.source, CorrectionSource::TableGap);
        assert_eq!(result.resolution.lookup_quantity, None);
    }

    #[test]
    fn test_audit_step_records_inputs() {
        let result = resolve_correction_factor(2, None, &create_test_table(), &create_test_weights(), 4);

        assert_eq!(result.audit_step.step_number, 4);
        assert_eq!(result.audit_step.rule_id, "correction_factor");
        assert_eq!(result.audit_step.input["selection_size"], 2);
        assert_eq!(result.audit_step.output["source"], "quantity_table");
    }

    proptest! {
        #[test]
        fn prop_sizes_beyond_table_share_the_capped_factor(size in 5usize..100_000) {
            let table = create_test_table();
            let weights = NamedWeights::default();
            let capped = resolve_correction_factor(5, None, &table, &weights, 1);
            let result = resolve_correction_factor(size, None, &table, &weights, 1);
            prop_assert_eq!(result.resolution.factor, capped.resolution.factor);
        }

        #[test]
        fn prop_resolution_is_deterministic(size in 0usize..20, named in any::<bool>()) {
            let table = create_test_table();
            let weights = create_test_weights();
            let name = if named { Some("강남D") } else { None };
            let first = resolve_correction_factor(size, name, &table, &weights, 1);
            let second = resolve_correction_factor(size, name, &table, &weights, 1);
            prop_assert_eq!(first.resolution, second.resolution);
        }
    }
}
