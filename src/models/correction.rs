//! Correction-factor table model.

use serde::{Deserialize, Serialize};

/// One calibrated (quantity, correction factor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRow {
    /// Number of units in a selection.
    pub quantity: u32,
    /// Reach multiplier calibrated for that quantity.
    pub correction_factor: f64,
}

/// The quantity-keyed correction table.
///
/// Rows are kept in source order. No monotonicity is assumed and lookups
/// never interpolate: they match one quantity exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionTable {
    rows: Vec<CorrectionRow>,
}

impl CorrectionTable {
    /// Creates a table from its rows.
    pub fn new(rows: Vec<CorrectionRow>) -> Self {
        Self { rows }
    }

    /// Returns the rows in source order.
    pub fn rows(&self) -> &[CorrectionRow] {
        &self.rows
    }

    /// Returns the largest calibrated quantity, or `None` for an empty table.
    pub fn max_quantity(&self) -> Option<u32> {
        self.rows.iter().map(|row| row.quantity).max()
    }

    /// Returns the factor of the first row with exactly this quantity.
    pub fn factor_at(&self, quantity: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.quantity == quantity)
            .map(|row| row.correction_factor)
    }
}
