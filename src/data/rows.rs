//! Row types of the source tables.
//!
//! Warehouse exports are loosely typed: ids and months arrive as strings or
//! numbers, metrics as numbers, numeric strings or nulls. These rows accept
//! all of those shapes and normalize them before the engine sees them.

use serde::{Deserialize, Deserializer};

/// A scalar that may be encoded as a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_key(self) -> String {
        match self {
            Self::Str(s) => s.trim().to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            Self::Str(s) => s.trim().parse::<f64>().ok(),
            Self::Int(i) => Some(i as f64),
            Self::Float(f) => Some(f),
        }
    }
}

/// Deserializes an id or month key from a string or a number.
fn key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.into_key())
}

/// Deserializes an optional opaque label, stringifying numbers.
fn opt_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_key)
        .filter(|s| !s.is_empty()))
}

/// Deserializes a nullable number; unparseable values become `None`.
fn opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .and_then(Scalar::into_number)
        .filter(|n| n.is_finite()))
}

/// Deserializes a metric; missing, null or unparseable values become 0.
fn metric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(opt_number(deserializer)?.unwrap_or(0.0))
}

/// Deserializes an optional trimmed string; blanks become `None`.
fn opt_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Unit summary (KPI) row: one per unit and month.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiRow {
    /// Unit identifier.
    #[serde(alias = "ftr_idn", deserialize_with = "key")]
    pub unit_id: String,
    /// Reporting month key.
    #[serde(deserialize_with = "key")]
    pub month: String,
    /// Display name.
    #[serde(default, alias = "shelter_name")]
    pub name: Option<String>,
    /// Installation label.
    #[serde(default, deserialize_with = "opt_label")]
    pub shelter_type: Option<String>,
    /// Media label.
    #[serde(default, deserialize_with = "opt_label")]
    pub media_type: Option<String>,
    /// Raw ROTS.
    #[serde(default, deserialize_with = "metric")]
    pub rots: f64,
    /// Raw Reach.
    #[serde(default, deserialize_with = "metric")]
    pub reach: f64,
}

/// Digital attributes row, keyed by unit and month.
#[derive(Debug, Clone, Deserialize)]
pub struct DigitalRow {
    /// Unit identifier.
    #[serde(alias = "ftr_idn", deserialize_with = "key")]
    pub unit_id: String,
    /// Reporting month key.
    #[serde(deserialize_with = "key")]
    pub month: String,
    /// Average stay time in seconds.
    #[serde(default, deserialize_with = "opt_number")]
    pub stay_time: Option<f64>,
    /// Share of the digital loop.
    #[serde(default, deserialize_with = "opt_number")]
    pub share_of_time: Option<f64>,
}

/// Shelter location row, keyed by unit.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelterRow {
    /// Unit identifier.
    #[serde(alias = "ftr_idn", deserialize_with = "key")]
    pub unit_id: String,
    /// Latitude.
    #[serde(default, deserialize_with = "opt_number")]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default, deserialize_with = "opt_number")]
    pub longitude: Option<f64>,
    /// Opaque grade label.
    #[serde(default, deserialize_with = "opt_key")]
    pub grade: Option<String>,
}

/// Package membership row.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageRow {
    /// Package name.
    pub package_name: String,
    /// "D" or "P".
    pub package_type: String,
    /// Member unit identifier.
    #[serde(alias = "ftr_idn", deserialize_with = "key")]
    pub unit_id: String,
}

/// Correction-factor row.
#[derive(Debug, Clone, Deserialize)]
pub struct FactorRow {
    /// Selection size.
    #[serde(deserialize_with = "metric")]
    pub quantity: f64,
    /// Calibrated factor.
    #[serde(default, deserialize_with = "metric")]
    pub correction_factor: f64,
}

/// Demographic row.
#[derive(Debug, Clone, Deserialize)]
pub struct DemographicRow {
    /// Unit identifier.
    #[serde(alias = "ftr_idn", deserialize_with = "key")]
    pub unit_id: String,
    /// Reporting month key.
    #[serde(deserialize_with = "key")]
    pub month: String,
    /// "M" or "F".
    #[serde(default)]
    pub gender: String,
    /// Age bracket code.
    #[serde(default, deserialize_with = "metric")]
    pub age: f64,
    /// ROTS for the segment.
    #[serde(default, deserialize_with = "metric")]
    pub rots: f64,
    /// Reach for the segment.
    #[serde(default, deserialize_with = "metric")]
    pub reach: f64,
}
