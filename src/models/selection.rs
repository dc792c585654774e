//! Selection query types.
//!
//! A selection is recomputed on every request from these inputs; nothing
//! about it persists between requests.

use serde::{Deserialize, Serialize};

use super::{DemographicFilter, MediaType, PackageType, ShelterType};

/// Which adjustment scenario the Metric Adjuster runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComputationMode {
    /// Standard adjustment with each unit's own share of time.
    #[default]
    Default,
    /// Every adjustment disabled; raw values pass through.
    NoDigitalFormula,
    /// Digital units assume a single full slot (5% share).
    DigitalFullSlot,
}

impl ComputationMode {
    /// Returns the kebab-case key of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NoDigitalFormula => "no-digital-formula",
            Self::DigitalFullSlot => "digital-full-slot",
        }
    }
}

/// Metric the displayed subset is ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Adjusted ROTS, descending.
    #[default]
    Rots,
    /// Adjusted Reach, descending.
    Reach,
}

/// Where the candidate unit ids of a selection come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageContext {
    /// Every unit of the month, sold as a digital package.
    AllDigital,
    /// Every unit of the month, sold as a poster package.
    AllPoster,
    /// A stored named package.
    Package {
        /// The stored package name.
        name: String,
    },
    /// An explicit list of unit ids supplied by the caller.
    Custom {
        /// The ids as entered, in order, duplicates allowed.
        ids: Vec<String>,
        /// Package type every found id is tagged with.
        package_type: PackageType,
    },
}

impl PackageContext {
    /// Returns the stored package name, if this context names one.
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Self::Package { name } => Some(name),
            _ => None,
        }
    }

    /// Returns a short human-readable label for report titles.
    pub fn label(&self) -> String {
        match self {
            Self::AllDigital => "all (digital)".to_string(),
            Self::AllPoster => "all (poster)".to_string(),
            Self::Package { name } => format!("package [{}]", name),
            Self::Custom { .. } => "selected media".to_string(),
        }
    }
}

/// Inputs of the Selection Resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionQuery {
    /// Reporting month key.
    pub month: String,
    /// Source of candidate ids.
    pub context: PackageContext,
    /// Optional installation-type restriction.
    pub shelter_type: Option<ShelterType>,
    /// Optional media-type restriction.
    pub media_type: Option<MediaType>,
    /// Optional case-insensitive name search.
    pub search: Option<String>,
    /// Active demographic restriction.
    pub demographic: DemographicFilter,
}

/// Options controlling adjustment and the displayed subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Adjustment scenario.
    pub mode: ComputationMode,
    /// Ranking metric for the displayed subset.
    pub sort_by: SortKey,
    /// Number of top units to display; `None` or 0 displays all.
    pub top_n: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&ComputationMode::DigitalFullSlot).unwrap();
        assert_eq!(json, "\"digital-full-slot\"");

        let mode: ComputationMode = serde_json::from_str("\"no-digital-formula\"").unwrap();
        assert_eq!(mode, ComputationMode::NoDigitalFormula);
    }

    #[test]
    fn test_package_context_is_tagged_by_kind() {
        let context: PackageContext =
            serde_json::from_str(r#"{"kind":"package","name":"강남D"}"#).unwrap();
        assert_eq!(context.package_name(), Some("강남D"));

        let context: PackageContext = serde_json::from_str(r#"{"kind":"all_digital"}"#).unwrap();
        assert_eq!(context, PackageContext::AllDigital);
        assert_eq!(context.package_name(), None);
    }

    #[test]
    fn test_context_labels() {
        assert_eq!(PackageContext::AllPoster.label(), "all (poster)");
        assert_eq!(
            PackageContext::Package {
                name: "뷰티".to_string()
            }
            .label(),
            "package [뷰티]"
        );
    }
}
