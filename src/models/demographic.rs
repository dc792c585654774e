//! Demographic records and the gender/age filter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest valid age bracket code.
pub const MAX_AGE_BRACKET: u8 = 7;

/// Gender of a demographic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    /// Female ("F").
    #[serde(rename = "F")]
    Female,
    /// Male ("M").
    #[serde(rename = "M")]
    Male,
}

impl Gender {
    /// Returns the single-letter code stored in the demographic table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
        }
    }

    /// Returns the display label for this gender.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

/// Returns the display label for an age bracket code.
///
/// ```
/// use exposure_engine::models::age_label;
///
/// assert_eq!(age_label(1), "10s and under");
/// assert_eq!(age_label(4), "40s");
/// assert_eq!(age_label(7), "70s and over");
/// ```
pub fn age_label(age: u8) -> &'static str {
    match age {
        1 => "10s and under",
        2 => "20s",
        3 => "30s",
        4 => "40s",
        5 => "50s",
        6 => "60s",
        7 => "70s and over",
        _ => "unknown",
    }
}

/// One (unit, month, gender, age bracket) row of measured metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
    /// The media unit this row belongs to.
    pub unit_id: String,
    /// Reporting month key.
    pub month: String,
    /// Gender of the audience segment.
    pub gender: Gender,
    /// Age bracket code, 1..=7.
    pub age: u8,
    /// Rotations attributed to this segment.
    pub rots: f64,
    /// Reach attributed to this segment.
    pub reach: f64,
}

/// Gender part of a demographic filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GenderFilter {
    /// No gender restriction.
    #[default]
    All,
    /// Only records of one gender.
    Only(Gender),
}

impl TryFrom<String> for GenderFilter {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.trim() {
            "all" | "전체" => Ok(Self::All),
            "M" | "m" => Ok(Self::Only(Gender::Male)),
            "F" | "f" => Ok(Self::Only(Gender::Female)),
            other => Err(format!("unknown gender filter '{}'", other)),
        }
    }
}

impl From<GenderFilter> for String {
    fn from(filter: GenderFilter) -> Self {
        match filter {
            GenderFilter::All => "all".to_string(),
            GenderFilter::Only(gender) => gender.code().to_string(),
        }
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(gender) => f.write_str(gender.code()),
        }
    }
}

/// Active gender/age restriction of a request.
///
/// An age of 0 means "all ages"; it is a filter sentinel and never appears
/// on a stored record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicFilter {
    /// Gender restriction.
    #[serde(default)]
    pub gender: GenderFilter,
    /// Age bracket restriction, 0 for all ages.
    #[serde(default)]
    pub age: u8,
}

impl DemographicFilter {
    /// Returns true when either dimension restricts the records.
    ///
    /// ```
    /// use exposure_engine::models::{DemographicFilter, Gender, GenderFilter};
    ///
    /// assert!(!DemographicFilter::default().is_active());
    /// assert!(DemographicFilter { gender: GenderFilter::Only(Gender::Male), age: 0 }.is_active());
    /// assert!(DemographicFilter { gender: GenderFilter::All, age: 3 }.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.gender != GenderFilter::All || self.age != 0
    }

    /// Returns true when the record passes both restrictions.
    pub fn matches(&self, record: &DemographicRecord) -> bool {
        let gender_ok = match self.gender {
            GenderFilter::All => true,
            GenderFilter::Only(gender) => record.gender == gender,
        };
        gender_ok && (self.age == 0 || record.age == self.age)
    }
}
