//! Request types for the exposure engine API.
//!
//! This module defines the JSON request structures for the `/report`,
//! `/context-types` and `/packages` endpoints and their conversion into
//! engine queries.

use serde::{Deserialize, Serialize};

use crate::calculation::parse_custom_ids;
use crate::config::EngineDefaults;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComputationMode, DemographicFilter, GenderFilter, MAX_AGE_BRACKET, MediaType,
    PackageContext, PackageType, ReportOptions, SelectionQuery, ShelterType, SortKey,
};

/// Filter value meaning "no restriction" for shelter and media types.
const ALL_FILTER: &str = "all";

/// Package context as sent by callers.
///
/// A custom context carries its ids as free text, exactly as typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextRequest {
    /// Every unit of the month as a digital package.
    AllDigital,
    /// Every unit of the month as a poster package.
    AllPoster,
    /// A stored named package.
    Package {
        /// The stored package name.
        name: String,
    },
    /// Free-text unit ids separated by commas or line breaks.
    Custom {
        /// The ids as typed.
        ids: String,
        /// Package type to evaluate the ids under.
        #[serde(default)]
        package_type: PackageType,
    },
}

impl ContextRequest {
    /// Converts into an engine context, parsing custom ids.
    pub fn into_context(self) -> EngineResult<PackageContext> {
        match self {
            Self::AllDigital => Ok(PackageContext::AllDigital),
            Self::AllPoster => Ok(PackageContext::AllPoster),
            Self::Package { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(EngineError::InvalidRequest {
                        field: "context.name".to_string(),
                        message: "package name must not be empty".to_string(),
                    });
                }
                Ok(PackageContext::Package {
                    name: name.to_string(),
                })
            }
            Self::Custom { ids, package_type } => Ok(PackageContext::Custom {
                ids: parse_custom_ids(&ids),
                package_type,
            }),
        }
    }
}

/// Request body for the `/report` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Reporting month key (e.g. "202501").
    pub month: String,
    /// Source of candidate units.
    pub context: ContextRequest,
    /// Shelter type restriction, "all" or absent for none.
    #[serde(default)]
    pub shelter_type: Option<String>,
    /// Media type restriction, "all" or absent for none.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Case-insensitive name search.
    #[serde(default)]
    pub search: Option<String>,
    /// Gender restriction: "all", "M" or "F".
    #[serde(default)]
    pub gender: GenderFilter,
    /// Age bracket restriction, 0 for all ages.
    #[serde(default)]
    pub age: u8,
    /// Adjustment scenario; the configured default when absent.
    #[serde(default)]
    pub mode: Option<ComputationMode>,
    /// Ranking metric; the configured default when absent.
    #[serde(default)]
    pub sort_by: Option<SortKey>,
    /// Displayed subset size; the configured default when absent.
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl ReportRequest {
    /// Validates the request and splits it into a selection query and
    /// report options, filling unset options from `defaults`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a blank month, an age above 7 or a
    /// blank package name.
    pub fn into_query(
        self,
        defaults: &EngineDefaults,
    ) -> EngineResult<(SelectionQuery, ReportOptions)> {
        let month = self.month.trim().to_string();
        if month.is_empty() {
            return Err(EngineError::InvalidRequest {
                field: "month".to_string(),
                message: "month must not be empty".to_string(),
            });
        }
        if self.age > MAX_AGE_BRACKET {
            return Err(EngineError::InvalidRequest {
                field: "age".to_string(),
                message: format!("age must be between 0 and {}", MAX_AGE_BRACKET),
            });
        }

        let query = SelectionQuery {
            month,
            context: self.context.into_context()?,
            shelter_type: type_filter(self.shelter_type).map(ShelterType::from),
            media_type: type_filter(self.media_type).map(MediaType::from),
            search: self.search,
            demographic: DemographicFilter {
                gender: self.gender,
                age: self.age,
            },
        };

        let options = ReportOptions {
            mode: self.mode.unwrap_or(defaults.mode),
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            top_n: self.top_n.or(defaults.top_n),
        };

        Ok((query, options))
    }
}

/// Request body for the `/context-types` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextTypesRequest {
    /// Reporting month key.
    pub month: String,
    /// Package context to inspect.
    pub context: ContextRequest,
}

/// Request body for `POST /packages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePackageRequest {
    /// Month the ids are checked against; unknown ids are not stored.
    pub month: String,
    /// New package name.
    pub name: String,
    /// Package type of every member.
    pub package_type: PackageType,
    /// Member ids as free text separated by commas or line breaks.
    pub ids: String,
}

/// Treats blank and "all" type filters as no restriction.
fn type_filter(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != ALL_FILTER && value != "전체")
}
