//! Media unit model and its categorical attributes.
//!
//! A media unit is one physical installation (a bus shelter panel, a
//! tourist information board, ...) for one reporting month.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of installation a media unit is mounted on.
///
/// Source tables label installations in Korean; requests may use the
/// kebab-case keys instead. Both spellings parse to the same variant and
/// anything unrecognised is kept verbatim in [`ShelterType::Other`].
///
/// # Example
///
/// ```
/// use exposure_engine::models::ShelterType;
///
/// assert_eq!(ShelterType::parse("관광안내판"), ShelterType::TouristInfoPanel);
/// assert_eq!(ShelterType::parse("tourist-info-panel"), ShelterType::TouristInfoPanel);
/// assert_eq!(ShelterType::TouristInfoPanel.as_str(), "tourist-info-panel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShelterType {
    /// Roadside bus shelter.
    RoadsideShelter,
    /// Bus shelter on a median bus lane.
    MedianBusShelter,
    /// Transfer center.
    TransferCenter,
    /// Tourist information panel.
    TouristInfoPanel,
    /// Village (neighbourhood) bus shelter.
    VillageBusShelter,
    /// Any other installation label.
    Other(String),
}

impl ShelterType {
    /// Parses a shelter label in either its English key or Korean source form.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "roadside-shelter" | "가로변 쉘터" => Self::RoadsideShelter,
            "median-bus-shelter" | "중앙차로버스 쉘터" => Self::MedianBusShelter,
            "transfer-center" | "환승센터" => Self::TransferCenter,
            "tourist-info-panel" | "관광안내판" => Self::TouristInfoPanel,
            "village-bus-shelter" | "마을버스 쉘터" => Self::VillageBusShelter,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical key for this shelter type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RoadsideShelter => "roadside-shelter",
            Self::MedianBusShelter => "median-bus-shelter",
            Self::TransferCenter => "transfer-center",
            Self::TouristInfoPanel => "tourist-info-panel",
            Self::VillageBusShelter => "village-bus-shelter",
            Self::Other(label) => label,
        }
    }

    /// Returns the marker color used when plotting units of this type.
    pub fn marker_color(&self) -> &'static str {
        match self {
            Self::RoadsideShelter => "#153b5d",
            Self::MedianBusShelter => "#00b8bc",
            Self::TransferCenter => "#ffc000",
            Self::TouristInfoPanel => "#fc766a",
            Self::VillageBusShelter => "#3247a6",
            Self::Other(_) => "#808080",
        }
    }
}

impl From<String> for ShelterType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ShelterType> for String {
    fn from(shelter_type: ShelterType) -> Self {
        shelter_type.as_str().to_string()
    }
}

impl fmt::Display for ShelterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The display technology of a media unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    /// Digital signage, shared between advertisers in time slots.
    Digital,
    /// Printed poster.
    Poster,
    /// Any other media label.
    Other(String),
}

impl MediaType {
    /// Parses a media label in either its English key or Korean source form.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "digital" | "디지털" => Self::Digital,
            "poster" | "포스터" => Self::Poster,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical key for this media type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Digital => "digital",
            Self::Poster => "poster",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for MediaType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.as_str().to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The package type a unit is sold under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageType {
    /// Digital package.
    #[serde(rename = "D")]
    Digital,
    /// Poster package. Units without a package membership default to this.
    #[default]
    #[serde(rename = "P")]
    Poster,
}

impl PackageType {
    /// Returns the single-letter code stored in the package table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Digital => "D",
            Self::Poster => "P",
        }
    }
}

/// One installation for one reporting month, with raw measured metrics.
///
/// `raw_reach <= raw_rots` is expected of source data but never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUnit {
    /// Stable unit identifier.
    pub id: String,
    /// Reporting month key (e.g. "202501").
    pub month: String,
    /// Display name, searched by the free-text filter.
    pub name: String,
    /// Installation type, if recorded.
    pub shelter_type: Option<ShelterType>,
    /// Media type, if recorded.
    pub media_type: Option<MediaType>,
    /// Package type attached through package membership.
    #[serde(default)]
    pub package_type: PackageType,
    /// Average stay time in seconds, if measured.
    pub stay_time: Option<f64>,
    /// Share of the digital loop an advertiser holds, in [0, 1].
    pub share_of_time: Option<f64>,
    /// Raw rotations / opportunities-to-see.
    pub raw_rots: f64,
    /// Raw unique reach.
    pub raw_reach: f64,
    /// Latitude, passed through untouched.
    pub latitude: Option<f64>,
    /// Longitude, passed through untouched.
    pub longitude: Option<f64>,
    /// Opaque grade label.
    pub grade: Option<String>,
}

impl MediaUnit {
    /// Returns true for poster faces mounted on tourist information panels.
    pub fn is_tourist_poster(&self) -> bool {
        self.shelter_type == Some(ShelterType::TouristInfoPanel)
            && self.media_type == Some(MediaType::Poster)
    }

    /// Returns true when the unit is sold digitally or is a digital screen.
    pub fn is_digitally_shared(&self) -> bool {
        self.package_type == PackageType::Digital || self.media_type == Some(MediaType::Digital)
    }

    /// Returns both coordinates when the unit has a location.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_unit() -> MediaUnit {
        MediaUnit {
            id: "1001".to_string(),
            month: "202501".to_string(),
            name: "Gangnam Station Exit 1".to_string(),
            shelter_type: Some(ShelterType::RoadsideShelter),
            media_type: Some(MediaType::Poster),
            package_type: PackageType::Poster,
            stay_time: None,
            share_of_time: None,
            raw_rots: 1000.0,
            raw_reach: 500.0,
            latitude: Some(37.4979),
            longitude: Some(127.0276),
            grade: None,
        }
    }

    #[test]
    fn test_shelter_type_parses_korean_and_english_labels() {
        assert_eq!(ShelterType::parse("가로변 쉘터"), ShelterType::RoadsideShelter);
        assert_eq!(ShelterType::parse(" 환승센터 "), ShelterType::TransferCenter);
        assert_eq!(
            ShelterType::parse("village-bus-shelter"),
            ShelterType::VillageBusShelter
        );
    }

    #[test]
    fn test_unknown_shelter_type_is_kept_verbatim() {
        let parsed = ShelterType::parse("kiosk");
        assert_eq!(parsed, ShelterType::Other("kiosk".to_string()));
        assert_eq!(parsed.as_str(), "kiosk");
        assert_eq!(parsed.marker_color(), "#808080");
    }

    #[test]
    fn test_media_type_serializes_to_canonical_key() {
        let json = serde_json::to_string(&MediaType::parse("디지털")).unwrap();
        assert_eq!(json, "\"digital\"");

        let parsed: MediaType = serde_json::from_str("\"포스터\"").unwrap();
        assert_eq!(parsed, MediaType::Poster);
    }

    #[test]
    fn test_package_type_uses_single_letter_codes() {
        assert_eq!(serde_json::to_string(&PackageType::Digital).unwrap(), "\"D\"");
        let parsed: PackageType = serde_json::from_str("\"P\"").unwrap();
        assert_eq!(parsed, PackageType::Poster);
        assert_eq!(PackageType::default(), PackageType::Poster);
    }

    #[test]
    fn test_tourist_poster_requires_both_attributes() {
        let mut unit = create_test_unit();
        assert!(!unit.is_tourist_poster());

        unit.shelter_type = Some(ShelterType::TouristInfoPanel);
        assert!(unit.is_tourist_poster());

        unit.media_type = None;
        assert!(!unit.is_tourist_poster());
    }

    #[test]
    fn test_digitally_shared_by_package_or_media() {
        let mut unit = create_test_unit();
        assert!(!unit.is_digitally_shared());

        unit.package_type = PackageType::Digital;
        assert!(unit.is_digitally_shared());

        unit.package_type = PackageType::Poster;
        unit.media_type = Some(MediaType::Digital);
        assert!(unit.is_digitally_shared());
    }

    #[test]
    fn test_coordinates_require_both_values() {
        let mut unit = create_test_unit();
        assert_eq!(unit.coordinates(), Some((37.4979, 127.0276)));

        unit.longitude = None;
        assert_eq!(unit.coordinates(), None);
    }
}
