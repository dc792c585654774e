//! Map markers for the displayed subset.

use crate::models::{AdjustedUnit, MapMarker};

/// Color for units without a recorded shelter type.
pub const DEFAULT_MARKER_COLOR: &str = "#808080";

/// Builds one marker per displayed unit that has both coordinates.
///
/// Units without a location are skipped. Marker order follows the ranked
/// order of `units`.
pub fn map_markers(units: &[AdjustedUnit]) -> Vec<MapMarker> {
    units
        .iter()
        .filter_map(|unit| {
            let (lat, lng) = unit.latitude.zip(unit.longitude)?;
            Some(MapMarker {
                id: unit.id.clone(),
                name: unit.name.clone(),
                lat,
                lng,
                color: unit
                    .shelter_type
                    .as_ref()
                    .map_or(DEFAULT_MARKER_COLOR, |shelter| shelter.marker_color())
                    .to_string(),
                rots: unit.adjusted_rots,
                reach: unit.adjusted_reach,
            })
        })
        .collect()
}
