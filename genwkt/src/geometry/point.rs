//! Surveyed control points on either side of the transformation.

/// A WGS84 point: latitude and longitude in decimal degrees, ellipsoidal
/// height in metres.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeodeticPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
}

impl GeodeticPoint {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            height,
        }
    }
}

/// A point in the local projected system (northing, easting, height in metres).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectedPoint {
    pub id: String,
    pub northing: f64,
    pub easting: f64,
    pub height: f64,
}

impl ProjectedPoint {
    pub fn new(id: impl Into<String>, northing: f64, easting: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            northing,
            easting,
            height,
        }
    }
}
