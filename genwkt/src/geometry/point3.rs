//! Geocentric Cartesian coordinates.

/// Ellipsoid frame a geocentric coordinate is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Frame {
    Wgs84,
    Krassovsky,
}

impl Frame {
    /// The frame on the other side of the WGS84 ↔ local transform.
    pub fn other(self) -> Self {
        match self {
            Frame::Wgs84 => Frame::Krassovsky,
            Frame::Krassovsky => Frame::Wgs84,
        }
    }
}

/// Geocentric X, Y, Z coordinates in metres.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub frame: Frame,
}

impl CartesianPoint {
    pub fn new(x: f64, y: f64, z: f64, frame: Frame) -> Self {
        Self { x, y, z, frame }
    }

    /// Straight-line distance to another point, ignoring frames.
    pub fn distance(&self, other: &CartesianPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
