//! Geodetic primitives the converter is built on: frame conversions, the
//! Transverse Mercator projection, external CRS transforms and geoid
//! heights, all evaluated by PROJ.

pub mod ellipsoid;
pub mod proj_engine;

pub use ellipsoid::Ellipsoid;
pub use proj_engine::ProjEngine;

use crate::crs::{ProjectionDefinition, ResolvedCrs};
use crate::error::Result;

/// Operations the estimators and the converter need from a geodesy library.
///
/// Angles are decimal degrees, lengths are metres. Projected coordinates are
/// always returned as `(northing, easting)`.
pub trait GeodesyEngine {
    fn geodetic_to_geocentric(
        &self,
        ellipsoid: &Ellipsoid,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<(f64, f64, f64)>;

    /// Returns `(lat, lon, h)`.
    fn geocentric_to_geodetic(
        &self,
        ellipsoid: &Ellipsoid,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(f64, f64, f64)>;

    fn project_forward(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64)>;

    /// Projects a batch of `(lat, lon)` positions with one projection.
    fn project_forward_all(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        positions: &[(f64, f64)],
    ) -> Result<Vec<(f64, f64)>> {
        positions
            .iter()
            .map(|&(lat, lon)| self.project_forward(ellipsoid, projection, lat, lon))
            .collect()
    }

    /// Returns `(lat, lon)`.
    fn project_inverse(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        northing: f64,
        easting: f64,
    ) -> Result<(f64, f64)>;

    /// Checks serialized CRS text (WKT) and splits off its vertical part.
    fn resolve_definition(&self, text: &str) -> Result<ResolvedCrs>;

    fn is_compound_with_known_geoid(&self, crs: &ResolvedCrs) -> bool {
        crs.geoid.is_some()
    }

    /// WGS84 position to `(northing, easting)` in the projected part of
    /// `crs`.
    fn wgs84_to_crs_horizontal(&self, crs: &ResolvedCrs, lat: f64, lon: f64)
        -> Result<(f64, f64)>;

    /// Orthometric height from an ellipsoidal one.
    fn apply_geoid_correction(&self, lat: f64, lon: f64, ellipsoidal_height: f64) -> Result<f64>;
}
