//! [`GeodesyEngine`] backed by the PROJ library through the `proj` crate.

use std::path::Path;

use proj::Proj;

use super::{Ellipsoid, GeodesyEngine};
use crate::crs::{ProjectionDefinition, ResolvedCrs};
use crate::error::{GeoError, Result};
use crate::io::wkt::resolve_wkt;

/// Geographic WGS84, the source of every external conversion.
pub const WGS84_CRS: &str = "EPSG:4326";

/// PROJ operations built per call from the requested definitions.
#[derive(Debug, Clone, Default)]
pub struct ProjEngine {
    geoid_grid: Option<String>,
}

impl ProjEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid used for geoid corrections: a file path, or a grid name PROJ
    /// looks up in its search path (e.g. `us_nga_egm2008_1.tif`).
    pub fn with_geoid_grid(mut self, grid: impl Into<String>) -> Self {
        self.geoid_grid = Some(grid.into());
        self
    }

    pub fn geoid_grid(&self) -> Option<&str> {
        self.geoid_grid.as_deref()
    }
}

/// Pipeline feeding longitude/latitude in degrees into `operation`.
fn from_degrees(operation: &str) -> String {
    format!(
        "+proj=pipeline +step +proj=unitconvert +xy_in=deg +xy_out=rad +step {}",
        operation
    )
}

/// Pipeline running `operation` backwards and returning degrees.
fn inverse_to_degrees(operation: &str) -> String {
    format!(
        "+proj=pipeline +step +inv {} +step +proj=unitconvert +xy_in=rad +xy_out=deg",
        operation
    )
}

fn create(definition: &str) -> Result<Proj> {
    Proj::new(definition)
        .map_err(|e| GeoError::Definition(format!("PROJ rejected '{}': {}", definition, e)))
}

fn tmerc(ellipsoid: &Ellipsoid, projection: &ProjectionDefinition) -> Result<String> {
    projection.validate()?;
    Ok(projection.to_proj_string(ellipsoid))
}

fn finite2((a, b): (f64, f64)) -> Result<(f64, f64)> {
    if a.is_finite() && b.is_finite() {
        Ok((a, b))
    } else {
        Err(GeoError::Transform(format!("PROJ returned ({}, {})", a, b)))
    }
}

fn finite3((a, b, c): (f64, f64, f64)) -> Result<(f64, f64, f64)> {
    if a.is_finite() && b.is_finite() && c.is_finite() {
        Ok((a, b, c))
    } else {
        Err(GeoError::Transform(format!("PROJ returned ({}, {}, {})", a, b, c)))
    }
}

fn transform_error(e: proj::ProjError) -> GeoError {
    GeoError::Transform(e.to_string())
}

impl GeodesyEngine for ProjEngine {
    fn geodetic_to_geocentric(
        &self,
        ellipsoid: &Ellipsoid,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<(f64, f64, f64)> {
        let cart = create(&from_degrees(&format!("+proj=cart {}", ellipsoid.proj_params())))?;
        cart.convert((lon, lat, h)).map_err(transform_error).and_then(finite3)
    }

    fn geocentric_to_geodetic(
        &self,
        ellipsoid: &Ellipsoid,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(f64, f64, f64)> {
        let cart = create(&inverse_to_degrees(&format!(
            "+proj=cart {}",
            ellipsoid.proj_params()
        )))?;
        let (lon, lat, h) = cart
            .convert((x, y, z))
            .map_err(transform_error)
            .and_then(finite3)?;
        Ok((lat, lon, h))
    }

    fn project_forward(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64)> {
        let proj = create(&from_degrees(&tmerc(ellipsoid, projection)?))?;
        let (easting, northing) = proj
            .convert((lon, lat))
            .map_err(transform_error)
            .and_then(finite2)?;
        Ok((northing, easting))
    }

    fn project_forward_all(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        positions: &[(f64, f64)],
    ) -> Result<Vec<(f64, f64)>> {
        let proj = create(&from_degrees(&tmerc(ellipsoid, projection)?))?;
        positions
            .iter()
            .map(|&(lat, lon)| {
                let (easting, northing) =
                    proj.convert((lon, lat)).map_err(transform_error).and_then(finite2)?;
                Ok((northing, easting))
            })
            .collect()
    }

    fn project_inverse(
        &self,
        ellipsoid: &Ellipsoid,
        projection: &ProjectionDefinition,
        northing: f64,
        easting: f64,
    ) -> Result<(f64, f64)> {
        let proj = create(&inverse_to_degrees(&tmerc(ellipsoid, projection)?))?;
        let (lon, lat) = proj
            .convert((easting, northing))
            .map_err(transform_error)
            .and_then(finite2)?;
        Ok((lat, lon))
    }

    fn resolve_definition(&self, text: &str) -> Result<ResolvedCrs> {
        let crs = resolve_wkt(text)?;
        Proj::new_known_crs(WGS84_CRS, &crs.horizontal, None).map_err(|e| {
            GeoError::Definition(format!("PROJ cannot use CRS '{}': {}", crs.name, e))
        })?;
        Ok(crs)
    }

    fn wgs84_to_crs_horizontal(
        &self,
        crs: &ResolvedCrs,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64)> {
        let proj = Proj::new_known_crs(WGS84_CRS, &crs.horizontal, None).map_err(|e| {
            GeoError::Definition(format!("PROJ cannot use CRS '{}': {}", crs.name, e))
        })?;
        let (easting, northing) = proj
            .convert((lon, lat))
            .map_err(transform_error)
            .and_then(finite2)?;
        Ok((northing, easting))
    }

    /// `H = h − N` through a `vgridshift` step applied in reverse.
    fn apply_geoid_correction(&self, lat: f64, lon: f64, ellipsoidal_height: f64) -> Result<f64> {
        let grid = self.geoid_grid.as_deref().ok_or_else(|| {
            GeoError::ResourceUnavailable("no geoid grid configured".to_string())
        })?;
        let is_path = grid.contains('/') || grid.contains('\\');
        if is_path && !Path::new(grid).exists() {
            return Err(GeoError::ResourceUnavailable(format!(
                "geoid grid {} not found",
                grid
            )));
        }
        let pipeline = from_degrees(&format!(
            "+proj=vgridshift +grids={} +multiplier=1 +inv",
            grid
        ));
        let proj = Proj::new(&pipeline).map_err(|e| {
            GeoError::ResourceUnavailable(format!("cannot open geoid grid {}: {}", grid, e))
        })?;
        let (_, _, height) = proj
            .convert((lon, lat, ellipsoidal_height))
            .map_err(|e| {
                GeoError::Transform(format!(
                    "no geoid height at ({}, {}) in {}: {}",
                    lat, lon, grid, e
                ))
            })
            .and_then(finite3)?;
        log::debug!(
            "geoid correction at ({:.7}, {:.7}): {:.4} -> {:.4}",
            lat,
            lon,
            ellipsoidal_height,
            height
        );
        Ok(height)
    }
}
