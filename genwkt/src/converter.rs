//! Frame conversions between WGS84, the local Krassovsky datum and its
//! Transverse Mercator plane.

use crate::crs::{ProjectionDefinition, ResolvedCrs};
use crate::error::{GeoError, Result};
use crate::geodesy::{Ellipsoid, GeodesyEngine, ProjEngine};
use crate::geometry::{CartesianPoint, Frame};

/// Result of converting a WGS84 point with an external CRS description.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalConversion {
    pub northing: f64,
    pub easting: f64,
    pub height: f64,
    /// True when `height` is orthometric (geoid applied).
    pub geoid_applied: bool,
    /// Set when the CRS asked for a geoid that could not be applied.
    pub warning: Option<String>,
}

/// Stateless wrapper around a [`GeodesyEngine`] fixing the two frames used
/// by the estimators.
#[derive(Debug, Clone, Default)]
pub struct CoordinateConverter<E = ProjEngine> {
    engine: E,
}

impl CoordinateConverter<ProjEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: GeodesyEngine> CoordinateConverter<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn wgs84_to_geocentric(&self, lat: f64, lon: f64, h: f64) -> Result<CartesianPoint> {
        let (x, y, z) = self
            .engine
            .geodetic_to_geocentric(&Ellipsoid::WGS84, lat, lon, h)?;
        Ok(CartesianPoint::new(x, y, z, Frame::Wgs84))
    }

    /// Plane coordinates of the local system to Krassovsky geocentric.
    pub fn local_to_geocentric(
        &self,
        northing: f64,
        easting: f64,
        h: f64,
        projection: &ProjectionDefinition,
    ) -> Result<CartesianPoint> {
        let (lat, lon) =
            self.engine
                .project_inverse(&Ellipsoid::KRASSOVSKY, projection, northing, easting)?;
        let (x, y, z) = self
            .engine
            .geodetic_to_geocentric(&Ellipsoid::KRASSOVSKY, lat, lon, h)?;
        log::debug!(
            "local ({:.4}, {:.4}) -> ({:.9}, {:.9}) -> ({:.4}, {:.4}, {:.4})",
            northing,
            easting,
            lat,
            lon,
            x,
            y,
            z
        );
        Ok(CartesianPoint::new(x, y, z, Frame::Krassovsky))
    }

    /// Krassovsky geocentric to `(northing, easting, h)` in the local system.
    pub fn geocentric_to_local(
        &self,
        point: &CartesianPoint,
        projection: &ProjectionDefinition,
    ) -> Result<(f64, f64, f64)> {
        if point.frame != Frame::Krassovsky {
            return Err(GeoError::Transform(format!(
                "expected a Krassovsky geocentric point, got {:?}",
                point.frame
            )));
        }
        let (lat, lon, h) =
            self.engine
                .geocentric_to_geodetic(&Ellipsoid::KRASSOVSKY, point.x, point.y, point.z)?;
        let (n, e) = self
            .engine
            .project_forward(&Ellipsoid::KRASSOVSKY, projection, lat, lon)?;
        Ok((n, e, h))
    }

    /// Forward projection on the local ellipsoid.
    pub fn project_local(
        &self,
        lat: f64,
        lon: f64,
        projection: &ProjectionDefinition,
    ) -> Result<(f64, f64)> {
        self.engine
            .project_forward(&Ellipsoid::KRASSOVSKY, projection, lat, lon)
    }

    /// Forward projection of many `(lat, lon)` positions on the local
    /// ellipsoid.
    pub fn project_local_all(
        &self,
        positions: &[(f64, f64)],
        projection: &ProjectionDefinition,
    ) -> Result<Vec<(f64, f64)>> {
        self.engine
            .project_forward_all(&Ellipsoid::KRASSOVSKY, projection, positions)
    }

    pub fn resolve(&self, definition: &str) -> Result<ResolvedCrs> {
        self.engine.resolve_definition(definition)
    }

    /// Converts a WGS84 point with an already resolved CRS.
    ///
    /// A geoid correction that cannot be made (grid missing, position
    /// outside the grid) degrades to the ellipsoidal height and a warning.
    pub fn convert_with(
        &self,
        crs: &ResolvedCrs,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<ExternalConversion> {
        let mut height = h;
        let mut geoid_applied = false;
        let mut warning = None;
        if self.engine.is_compound_with_known_geoid(crs) {
            match self.engine.apply_geoid_correction(lat, lon, h) {
                Ok(orthometric) => {
                    height = orthometric;
                    geoid_applied = true;
                }
                Err(GeoError::ResourceUnavailable(reason)) => {
                    log::warn!("geoid correction skipped: {}", reason);
                    warning = Some(format!(
                        "geoid grid unavailable ({}); height left ellipsoidal",
                        reason
                    ));
                }
                Err(e) => {
                    log::warn!("geoid correction failed: {}", e);
                    warning = Some(format!(
                        "geoid correction failed ({}); height left ellipsoidal",
                        e
                    ));
                }
            }
        }
        let (northing, easting) = self.engine.wgs84_to_crs_horizontal(crs, lat, lon)?;
        Ok(ExternalConversion {
            northing,
            easting,
            height,
            geoid_applied,
            warning,
        })
    }

    /// Resolves `definition` and converts one WGS84 point with it.
    pub fn apply_external_definition(
        &self,
        definition: &str,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<ExternalConversion> {
        let crs = self.resolve(definition)?;
        self.convert_with(&crs, lat, lon, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PROJ for everything except geoid heights, which always fail.
    struct NoGeoidHere(ProjEngine);

    impl GeodesyEngine for NoGeoidHere {
        fn geodetic_to_geocentric(
            &self,
            ellipsoid: &Ellipsoid,
            lat: f64,
            lon: f64,
            h: f64,
        ) -> Result<(f64, f64, f64)> {
            self.0.geodetic_to_geocentric(ellipsoid, lat, lon, h)
        }

        fn geocentric_to_geodetic(
            &self,
            ellipsoid: &Ellipsoid,
            x: f64,
            y: f64,
            z: f64,
        ) -> Result<(f64, f64, f64)> {
            self.0.geocentric_to_geodetic(ellipsoid, x, y, z)
        }

        fn project_forward(
            &self,
            ellipsoid: &Ellipsoid,
            projection: &ProjectionDefinition,
            lat: f64,
            lon: f64,
        ) -> Result<(f64, f64)> {
            self.0.project_forward(ellipsoid, projection, lat, lon)
        }

        fn project_inverse(
            &self,
            ellipsoid: &Ellipsoid,
            projection: &ProjectionDefinition,
            northing: f64,
            easting: f64,
        ) -> Result<(f64, f64)> {
            self.0.project_inverse(ellipsoid, projection, northing, easting)
        }

        fn resolve_definition(&self, text: &str) -> Result<ResolvedCrs> {
            self.0.resolve_definition(text)
        }

        fn wgs84_to_crs_horizontal(
            &self,
            crs: &ResolvedCrs,
            lat: f64,
            lon: f64,
        ) -> Result<(f64, f64)> {
            self.0.wgs84_to_crs_horizontal(crs, lat, lon)
        }

        fn apply_geoid_correction(&self, lat: f64, lon: f64, _h: f64) -> Result<f64> {
            Err(GeoError::Transform(format!(
                "position ({}, {}) is outside the geoid grid",
                lat, lon
            )))
        }
    }

    const GK_EGM2008: &str = r#"COMPD_CS["gk + EGM2008",PROJCS["gk",GEOGCS["pulkovo",DATUM["p",SPHEROID["k",6378245,298.3],TOWGS84[23.92,-141.27,-80.9,0,0.35,0.82,-0.12]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",39],PARAMETER["scale_factor",1],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1]],VERT_CS["EGM2008 height",VERT_DATUM["EGM2008 geoid",2005],UNIT["metre",1]]]"#;

    #[test]
    fn failed_geoid_lookup_keeps_ellipsoidal_height() {
        let converter = CoordinateConverter::with_engine(NoGeoidHere(ProjEngine::new()));
        let out = converter
            .apply_external_definition(GK_EGM2008, 55.0, 39.0, 148.13)
            .unwrap();
        assert_eq!(out.height, 148.13);
        assert!(!out.geoid_applied);
        assert!(out.warning.unwrap().contains("outside the geoid grid"));
        assert!((out.easting - 500_000.0).abs() < 1_000.0);
    }

    #[test]
    fn local_round_trip() {
        let converter = CoordinateConverter::new();
        let def = ProjectionDefinition::new(30.0, 67119.6943, -6191992.4462);
        let p = converter
            .local_to_geocentric(7686.0996, -8996.7276, 128.3139, &def)
            .unwrap();
        assert_eq!(p.frame, Frame::Krassovsky);
        let (n, e, h) = converter.geocentric_to_local(&p, &def).unwrap();
        assert!((n - 7686.0996).abs() < 1e-6);
        assert!((e + 8996.7276).abs() < 1e-6);
        assert!((h - 128.3139).abs() < 1e-6);
    }

    #[test]
    fn geocentric_to_local_rejects_wgs_frame() {
        let converter = CoordinateConverter::new();
        let p = converter.wgs84_to_geocentric(55.9, 28.8, 150.0).unwrap();
        let def = ProjectionDefinition::new(30.0, 0.0, 0.0);
        assert!(matches!(
            converter.geocentric_to_local(&p, &def),
            Err(GeoError::Transform(_))
        ));
    }
}
