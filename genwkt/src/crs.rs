//! Coordinate reference system definitions used by the converter.

use crate::error::{GeoError, Result};
use crate::geodesy::Ellipsoid;

/// Transverse Mercator definition of the local system.
///
/// Together with the fixed Krassovsky ellipsoid this fully determines the
/// mapping between geodetic and projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionDefinition {
    /// Central meridian in decimal degrees.
    pub central_meridian: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Latitude of origin in decimal degrees.
    pub latitude_of_origin: f64,
}

impl Default for ProjectionDefinition {
    fn default() -> Self {
        Self {
            central_meridian: 0.0,
            scale_factor: 1.0,
            false_easting: 0.0,
            false_northing: 0.0,
            latitude_of_origin: 0.0,
        }
    }
}

impl ProjectionDefinition {
    /// Definition with unit scale and zero latitude of origin.
    pub fn new(central_meridian: f64, false_easting: f64, false_northing: f64) -> Self {
        Self {
            central_meridian,
            false_easting,
            false_northing,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_latitude_of_origin(mut self, latitude_of_origin: f64) -> Self {
        self.latitude_of_origin = latitude_of_origin;
        self
    }

    /// Checks the invariants a projection needs before it can be evaluated.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.central_meridian,
            self.scale_factor,
            self.false_easting,
            self.false_northing,
            self.latitude_of_origin,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::Definition(format!(
                "projection parameters must be finite: {:?}",
                self
            )));
        }
        if self.scale_factor <= 0.0 {
            return Err(GeoError::Definition(format!(
                "scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.latitude_of_origin.abs() > 90.0 {
            return Err(GeoError::Definition(format!(
                "latitude of origin out of range: {}",
                self.latitude_of_origin
            )));
        }
        Ok(())
    }

    /// PROJ `tmerc` definition on the given ellipsoid.
    pub fn to_proj_string(&self, ellipsoid: &Ellipsoid) -> String {
        format!(
            "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} {} +units=m +no_defs",
            self.latitude_of_origin,
            self.central_meridian,
            self.scale_factor,
            self.false_easting,
            self.false_northing,
            ellipsoid.proj_params(),
        )
    }
}

/// Geoid models whose vertical CRS the converter knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoidModel {
    Egm2008,
}

impl GeoidModel {
    pub fn name(self) -> &'static str {
        match self {
            GeoidModel::Egm2008 => "EGM2008",
        }
    }

    /// Grid file PROJ looks up in its search path when none is configured.
    pub fn default_grid(self) -> &'static str {
        match self {
            GeoidModel::Egm2008 => "us_nga_egm2008_1.tif",
        }
    }
}

/// An external CRS description PROJ accepted, with what the converter needs
/// to know about its vertical part.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCrs {
    pub name: String,
    /// The projected component, as handed to PROJ.
    pub horizontal: String,
    /// Name of the vertical component of a compound CRS.
    pub vertical: Option<String>,
    /// Geoid model the vertical component was recognised as.
    pub geoid: Option<GeoidModel>,
}

impl ResolvedCrs {
    pub fn is_compound(&self) -> bool {
        self.vertical.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_scale() {
        let def = ProjectionDefinition::new(30.0, 0.0, 0.0).with_scale(0.0);
        assert!(matches!(def.validate(), Err(GeoError::Definition(_))));
        let def = ProjectionDefinition::new(30.0, 0.0, 0.0).with_scale(-1.0);
        assert!(def.validate().is_err());
    }

    #[test]
    fn proj_string_lists_parameters() {
        let def = ProjectionDefinition::new(30.0, 500000.0, 0.0);
        let s = def.to_proj_string(&Ellipsoid::KRASSOVSKY);
        assert!(s.starts_with("+proj=tmerc"));
        assert!(s.contains("+lon_0=30"));
        assert!(s.contains("+x_0=500000"));
        assert!(s.contains("+ellps=krass"));
    }

    #[test]
    fn plain_crs_is_not_compound() {
        let crs = ResolvedCrs {
            name: "MSK".into(),
            horizontal: "PROJCS[\"MSK\"]".into(),
            vertical: None,
            geoid: None,
        };
        assert!(!crs.is_compound());
        assert_eq!(GeoidModel::Egm2008.name(), "EGM2008");
    }
}
