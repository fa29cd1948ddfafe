//! Seven-parameter (Bursa-Wolf) similarity transformation between two
//! geocentric frames.
//!
//! The linearised model is evaluated at the source coordinates:
//!
//! ```text
//! ΔX = Tx + m·X + ωz·Y − ωy·Z
//! ΔY = Ty − ωz·X + m·Y + ωx·Z
//! ΔZ = Tz + ωy·X − ωx·Y + m·Z
//! ```
//!
//! with `Δ = target − source`, rotations in radians and `m` the unitless
//! scale correction.

use nalgebra::{DMatrix, DVector};

use super::least_squares::min_norm_ls;
use crate::crs::ProjectionDefinition;
use crate::error::{GeoError, Result};
use crate::geodesy::Ellipsoid;
use crate::geometry::CartesianPoint;

const ARCSEC_PER_RAD: f64 = 180.0 * 3600.0 / std::f64::consts::PI;
const UNKNOWNS: usize = 7;

/// Minimum number of point pairs for a solvable system.
pub const MIN_POINTS: usize = 3;

/// Solved or user supplied similarity transform.
///
/// Translations are metres, rotations arc-seconds, scale parts per million.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct HelmertParameters {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub scale_ppm: f64,
}

impl HelmertParameters {
    /// From `[tx, ty, tz, rx, ry, rz, ppm]`.
    pub fn from_array(v: [f64; 7]) -> Self {
        Self {
            tx: v[0],
            ty: v[1],
            tz: v[2],
            rx: v[3],
            ry: v[4],
            rz: v[5],
            scale_ppm: v[6],
        }
    }

    pub fn to_array(&self) -> [f64; 7] {
        [
            self.tx,
            self.ty,
            self.tz,
            self.rx,
            self.ry,
            self.rz,
            self.scale_ppm,
        ]
    }

    /// The `TOWGS84` record of the inverse direction (local → WGS84):
    /// translation and scale negated, rotations kept.
    pub fn to_towgs84(&self) -> [f64; 7] {
        [
            -self.tx,
            -self.ty,
            -self.tz,
            self.rx,
            self.ry,
            self.rz,
            -self.scale_ppm,
        ]
    }
}

/// Helmert parameters together with diagnostics of the fit.
#[derive(Debug, Clone, PartialEq)]
pub struct HelmertSolution {
    pub parameters: HelmertParameters,
    /// Numerical rank of the design matrix, 7 for a well conditioned set.
    pub rank: usize,
    /// Root mean square of the coordinate residuals in metres.
    pub rms: f64,
}

impl HelmertSolution {
    pub fn is_degenerate(&self) -> bool {
        self.rank < UNKNOWNS
    }
}

fn design_rows(p: &CartesianPoint) -> [[f64; UNKNOWNS]; 3] {
    [
        [1.0, 0.0, 0.0, 0.0, -p.z, p.y, p.x],
        [0.0, 1.0, 0.0, p.z, 0.0, -p.x, p.y],
        [0.0, 0.0, 1.0, -p.y, p.x, 0.0, p.z],
    ]
}

fn check_pairs(source: &[CartesianPoint], target: &[CartesianPoint]) -> Result<()> {
    if source.len() != target.len() {
        return Err(GeoError::Validation(format!(
            "point lists differ in length: {} source, {} target",
            source.len(),
            target.len()
        )));
    }
    if source.len() < MIN_POINTS {
        return Err(GeoError::InsufficientData {
            required: MIN_POINTS,
            actual: source.len(),
        });
    }
    Ok(())
}

/// Least squares fit of the seven parameters mapping `source` onto `target`.
///
/// A rank deficient configuration (e.g. collinear points) still yields the
/// minimum norm solution; check [`HelmertSolution::rank`].
pub fn solve_helmert(
    source: &[CartesianPoint],
    target: &[CartesianPoint],
) -> Result<HelmertSolution> {
    check_pairs(source, target)?;
    let n = source.len();
    let mut a = DMatrix::<f64>::zeros(3 * n, UNKNOWNS);
    let mut l = DVector::<f64>::zeros(3 * n);
    for (i, (s, t)) in source.iter().zip(target).enumerate() {
        for (k, row) in design_rows(s).iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                a[(3 * i + k, j)] = *value;
            }
        }
        l[3 * i] = t.x - s.x;
        l[3 * i + 1] = t.y - s.y;
        l[3 * i + 2] = t.z - s.z;
    }

    let res = min_norm_ls(&a, &l).ok_or_else(|| {
        GeoError::NumericalDegeneracy("least squares decomposition failed".into())
    })?;
    let x = &res.parameters;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(GeoError::NumericalDegeneracy(
            "non-finite Helmert parameters".into(),
        ));
    }
    if !res.is_full_rank() {
        log::warn!(
            "Helmert system is rank deficient (rank {} of {}), points may be collinear",
            res.rank,
            UNKNOWNS
        );
    }

    let parameters = HelmertParameters {
        tx: x[0],
        ty: x[1],
        tz: x[2],
        rx: x[3] * ARCSEC_PER_RAD,
        ry: x[4] * ARCSEC_PER_RAD,
        rz: x[5] * ARCSEC_PER_RAD,
        scale_ppm: x[6] * 1e6,
    };
    let rms = (res.residuals.norm_squared() / n as f64).sqrt();
    log::info!("solved Helmert parameters {:?} (rms {:.4} m)", parameters, rms);
    Ok(HelmertSolution {
        parameters,
        rank: res.rank,
        rms,
    })
}

/// Parameters only; see [`solve_helmert`].
pub fn calculate_helmert(
    source: &[CartesianPoint],
    target: &[CartesianPoint],
) -> Result<HelmertParameters> {
    solve_helmert(source, target).map(|s| s.parameters)
}

/// Evaluates the model for each point, returning `source + Δ` in the other
/// frame.
pub fn apply_helmert(source: &[CartesianPoint], params: &HelmertParameters) -> Vec<CartesianPoint> {
    let x = [
        params.tx,
        params.ty,
        params.tz,
        params.rx / ARCSEC_PER_RAD,
        params.ry / ARCSEC_PER_RAD,
        params.rz / ARCSEC_PER_RAD,
        params.scale_ppm * 1e-6,
    ];
    source
        .iter()
        .map(|p| {
            let d: Vec<f64> = design_rows(p)
                .iter()
                .map(|row| row.iter().zip(&x).map(|(a, b)| a * b).sum())
                .collect();
            CartesianPoint::new(p.x + d[0], p.y + d[1], p.z + d[2], p.frame.other())
        })
        .collect()
}

fn fixed9(v: f64) -> String {
    // round first so tiny negatives collapse to 0, then drop the sign of -0
    let rounded = (v * 1e9).round() / 1e9;
    format!("{:.9}", rounded + 0.0)
}

/// Renders the local system as a WKT1 `PROJCS` on Krassovsky 1942 with the
/// inverse datum shift as `TOWGS84`. With `include_geoid` the result is
/// wrapped in a `COMPD_CS` adding EGM2008 heights.
pub fn generate_projected_crs_text(
    params: &HelmertParameters,
    projection: &ProjectionDefinition,
    crs_name: &str,
    include_geoid: bool,
) -> String {
    let name = if crs_name.trim().is_empty() {
        "unknown"
    } else {
        crs_name
    };
    let towgs84 = params
        .to_towgs84()
        .iter()
        .map(|v| fixed9(*v))
        .collect::<Vec<_>>()
        .join(",");
    let ell = Ellipsoid::KRASSOVSKY;
    let projcs = format!(
        r#"PROJCS["{name}",
    GEOGCS["{name}",
        DATUM["{ell_name}",
            SPHEROID["{ell_name}",{a},{rf}],
            TOWGS84[{towgs84}]],
        PRIMEM["Greenwich",0,
            AUTHORITY["EPSG","8901"]],
        UNIT["degree",0.0174532925199433,
            AUTHORITY["EPSG","9122"]]],
    PROJECTION["Transverse_Mercator"],
    PARAMETER["latitude_of_origin",{lat0}],
    PARAMETER["central_meridian",{cm}],
    PARAMETER["scale_factor",{k}],
    PARAMETER["false_easting",{fe}],
    PARAMETER["false_northing",{fn_}],
    UNIT["metre",1,
        AUTHORITY["EPSG","9001"]],
    AXIS["Easting",EAST],
    AXIS["Northing",NORTH]]"#,
        name = name,
        ell_name = Ellipsoid::KRASSOVSKY_NAME,
        a = ell.a,
        rf = ell.inv_f,
        towgs84 = towgs84,
        lat0 = projection.latitude_of_origin,
        cm = projection.central_meridian,
        k = projection.scale_factor,
        fe = projection.false_easting,
        fn_ = projection.false_northing,
    );
    if !include_geoid {
        return projcs;
    }
    format!(
        "COMPD_CS[\"{name} + EGM2008 geoid height\",\n\
         \t{projcs},\n\
         \tVERT_CS[\"EGM2008 geoid height\",\n\
         \t\tVERT_DATUM[\"EGM2008  geoid\",2005,AUTHORITY[\"EPSG\",\"1027\"]],\n\
         \t\tUNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]],\n\
         \tAUTHORITY[\"EPSG\",\"3855\"]]]",
        name = name,
        projcs = projcs,
    )
}
