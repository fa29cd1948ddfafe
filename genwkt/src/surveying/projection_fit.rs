//! Recovery of the Transverse Mercator definition of a local system from
//! control points known in WGS84 and in local plane coordinates.

use super::nelder_mead::NelderMead;
use crate::converter::CoordinateConverter;
use crate::crs::ProjectionDefinition;
use crate::error::{GeoError, Result};
use crate::geodesy::GeodesyEngine;
use crate::geometry::{GeodeticPoint, ProjectedPoint};

/// Objective value of parameter vectors the projection cannot evaluate.
const PENALTY: f64 = 1e20;
const STEP_MERIDIAN: f64 = 0.01;
const STEP_OFFSET: f64 = 10.0;
const STEP_SCALE: f64 = 1e-5;

/// Tuning of the projection estimator.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
    /// Keep the scale factor at 1 (stage 1 only).
    pub fixed_scale: bool,
    /// Iteration cap per optimisation stage.
    pub max_iterations: usize,
    pub x_tolerance: f64,
    pub f_tolerance: f64,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            fixed_scale: true,
            max_iterations: 4000,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
        }
    }
}

/// Estimated projection with optimiser diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFit {
    pub definition: ProjectionDefinition,
    /// Sum of squared plane residuals in m².
    pub cost: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl ProjectionFit {
    /// RMS plane residual per point in metres.
    pub fn rms(&self, points: usize) -> f64 {
        if points == 0 {
            0.0
        } else {
            (self.cost / points as f64).sqrt()
        }
    }
}

fn check_points(geodetic: &[GeodeticPoint], projected: &[ProjectedPoint]) -> Result<()> {
    if geodetic.len() != projected.len() {
        return Err(GeoError::Validation(format!(
            "{} WGS84 points but {} local points",
            geodetic.len(),
            projected.len()
        )));
    }
    if geodetic.len() < 3 {
        return Err(GeoError::InsufficientData {
            required: 3,
            actual: geodetic.len(),
        });
    }
    Ok(())
}

fn sum_of_squares<E: GeodesyEngine>(
    converter: &CoordinateConverter<E>,
    positions: &[(f64, f64)],
    projected: &[ProjectedPoint],
    definition: &ProjectionDefinition,
) -> f64 {
    if definition.scale_factor <= 0.0 {
        return PENALTY;
    }
    let Ok(computed) = converter.project_local_all(positions, definition) else {
        return PENALTY;
    };
    let sum: f64 = computed
        .iter()
        .zip(projected)
        .map(|((n, e), p)| (n - p.northing).powi(2) + (e - p.easting).powi(2))
        .sum();
    if sum.is_finite() {
        sum
    } else {
        PENALTY
    }
}

/// Fits central meridian and false offsets (and, unless
/// `options.fixed_scale`, the scale factor) so that projecting `geodetic`
/// reproduces `projected` in the least squares sense.
///
/// Points pair up by position. The latitude of origin stays 0.
/// Non-convergence is not an error; it is reported in the returned fit.
pub fn estimate_projection<E: GeodesyEngine>(
    converter: &CoordinateConverter<E>,
    geodetic: &[GeodeticPoint],
    projected: &[ProjectedPoint],
    options: &EstimatorOptions,
) -> Result<ProjectionFit> {
    check_points(geodetic, projected)?;
    let count = geodetic.len() as f64;
    let positions: Vec<(f64, f64)> = geodetic.iter().map(|g| (g.lat, g.lon)).collect();

    let cm0 = geodetic.iter().map(|g| g.lon).sum::<f64>() / count;
    let trial = ProjectionDefinition::new(cm0, 0.0, 0.0);
    let (mut dn, mut de) = (0.0, 0.0);
    for ((n, e), p) in converter.project_local_all(&positions, &trial)?.iter().zip(projected) {
        dn += p.northing - n;
        de += p.easting - e;
    }
    let (fe0, fn0) = (de / count, dn / count);
    log::debug!(
        "initial projection guess cm={:.6} fe={:.3} fn={:.3}",
        cm0,
        fe0,
        fn0
    );

    let configure = |nm: NelderMead| {
        nm.with_max_iterations(options.max_iterations)
            .with_tolerances(options.x_tolerance, options.f_tolerance)
    };

    let stage1 = configure(NelderMead::new(vec![STEP_MERIDIAN, STEP_OFFSET, STEP_OFFSET]))
        .minimize(
            |x| {
                let def = ProjectionDefinition::new(x[0], x[1], x[2]);
                sum_of_squares(converter, &positions, projected, &def)
            },
            &[cm0, fe0, fn0],
        );
    if !stage1.converged {
        log::warn!(
            "projection fit (fixed scale) did not converge after {} iterations",
            stage1.iterations
        );
    }
    let mut fit = ProjectionFit {
        definition: ProjectionDefinition::new(stage1.x[0], stage1.x[1], stage1.x[2]),
        cost: stage1.value,
        iterations: stage1.iterations,
        converged: stage1.converged,
    };

    if !options.fixed_scale {
        let stage2 = configure(NelderMead::new(vec![
            STEP_MERIDIAN,
            STEP_SCALE,
            STEP_OFFSET,
            STEP_OFFSET,
        ]))
        .minimize(
            |x| {
                let def = ProjectionDefinition::new(x[0], x[2], x[3]).with_scale(x[1]);
                sum_of_squares(converter, &positions, projected, &def)
            },
            &[stage1.x[0], 1.0, stage1.x[1], stage1.x[2]],
        );
        if !stage2.converged {
            log::warn!(
                "projection fit (free scale) did not converge after {} iterations",
                stage2.iterations
            );
        }
        fit = ProjectionFit {
            definition: ProjectionDefinition::new(stage2.x[0], stage2.x[2], stage2.x[3])
                .with_scale(stage2.x[1]),
            cost: stage2.value,
            iterations: fit.iterations + stage2.iterations,
            converged: fit.converged && stage2.converged,
        };
    }

    if fit.cost >= PENALTY {
        return Err(GeoError::NumericalDegeneracy(
            "no projection parameters reproduce the local points".into(),
        ));
    }
    log::info!(
        "estimated projection {:?} (rms {:.4} m, {} iterations)",
        fit.definition,
        fit.rms(geodetic.len()),
        fit.iterations
    );
    Ok(fit)
}
