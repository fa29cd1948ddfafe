//! The "calculate" pipeline: projection, Helmert parameters and the
//! round-trip check against the local control points.

use crate::converter::CoordinateConverter;
use crate::crs::ProjectionDefinition;
use crate::error::{GeoError, Result, Stage};
use crate::geodesy::{GeodesyEngine, ProjEngine};
use crate::geometry::{CartesianPoint, GeodeticPoint, ProjectedPoint};
use crate::surveying::helmert::{self, HelmertParameters, HelmertSolution};
use crate::surveying::projection_fit::{estimate_projection, EstimatorOptions, ProjectionFit};

/// Input of one calculation. Points pair up by position.
#[derive(Debug, Clone, Default)]
pub struct CalculationRequest {
    pub wgs84: Vec<GeodeticPoint>,
    pub local: Vec<ProjectedPoint>,
    /// Pinned projection; estimated when `None`.
    pub projection: Option<ProjectionDefinition>,
    /// Pinned transform; solved when `None`.
    pub helmert: Option<HelmertParameters>,
    /// Let the projection estimator fit the scale factor as well.
    pub estimate_scale: bool,
}

impl CalculationRequest {
    pub fn new(wgs84: Vec<GeodeticPoint>, local: Vec<ProjectedPoint>) -> Self {
        Self {
            wgs84,
            local,
            ..Self::default()
        }
    }

    pub fn with_projection(mut self, projection: ProjectionDefinition) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_helmert(mut self, helmert: HelmertParameters) -> Self {
        self.helmert = Some(helmert);
        self
    }

    pub fn with_estimate_scale(mut self, estimate_scale: bool) -> Self {
        self.estimate_scale = estimate_scale;
        self
    }
}

/// Local coordinate minus its value after the round trip through the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparisonRow {
    pub id: String,
    pub d_northing: f64,
    pub d_easting: f64,
    pub d_height: f64,
}

impl ComparisonRow {
    pub fn horizontal(&self) -> f64 {
        self.d_northing.hypot(self.d_easting)
    }
}

/// Last solved projection and transform, kept by the caller so the WKT can
/// be rendered again (e.g. with or without geoid) without recomputing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SolvedModel {
    pub projection: ProjectionDefinition,
    pub helmert: HelmertParameters,
}

impl SolvedModel {
    pub fn projected_crs_text(&self, crs_name: &str, include_geoid: bool) -> String {
        helmert::generate_projected_crs_text(
            &self.helmert,
            &self.projection,
            crs_name,
            include_geoid,
        )
    }
}

#[derive(Debug, Clone)]
pub struct CalculationOutcome {
    pub model: SolvedModel,
    /// Present when the projection was estimated.
    pub projection_fit: Option<ProjectionFit>,
    /// Present when the transform was solved.
    pub helmert_solution: Option<HelmertSolution>,
    pub rows: Vec<ComparisonRow>,
    /// Horizontal RMS of the comparison rows, metres.
    pub rms_horizontal: f64,
    /// Height RMS of the comparison rows, metres.
    pub rms_height: f64,
    /// Degraded but usable results (non-convergence, rank deficiency).
    pub warnings: Vec<String>,
}

impl CalculationOutcome {
    pub fn projection(&self) -> &ProjectionDefinition {
        &self.model.projection
    }

    pub fn helmert(&self) -> &HelmertParameters {
        &self.model.helmert
    }

    pub fn max_horizontal(&self) -> f64 {
        self.rows
            .iter()
            .map(ComparisonRow::horizontal)
            .fold(0.0, f64::max)
    }
}

/// Runs calculations; holds no state between runs.
#[derive(Debug, Clone, Default)]
pub struct Calculator<E = ProjEngine> {
    converter: CoordinateConverter<E>,
    options: EstimatorOptions,
}

impl Calculator<ProjEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: GeodesyEngine> Calculator<E> {
    pub fn with_converter(converter: CoordinateConverter<E>) -> Self {
        Self {
            converter,
            options: EstimatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EstimatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn converter(&self) -> &CoordinateConverter<E> {
        &self.converter
    }

    fn validate(request: &CalculationRequest) -> Result<()> {
        let (w, l) = (request.wgs84.len(), request.local.len());
        if w != l {
            return Err(GeoError::Validation(format!(
                "{} WGS84 points but {} local points",
                w, l
            )));
        }
        if w < 3 {
            return Err(GeoError::Validation(format!(
                "at least 3 point pairs are required, got {}",
                w
            )));
        }
        Ok(())
    }

    fn resolve_projection(
        &self,
        request: &CalculationRequest,
    ) -> Result<(ProjectionDefinition, Option<ProjectionFit>)> {
        if let Some(pinned) = request.projection {
            pinned.validate()?;
            log::info!("using pinned projection {:?}", pinned);
            return Ok((pinned, None));
        }
        let options = EstimatorOptions {
            fixed_scale: !request.estimate_scale,
            ..self.options
        };
        let fit = estimate_projection(&self.converter, &request.wgs84, &request.local, &options)?;
        Ok((fit.definition, Some(fit)))
    }

    fn geocentric_pairs(
        &self,
        request: &CalculationRequest,
        projection: &ProjectionDefinition,
    ) -> Result<(Vec<CartesianPoint>, Vec<CartesianPoint>)> {
        let source = request
            .wgs84
            .iter()
            .map(|g| self.converter.wgs84_to_geocentric(g.lat, g.lon, g.height))
            .collect::<Result<Vec<_>>>()?;
        let target = request
            .local
            .iter()
            .map(|p| {
                self.converter
                    .local_to_geocentric(p.northing, p.easting, p.height, projection)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((source, target))
    }

    fn verify(
        &self,
        request: &CalculationRequest,
        source: &[CartesianPoint],
        model: &SolvedModel,
    ) -> Result<Vec<ComparisonRow>> {
        helmert::apply_helmert(source, &model.helmert)
            .iter()
            .zip(request.local.iter().zip(&request.wgs84))
            .map(|(moved, (local, wgs))| -> Result<ComparisonRow> {
                let (n, e, h) = self.converter.geocentric_to_local(moved, &model.projection)?;
                let id = if local.id.is_empty() { &wgs.id } else { &local.id };
                Ok(ComparisonRow {
                    id: id.clone(),
                    d_northing: local.northing - n,
                    d_easting: local.easting - e,
                    d_height: local.height - h,
                })
            })
            .collect()
    }

    /// Runs the whole pipeline. Any failure aborts the run and names the
    /// stage it happened in.
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationOutcome> {
        Self::validate(request).map_err(|e| e.in_stage(Stage::Validation))?;
        let mut warnings = Vec::new();

        let (projection, projection_fit) = self
            .resolve_projection(request)
            .map_err(|e| e.in_stage(Stage::ProjectionResolution))?;
        if let Some(fit) = projection_fit.as_ref().filter(|f| !f.converged) {
            warnings.push(format!(
                "projection estimate did not converge after {} iterations",
                fit.iterations
            ));
        }

        let (source, target) = self
            .geocentric_pairs(request, &projection)
            .map_err(|e| e.in_stage(Stage::TransformResolution))?;
        let (parameters, helmert_solution) = match request.helmert {
            Some(pinned) => {
                log::info!("using pinned Helmert parameters {:?}", pinned);
                (pinned, None)
            }
            None => {
                let solution = helmert::solve_helmert(&source, &target)
                    .map_err(|e| e.in_stage(Stage::TransformResolution))?;
                if solution.is_degenerate() {
                    warnings.push(
                        GeoError::NumericalDegeneracy(format!(
                            "Helmert system has rank {} of 7; check the point geometry",
                            solution.rank
                        ))
                        .to_string(),
                    );
                }
                (solution.parameters, Some(solution))
            }
        };

        let model = SolvedModel {
            projection,
            helmert: parameters,
        };
        let rows = self
            .verify(request, &source, &model)
            .map_err(|e| e.in_stage(Stage::Verification))?;

        let count = rows.len() as f64;
        let rms_horizontal =
            (rows.iter().map(|r| r.horizontal().powi(2)).sum::<f64>() / count).sqrt();
        let rms_height = (rows.iter().map(|r| r.d_height.powi(2)).sum::<f64>() / count).sqrt();
        for row in &rows {
            log::debug!(
                "{}: dN={:.4} dE={:.4} dH={:.4}",
                row.id,
                row.d_northing,
                row.d_easting,
                row.d_height
            );
        }
        log::info!(
            "calculation finished: rms horizontal {:.4} m, height {:.4} m",
            rms_horizontal,
            rms_height
        );

        Ok(CalculationOutcome {
            model,
            projection_fit,
            helmert_solution,
            rows,
            rms_horizontal,
            rms_height,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths_fail_validation() {
        let request = CalculationRequest::new(
            vec![GeodeticPoint::new("a", 55.0, 29.0, 0.0); 3],
            vec![ProjectedPoint::new("a", 0.0, 0.0, 0.0); 4],
        );
        let err = Calculator::new().calculate(&request).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Validation));
        assert!(matches!(err.root(), GeoError::Validation(_)));
    }

    #[test]
    fn invalid_pinned_projection_fails_resolution() {
        let request = CalculationRequest::new(
            vec![GeodeticPoint::new("a", 55.0, 29.0, 0.0); 3],
            vec![ProjectedPoint::new("a", 0.0, 0.0, 0.0); 3],
        )
        .with_projection(ProjectionDefinition::new(30.0, 0.0, 0.0).with_scale(0.0));
        let err = Calculator::new().calculate(&request).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::ProjectionResolution));
        assert!(matches!(err.root(), GeoError::Definition(_)));
    }
}
