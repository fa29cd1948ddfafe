//! Estimation of the transformation between WGS84 and a local system.

pub mod helmert;
pub use helmert::{
    apply_helmert, calculate_helmert, generate_projected_crs_text, solve_helmert,
    HelmertParameters, HelmertSolution,
};

pub mod least_squares;
pub use least_squares::{min_norm_ls, LSResult};

pub mod nelder_mead;
pub use nelder_mead::{Minimum, NelderMead};

pub mod projection_fit;
pub use projection_fit::{estimate_projection, EstimatorOptions, ProjectionFit};
