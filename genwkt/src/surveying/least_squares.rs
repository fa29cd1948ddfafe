// Linear least squares used by the datum transformation estimators.
// Solutions are minimum norm and report the numerical rank of the system.

use nalgebra::{DMatrix, DVector, SVD};

/// Result of a least squares computation.
#[derive(Debug)]
pub struct LSResult {
    pub parameters: DVector<f64>,
    /// Residuals `A·x − l`.
    pub residuals: DVector<f64>,
    /// Numerical rank of the (column equilibrated) design matrix.
    pub rank: usize,
}

impl LSResult {
    /// Posterior variance of unit weight, `None` when there is no redundancy.
    pub fn variance_factor(&self) -> Option<f64> {
        let m = self.residuals.len();
        let n = self.parameters.len();
        if m <= n {
            return None;
        }
        Some(self.residuals.norm_squared() / (m - n) as f64)
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank == self.parameters.len()
    }
}

/// Singular values below `RCOND · σmax` of the equilibrated matrix count
/// as zero.
pub const RCOND: f64 = 1e-10;

/// Minimum norm solution of `A·x ≈ l` by singular value decomposition.
///
/// Columns are scaled to unit length before decomposing so that unknowns of
/// very different magnitude (metres next to radians) share one cutoff.
/// Singular values below [`RCOND`]` · σmax` are treated as zero. Returns `None`
/// when the shapes do not agree.
pub fn min_norm_ls(a: &DMatrix<f64>, l: &DVector<f64>) -> Option<LSResult> {
    if a.nrows() != l.len() || a.ncols() == 0 {
        return None;
    }
    let norms: Vec<f64> = a.column_iter().map(|c| c.norm()).collect();
    let mut scaled = a.clone();
    for (j, norm) in norms.iter().enumerate() {
        if *norm > 0.0 {
            scaled.column_mut(j).scale_mut(1.0 / norm);
        }
    }

    let svd = SVD::new(scaled, true, true);
    let tol = RCOND * svd.singular_values.max();
    let rank = svd.rank(tol);
    let y = svd.solve(l, tol).ok()?;

    let x = DVector::from_iterator(
        a.ncols(),
        y.iter()
            .zip(&norms)
            .map(|(v, norm)| if *norm > 0.0 { v / norm } else { 0.0 }),
    );
    let residuals = a * &x - l;
    Some(LSResult {
        parameters: x,
        residuals,
        rank,
    })
}
