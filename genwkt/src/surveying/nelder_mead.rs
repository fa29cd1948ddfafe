// Derivative free minimisation with the Nelder-Mead downhill simplex.
// Coefficients: reflection 1, expansion 2, contraction 0.5, shrink 0.5.

/// Outcome of a minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Simplex minimiser with per-coordinate initial steps.
///
/// Convergence requires both the simplex extent (in units of the initial
/// step of each coordinate) to fall below `x_tolerance` and the spread of
/// objective values to fall below `f_tolerance · (1 + |f_best|)`.
#[derive(Debug, Clone)]
pub struct NelderMead {
    steps: Vec<f64>,
    pub max_iterations: usize,
    pub x_tolerance: f64,
    pub f_tolerance: f64,
}

impl NelderMead {
    pub fn new(steps: Vec<f64>) -> Self {
        Self {
            steps,
            max_iterations: 4000,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerances(mut self, x_tolerance: f64, f_tolerance: f64) -> Self {
        self.x_tolerance = x_tolerance;
        self.f_tolerance = f_tolerance;
        self
    }

    fn converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let best = &simplex[0];
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|p| {
                p.iter()
                    .zip(best)
                    .zip(&self.steps)
                    .map(|((a, b), s)| (a - b).abs() / s.abs())
            })
            .fold(0.0, f64::max);
        let f_spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0, f64::max);
        x_spread <= self.x_tolerance && f_spread <= self.f_tolerance * (1.0 + values[0].abs())
    }

    /// Minimises `f` starting from `x0`. Panics if `x0` and the step vector
    /// differ in length.
    pub fn minimize<F>(&self, mut f: F, x0: &[f64]) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        assert_eq!(n, self.steps.len(), "one step per coordinate");

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for (i, step) in self.steps.iter().enumerate() {
            let mut p = x0.to_vec();
            p[i] += step;
            simplex.push(p);
        }
        let mut values: Vec<f64> = simplex.iter().map(|p| f(p)).collect();

        let toward = |from: &[f64], to: &[f64], t: f64| -> Vec<f64> {
            from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
        };

        let mut iterations = 0;
        let mut converged = false;
        loop {
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            if self.converged(&simplex, &values) {
                converged = true;
                break;
            }
            if iterations >= self.max_iterations {
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|p| p[j]).sum::<f64>() / n as f64)
                .collect();
            let reflected = toward(&centroid, &simplex[n], -1.0);
            let f_reflected = f(&reflected);

            if f_reflected < values[0] {
                let expanded = toward(&centroid, &reflected, 2.0);
                let f_expanded = f(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }
            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            let (contracted, f_contracted, accept) = if f_reflected < values[n] {
                let c = toward(&centroid, &reflected, 0.5);
                let fc = f(&c);
                let ok = fc <= f_reflected;
                (c, fc, ok)
            } else {
                let c = toward(&centroid, &simplex[n], 0.5);
                let fc = f(&c);
                let ok = fc < values[n];
                (c, fc, ok)
            };
            if accept {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=n {
                simplex[i] = toward(&best, &simplex[i], 0.5);
                values[i] = f(&simplex[i]);
            }
        }

        Minimum {
            x: simplex.swap_remove(0),
            value: values[0],
            iterations,
            converged,
        }
    }
}
