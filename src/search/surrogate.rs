//! Gaussian-process surrogate over the unit square.
//!
//! RBF kernel, targets standardized to zero mean and unit variance.
//! The history stays in the tens of points, so a dense solve with
//! partial pivoting is plenty.

use ndarray::{Array1, Array2};

const LENGTH_SCALE: f64 = 0.2;
const NOISE: f64 = 1e-6;

pub struct GaussianProcess {
    points: Vec<[f64; 2]>,
    /// K^{-1} y for the standardized targets.
    alpha: Array1<f64>,
    kernel_inverse: Array2<f64>,
    y_mean: f64,
    y_std: f64,
}

impl GaussianProcess {
    /// Fit to observed points and raw scores. Returns `None` when the
    /// scores are degenerate (constant) or the kernel matrix cannot be
    /// inverted.
    pub fn fit(points: &[[f64; 2]], scores: &[f64]) -> Option<Self> {
        let n = points.len();
        if n == 0 || n != scores.len() {
            return None;
        }

        let y_mean = scores.iter().sum::<f64>() / n as f64;
        let y_var = scores.iter().map(|s| (s - y_mean).powi(2)).sum::<f64>() / n as f64;
        let y_std = y_var.sqrt();
        if y_std < 1e-12 {
            return None;
        }

        let targets = Array1::from_iter(scores.iter().map(|s| (s - y_mean) / y_std));

        let mut kernel = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                kernel[[i, j]] = rbf(points[i], points[j]);
            }
            kernel[[i, i]] += NOISE;
        }

        let kernel_inverse = invert(&kernel)?;
        let alpha = kernel_inverse.dot(&targets);

        Some(Self {
            points: points.to_vec(),
            alpha,
            kernel_inverse,
            y_mean,
            y_std,
        })
    }

    /// Map a raw score into the surrogate's standardized units.
    pub fn standardize(&self, score: f64) -> f64 {
        (score - self.y_mean) / self.y_std
    }

    /// Posterior mean and standard deviation at `x`, in standardized
    /// units.
    pub fn predict(&self, x: [f64; 2]) -> (f64, f64) {
        let k = Array1::from_iter(self.points.iter().map(|&p| rbf(p, x)));
        let mean = k.dot(&self.alpha);
        let variance = (1.0 + NOISE - k.dot(&self.kernel_inverse.dot(&k))).max(0.0);
        (mean, variance.sqrt())
    }
}

fn rbf(a: [f64; 2], b: [f64; 2]) -> f64 {
    let d2 = (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2);
    (-d2 / (2.0 * LENGTH_SCALE * LENGTH_SCALE)).exp()
}

/// Dense matrix inverse by Gauss-Jordan elimination with partial
/// pivoting. Returns `None` for a singular matrix.
fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut inv = Array2::eye(n);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[[i, col]]
                    .abs()
                    .partial_cmp(&a[[j, col]].abs())
                    .expect("kernel entries are finite")
            })
            .unwrap_or(col);
        if a[[pivot_row, col]].abs() < 1e-12 {
            return None;
        }

        if pivot_row != col {
            for k in 0..n {
                a.swap([col, k], [pivot_row, k]);
                inv.swap([col, k], [pivot_row, k]);
            }
        }

        let pivot = a[[col, col]];
        for k in 0..n {
            a[[col, k]] /= pivot;
            inv[[col, k]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = a[[row, col]];
                for k in 0..n {
                    a[[row, k]] -= factor * a[[col, k]];
                    inv[[row, k]] -= factor * inv[[col, k]];
                }
            }
        }
    }

    Some(inv)
}
