//! Maximum-likelihood factor analysis
//!
//! The model is `x = W^T z + mean + e` with `z ~ N(0, I)` and per-feature
//! Gaussian noise `e ~ N(0, diag(psi))`. `W` and `psi` are fitted with the
//! SVD-based fixed-point iteration of Barber, "Bayesian Reasoning and
//! Machine Learning", algorithm 21.1.

use std::f64::consts::PI;

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};

use super::pca::{descending_order, orient};
use crate::config::{FactorSettings, Rotation};
use crate::error::AnalysisError;

/// Floor for noise variances and eigenvalues.
const SMALL: f64 = 1e-12;

const VARIMAX_MAX_ITER: usize = 100;
const VARIMAX_TOL: f64 = 1e-6;

/// Factor analysis parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorAnalysis {
    pub n_components: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub rotation: Rotation,
}

/// A fitted factor model.
#[derive(Debug, Clone)]
pub struct FactorModel {
    /// Loadings, one row per factor (n_components × n_features).
    pub components: Array2<f64>,
    /// Estimated noise variance of each feature.
    pub noise_variance: Array1<f64>,
    pub mean: Array1<f64>,
    /// Log-likelihood after each iteration.
    pub loglike: Vec<f64>,
    pub n_iter: usize,
    pub converged: bool,
}

impl FactorAnalysis {
    pub fn new(n_components: usize) -> Self {
        Self::with_settings(n_components, &FactorSettings::default())
    }

    pub fn with_settings(n_components: usize, settings: &FactorSettings) -> Self {
        Self {
            n_components,
            max_iter: settings.max_iter,
            tol: settings.tol,
            rotation: settings.rotation,
        }
    }

    /// Fit the model to `x` (rows = observations).
    ///
    /// Factors beyond the number of features get zero loadings. Running out
    /// of iterations is logged, not an error.
    pub fn fit(&self, x: &Array2<f64>) -> Result<FactorModel, AnalysisError> {
        let (n, p) = x.dim();
        if n == 0 {
            return Err(AnalysisError::EmptyTable);
        }
        if self.n_components == 0 {
            return Err(AnalysisError::InvalidComponents(self.n_components));
        }

        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let centered = x - &mean;
        // Biased covariance; its diagonal is the per-feature variance.
        let cov = centered.t().dot(&centered) / n as f64;
        let var = cov.diag().to_owned();

        let k = self.n_components.min(p);
        let llconst = p as f64 * (2.0 * PI).ln() + k as f64;

        let mut psi = Array1::<f64>::ones(p);
        let mut loadings = Array2::<f64>::zeros((k, p));
        let mut loglike = Vec::new();
        let mut old_ll = f64::NEG_INFINITY;
        let mut converged = false;

        for _ in 0..self.max_iter {
            let sqrt_psi = psi.mapv(|v| v.sqrt() + SMALL);

            // Eigen-decomposing the rescaled covariance gives the squared
            // singular values and right singular vectors of X / (sqrt(psi) sqrt(n)).
            let scaled = DMatrix::from_fn(p, p, |i, j| cov[[i, j]] / (sqrt_psi[i] * sqrt_psi[j]));
            let eigen = SymmetricEigen::new(scaled);
            let order = descending_order(eigen.eigenvalues.as_slice());
            let s2: Vec<f64> = order
                .iter()
                .map(|&i| eigen.eigenvalues[i].max(0.0))
                .collect();

            for (c, &idx) in order.iter().take(k).enumerate() {
                let weight = (s2[c] - 1.0).max(0.0).sqrt();
                for j in 0..p {
                    loadings[[c, j]] = weight * eigen.eigenvectors[(j, idx)] * sqrt_psi[j];
                }
            }

            let unexplained: f64 = s2[k..].iter().sum();
            let mut ll = llconst + s2[..k].iter().map(|v| v.max(SMALL).ln()).sum::<f64>();
            ll += unexplained + psi.iter().map(|v| v.ln()).sum::<f64>();
            ll *= -(n as f64) / 2.0;
            loglike.push(ll);

            if ll - old_ll < self.tol {
                converged = true;
                break;
            }
            old_ll = ll;

            let explained = loadings.mapv(|w| w * w).sum_axis(Axis(0));
            psi = (&var - &explained).mapv(|v| v.max(SMALL));
        }

        if !converged {
            log::warn!(
                "factor analysis did not converge in {} iterations; consider raising max_iter",
                self.max_iter
            );
        }

        if self.rotation == Rotation::Varimax {
            loadings = varimax(&loadings);
        }
        for mut row in loadings.rows_mut() {
            if let Some(slice) = row.as_slice_mut() {
                orient(slice);
            }
        }

        let mut components = Array2::zeros((self.n_components, p));
        components
            .slice_mut(ndarray::s![..k, ..])
            .assign(&loadings);
        // Adding +0.0 turns -0.0 into 0.0 so empty loadings export unsigned.
        components.mapv_inplace(|w| w + 0.0);

        Ok(FactorModel {
            components,
            noise_variance: psi,
            mean,
            n_iter: loglike.len(),
            loglike,
            converged,
        })
    }
}

impl FactorModel {
    /// Sum of squared loadings per feature: the variance the factors explain.
    pub fn communalities(&self) -> Array1<f64> {
        self.components.mapv(|w| w * w).sum_axis(Axis(0))
    }

    pub fn final_loglike(&self) -> Option<f64> {
        self.loglike.last().copied()
    }
}

/// Varimax rotation of `loadings` (factors × features).
pub fn varimax(loadings: &Array2<f64>) -> Array2<f64> {
    let (k, p) = loadings.dim();
    if k < 2 {
        return loadings.clone();
    }

    // Work on features × factors.
    let comps = DMatrix::from_fn(p, k, |i, j| loadings[[j, i]]);
    let mut rotation = DMatrix::<f64>::identity(k, k);
    let mut var = 0.0;

    for _ in 0..VARIMAX_MAX_ITER {
        let rotated = &comps * &rotation;
        let col_norms: Vec<f64> = (0..k)
            .map(|j| rotated.column(j).iter().map(|v| v * v).sum::<f64>() / p as f64)
            .collect();
        let target = DMatrix::from_fn(p, k, |i, j| {
            rotated[(i, j)].powi(3) - rotated[(i, j)] * col_norms[j]
        });

        let svd = (comps.transpose() * target).svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            log::warn!("varimax SVD failed; keeping the last rotation");
            break;
        };
        rotation = u * v_t;

        let var_new = svd.singular_values.sum();
        if var != 0.0 && var_new < var * (1.0 + VARIMAX_TOL) {
            break;
        }
        var = var_new;
    }

    let rotated = comps * rotation;
    Array2::from_shape_fn((k, p), |(i, j)| rotated[(j, i)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Four features driven by one latent signal plus small, deterministic
    /// feature-specific wobble.
    fn one_factor_data(n: usize) -> Array2<f64> {
        let weights = [1.0, 0.9, -0.8, 0.7];
        Array2::from_shape_fn((n, 4), |(i, j)| {
            let z = (i as f64 * 0.7).sin() + (i as f64 * 0.13).cos();
            let wobble = 0.15 * ((i * (j + 2)) as f64 * 1.37).sin();
            weights[j] * z + wobble
        })
    }

    fn two_factor_data(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 6), |(i, j)| {
            let a = (i as f64 * 0.31).sin();
            let b = (i as f64 * 1.7).cos();
            let wobble = 0.1 * ((i * (j + 3)) as f64 * 2.11).sin();
            if j < 3 { a + 0.2 * b + wobble } else { b + 0.2 * a + wobble }
        })
    }

    fn standardize(x: &Array2<f64>) -> Array2<f64> {
        crate::analysis::scaling::StandardScaler::fit_transform(x).1
    }

    #[test]
    fn dominant_factor_is_recovered() {
        let x = standardize(&one_factor_data(200));
        let model = FactorAnalysis::new(1).fit(&x).unwrap();
        assert!(model.converged);
        let loadings = model.components.row(0);
        assert!(loadings.iter().all(|w| w.abs() > 0.7), "{loadings}");
        // Feature 2 moves against the others.
        assert!(loadings[0] * loadings[2] < 0.0);
        assert!(loadings[0] * loadings[1] > 0.0);
    }

    #[test]
    fn loadings_have_requested_shape() {
        let x = standardize(&two_factor_data(150));
        let model = FactorAnalysis::new(2).fit(&x).unwrap();
        assert_eq!(model.components.dim(), (2, 6));
        assert_eq!(model.noise_variance.len(), 6);
        assert!(model.noise_variance.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn loglikelihood_improves() {
        let x = standardize(&two_factor_data(150));
        let model = FactorAnalysis::new(2).fit(&x).unwrap();
        assert!(model.n_iter > 1);
        let first = model.loglike[0];
        let last = model.final_loglike().unwrap();
        assert!(last >= first, "{:?}", model.loglike);
    }

    #[test]
    fn varimax_keeps_communalities() {
        let x = standardize(&two_factor_data(150));
        let plain = FactorAnalysis::new(2).fit(&x).unwrap();
        let rotated = FactorAnalysis {
            rotation: Rotation::Varimax,
            ..FactorAnalysis::new(2)
        }
        .fit(&x)
        .unwrap();
        for (a, b) in plain.communalities().iter().zip(rotated.communalities().iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
        }
    }

    #[test]
    fn more_factors_than_features_pads_with_zeros() {
        let x = standardize(&Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 5.0, 5.0]).unwrap());
        let model = FactorAnalysis::new(2).fit(&x).unwrap();
        assert_eq!(model.components.dim(), (2, 1));
        assert_eq!(model.components[[1, 0]], 0.0);
        assert!(model.components[[0, 0]].is_finite());
    }

    #[test]
    fn zero_loadings_are_never_negative_zero() {
        let x = standardize(&Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 5.0, 5.0]).unwrap());
        for rotation in [Rotation::None, Rotation::Varimax] {
            let settings = FactorSettings { rotation, ..FactorSettings::default() };
            let model = FactorAnalysis::with_settings(2, &settings).fit(&x).unwrap();
            for w in model.components.iter().filter(|w| **w == 0.0) {
                assert!(w.is_sign_positive(), "{:?}", model.components);
            }
        }
    }
}
