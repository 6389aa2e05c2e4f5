//! Principal component analysis by eigendecomposition of the covariance matrix

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};

use crate::error::AnalysisError;

/// A fitted PCA model.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Column means subtracted before projecting.
    pub mean: Array1<f64>,
    /// Principal axes, one row per component (n_components × n_features).
    pub components: Array2<f64>,
    /// Eigenvalue of each component (variance along the axis).
    pub explained_variance: Array1<f64>,
    /// Share of the total variance carried by each component.
    pub explained_variance_ratio: Array1<f64>,
}

impl Pca {
    /// Fit `n_components` principal axes to `x` (rows = observations).
    ///
    /// Components beyond the number of features are zero vectors with zero
    /// variance, so the score matrix always has `n_components` columns.
    /// Each axis is oriented so that its largest-magnitude loading is
    /// positive, which makes the result reproducible.
    pub fn fit(x: &Array2<f64>, n_components: usize) -> Result<Self, AnalysisError> {
        let (n, p) = x.dim();
        if n == 0 {
            return Err(AnalysisError::EmptyTable);
        }
        if n_components == 0 {
            return Err(AnalysisError::InvalidComponents(n_components));
        }

        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let cov = covariance(&(x - &mean));

        let eigen = SymmetricEigen::new(DMatrix::from_fn(p, p, |i, j| cov[[i, j]]));
        let order = descending_order(eigen.eigenvalues.as_slice());
        let total: f64 = eigen.eigenvalues.iter().map(|&v| v.max(0.0)).sum();

        let mut components = Array2::zeros((n_components, p));
        let mut explained_variance = Array1::zeros(n_components);
        for (k, &idx) in order.iter().take(n_components).enumerate() {
            let mut axis: Vec<f64> = eigen.eigenvectors.column(idx).iter().copied().collect();
            orient(&mut axis);
            for (j, v) in axis.into_iter().enumerate() {
                components[[k, j]] = v;
            }
            explained_variance[k] = eigen.eigenvalues[idx].max(0.0);
        }

        let explained_variance_ratio = if total > 0.0 {
            &explained_variance / total
        } else {
            Array1::zeros(n_components)
        };

        Ok(Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    /// Project rows of `x` onto the principal axes (n × n_components).
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean).dot(&self.components.t())
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }
}

/// Sample covariance of an already centered matrix, divisor n - 1.
pub fn covariance(centered: &Array2<f64>) -> Array2<f64> {
    let n = centered.nrows();
    let divisor = if n > 1 { (n - 1) as f64 } else { 1.0 };
    centered.t().dot(centered) / divisor
}

/// Indices of `values` sorted by descending value.
pub(crate) fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Flip `axis` so its largest-magnitude entry is positive.
pub(crate) fn orient(axis: &mut [f64]) {
    let pivot = axis
        .iter()
        .copied()
        .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
    if pivot < 0.0 {
        axis.iter_mut().for_each(|v| *v = -*v + 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn score_matrix_has_requested_columns() {
        let x = array![
            [1.0, 2.0, 0.5],
            [2.0, 1.0, 0.1],
            [3.0, 5.0, 0.9],
            [4.0, 3.0, 0.4],
            [5.0, 4.0, 0.7]
        ];
        let pca = Pca::fit(&x, 2).unwrap();
        let scores = pca.transform(&x);
        assert_eq!(scores.dim(), (5, 2));
        assert!(pca.explained_variance[0] >= pca.explained_variance[1]);
    }

    #[test]
    fn collinear_data_has_one_component() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let pca = Pca::fit(&x, 2).unwrap();
        assert_abs_diff_eq!(pca.explained_variance_ratio[0], 1.0, epsilon = 1e-9);
        let scores = pca.transform(&x);
        for v in scores.column(1) {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-9);
        }
        // PC1 runs along (1, 2) / sqrt(5), pointing up.
        assert_abs_diff_eq!(pca.components[[0, 0]], 1.0 / 5f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(pca.components[[0, 1]], 2.0 / 5f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn extra_components_are_zero() {
        let x = array![[-1.0], [0.0], [1.0]];
        let pca = Pca::fit(&x, 2).unwrap();
        let scores = pca.transform(&x);
        assert_eq!(scores.dim(), (3, 2));
        assert!(scores.column(1).iter().all(|&v| v == 0.0));
        assert_abs_diff_eq!(scores[[2, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_components_is_an_error() {
        let x = array![[1.0], [2.0]];
        assert_eq!(
            Pca::fit(&x, 0).unwrap_err(),
            AnalysisError::InvalidComponents(0)
        );
    }

    #[test]
    fn orientation_is_by_largest_entry() {
        let mut axis = vec![0.3, -0.9, 0.1];
        orient(&mut axis);
        assert_eq!(axis, vec![-0.3, 0.9, -0.1]);

        let mut axis = vec![-0.5, 0.0];
        orient(&mut axis);
        assert!(axis[1].is_sign_positive());
    }
}
